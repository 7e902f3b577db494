//! Core domain types for maplog.
//!
//! This module defines the workout record and its two variants:
//! - Coordinates of a logged workout
//! - Running (cadence, derived pace) and Cycling (elevation gain, derived speed)
//! - Description and id derivation from the creation time

use chrono::{DateTime, Datelike, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};

// ============================================================================
// Coordinates
// ============================================================================

/// A (latitude, longitude) pair, persisted as a two-element array
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<[f64; 2]> for Coordinates {
    fn from([latitude, longitude]: [f64; 2]) -> Self {
        Self::new(latitude, longitude)
    }
}

impl From<Coordinates> for [f64; 2] {
    fn from(c: Coordinates) -> Self {
        [c.latitude, c.longitude]
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

impl FromStr for Coordinates {
    type Err = String;

    /// Parses `"LAT,LNG"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lng) = s
            .split_once(',')
            .ok_or_else(|| format!("expected LAT,LNG but got {:?}", s))?;
        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|e| format!("invalid latitude {:?}: {}", lat, e))?;
        let longitude: f64 = lng
            .trim()
            .parse()
            .map_err(|e| format!("invalid longitude {:?}: {}", lng, e))?;
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(format!("coordinates out of range: {}", s));
        }
        Ok(Self::new(latitude, longitude))
    }
}

// ============================================================================
// Workout kinds
// ============================================================================

/// Variant discriminator of a workout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutKind {
    Running,
    Cycling,
}

impl WorkoutKind {
    /// Lowercase tag used by the type selector and persisted records
    pub fn tag(self) -> &'static str {
        match self {
            WorkoutKind::Running => "running",
            WorkoutKind::Cycling => "cycling",
        }
    }

    /// Capitalized label used in descriptions
    pub fn label(self) -> &'static str {
        match self {
            WorkoutKind::Running => "Running",
            WorkoutKind::Cycling => "Cycling",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            WorkoutKind::Running => "🏃‍♂️",
            WorkoutKind::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for WorkoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for WorkoutKind {
    type Err = crate::ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "running" => Ok(WorkoutKind::Running),
            "cycling" => Ok(WorkoutKind::Cycling),
            _ => Err(crate::ValidationError::UnknownType(s.to_string())),
        }
    }
}

// ============================================================================
// Workout record
// ============================================================================

/// Type-specific input of a new workout
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum VariantInput {
    /// Steps per minute
    Running { cadence: f64 },
    /// Metres climbed; the sign is not constrained
    Cycling { elevation_gain_m: f64 },
}

impl VariantInput {
    pub fn kind(&self) -> WorkoutKind {
        match self {
            VariantInput::Running { .. } => WorkoutKind::Running,
            VariantInput::Cycling { .. } => WorkoutKind::Cycling,
        }
    }
}

/// Type-specific fields of a workout, derived values included
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WorkoutDetails {
    Running {
        cadence: f64,
        /// min/km
        pace: f64,
    },
    Cycling {
        elevation_gain_m: f64,
        /// km/h
        speed: f64,
    },
}

impl WorkoutDetails {
    /// Compute the derived metric for the given inputs
    fn derive(distance_km: f64, duration_min: f64, input: VariantInput) -> Self {
        match input {
            VariantInput::Running { cadence } => WorkoutDetails::Running {
                cadence,
                pace: duration_min / distance_km,
            },
            VariantInput::Cycling { elevation_gain_m } => WorkoutDetails::Cycling {
                elevation_gain_m,
                speed: distance_km / (duration_min / 60.0),
            },
        }
    }
}

/// A logged workout
///
/// Every field except `interaction_count` is fixed at creation. Derived
/// fields (`pace`, `speed`, `description`) are computed once by the
/// constructors and never recomputed from the stored inputs.
#[derive(Clone, Debug, PartialEq)]
pub struct Workout {
    id: String,
    created_at: DateTime<Utc>,
    coordinates: Coordinates,
    distance_km: f64,
    duration_min: f64,
    description: String,
    interaction_count: u32,
    details: WorkoutDetails,
}

/// Create a running workout timestamped now
///
/// Inputs are assumed to be validated already (all strictly positive).
pub fn create_running(
    coordinates: Coordinates,
    distance_km: f64,
    duration_min: f64,
    cadence: f64,
) -> Workout {
    Workout::create(
        coordinates,
        distance_km,
        duration_min,
        VariantInput::Running { cadence },
    )
}

/// Create a cycling workout timestamped now
///
/// Inputs are assumed to be validated already (distance and duration strictly positive).
pub fn create_cycling(
    coordinates: Coordinates,
    distance_km: f64,
    duration_min: f64,
    elevation_gain_m: f64,
) -> Workout {
    Workout::create(
        coordinates,
        distance_km,
        duration_min,
        VariantInput::Cycling { elevation_gain_m },
    )
}

impl Workout {
    /// Create a workout of either variant timestamped now, with a fresh id
    pub fn create(
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        input: VariantInput,
    ) -> Self {
        let created_at = Utc::now();
        let id = next_workout_id(created_at);
        let description = describe(input.kind(), &created_at.with_timezone(&Local));
        Self::from_parts(
            id,
            created_at,
            coordinates,
            distance_km,
            duration_min,
            description,
            0,
            input,
        )
    }

    /// Assemble a workout from its stored parts, deriving `pace` or `speed`
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        id: String,
        created_at: DateTime<Utc>,
        coordinates: Coordinates,
        distance_km: f64,
        duration_min: f64,
        description: String,
        interaction_count: u32,
        input: VariantInput,
    ) -> Self {
        Self {
            id,
            created_at,
            coordinates,
            distance_km,
            duration_min,
            description,
            interaction_count,
            details: WorkoutDetails::derive(distance_km, duration_min, input),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    pub fn duration_min(&self) -> f64 {
        self.duration_min
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn interaction_count(&self) -> u32 {
        self.interaction_count
    }

    pub fn details(&self) -> &WorkoutDetails {
        &self.details
    }

    pub fn kind(&self) -> WorkoutKind {
        match self.details {
            WorkoutDetails::Running { .. } => WorkoutKind::Running,
            WorkoutDetails::Cycling { .. } => WorkoutKind::Cycling,
        }
    }

    /// Pace in min/km (running only)
    pub fn pace(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Running { pace, .. } => Some(pace),
            WorkoutDetails::Cycling { .. } => None,
        }
    }

    /// Speed in km/h (cycling only)
    pub fn speed(&self) -> Option<f64> {
        match self.details {
            WorkoutDetails::Cycling { speed, .. } => Some(speed),
            WorkoutDetails::Running { .. } => None,
        }
    }

    /// Record that the user selected this workout from the list
    pub fn mark_interacted(&mut self) {
        self.interaction_count = self.interaction_count.saturating_add(1);
    }
}

// ============================================================================
// Derivations
// ============================================================================

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Build a description such as "Running on April 14" from the given date
pub fn describe<D: Datelike>(kind: WorkoutKind, date: &D) -> String {
    format!(
        "{} on {} {}",
        kind.label(),
        MONTH_NAMES[date.month0() as usize],
        date.day()
    )
}

static LAST_ISSUED_MILLIS: AtomicI64 = AtomicI64::new(i64::MIN);

/// Issue a workout id from the creation time
///
/// The id is the last ten digits of the creation time in milliseconds.
/// Within one process ids are strictly increasing, so two workouts created
/// in the same millisecond still get distinct ids.
pub fn next_workout_id(created_at: DateTime<Utc>) -> String {
    let millis = created_at.timestamp_millis();
    let previous = LAST_ISSUED_MILLIS
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
            Some(millis.max(last.saturating_add(1)))
        })
        .unwrap_or(millis);
    let issued = millis.max(previous.saturating_add(1));

    let digits = issued.to_string();
    digits[digits.len().saturating_sub(10)..].to_string()
}
