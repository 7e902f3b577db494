//! Presentation of workouts as map popups and list entries.

use crate::config::{MapConfig, PopupConfig};
use crate::types::{Workout, WorkoutDetails, WorkoutKind};
use std::fmt;

/// Options for a marker popup
#[derive(Clone, Debug, PartialEq)]
pub struct PopupOptions {
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
    pub class_name: String,
}

impl PopupOptions {
    pub fn for_workout(config: &PopupConfig, kind: WorkoutKind) -> Self {
        Self {
            max_width: config.max_width,
            min_width: config.min_width,
            auto_close: config.auto_close,
            close_on_click: config.close_on_click,
            class_name: format!("{}-popup", kind.tag()),
        }
    }
}

/// Animation of a map re-centre
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanOptions {
    pub animate: bool,
    pub duration_secs: f64,
}

impl PanOptions {
    pub fn animated(config: &MapConfig) -> Self {
        Self {
            animate: true,
            duration_secs: config.pan_duration_secs,
        }
    }
}

/// Text shown in a workout's marker popup, e.g. "🏃‍♂️ Running on April 14"
pub fn popup_content(workout: &Workout) -> String {
    format!("{} {}", workout.kind().icon(), workout.description())
}

/// One (icon, value, unit) row of a list entry
#[derive(Clone, Debug, PartialEq)]
pub struct Detail {
    pub icon: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Detail {
    fn new(icon: &'static str, value: impl ToString, unit: &'static str) -> Self {
        Self {
            icon,
            value: value.to_string(),
            unit,
        }
    }
}

/// A rendered workout in the sidebar list
#[derive(Clone, Debug, PartialEq)]
pub struct ListEntry {
    pub id: String,
    pub kind: WorkoutKind,
    pub title: String,
    pub details: Vec<Detail>,
}

impl From<&Workout> for ListEntry {
    fn from(workout: &Workout) -> Self {
        let kind = workout.kind();
        let mut details = vec![
            Detail::new(kind.icon(), workout.distance_km(), "km"),
            Detail::new("⏱", workout.duration_min(), "min"),
        ];
        match *workout.details() {
            WorkoutDetails::Running { cadence, pace } => {
                details.push(Detail::new("⚡️", format!("{:.1}", pace), "min/km"));
                details.push(Detail::new("🦶🏼", cadence, "spm"));
            }
            WorkoutDetails::Cycling {
                elevation_gain_m,
                speed,
            } => {
                details.push(Detail::new("⚡️", format!("{:.1}", speed), "km/h"));
                details.push(Detail::new("⛰", elevation_gain_m, "m"));
            }
        }

        Self {
            id: workout.id().to_string(),
            kind,
            title: workout.description().to_string(),
            details,
        }
    }
}

impl fmt::Display for ListEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.id, self.title)?;
        for d in &self.details {
            write!(f, "  {} {} {}", d.icon, d.value, d.unit)?;
        }
        Ok(())
    }
}
