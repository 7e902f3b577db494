//! Ordered workout collection and its persisted snapshot form.
//!
//! The store keeps workouts in creation order with an id index for
//! constant-time lookup. `serialize` flattens every workout into a
//! discriminated [`WorkoutSnapshot`]; `restore` rebuilds the proper variant
//! from each snapshot rather than copying raw fields.

use crate::types::{describe, Coordinates, VariantInput, Workout, WorkoutDetails};
use crate::{Error, Result};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Persisted form of one workout, tagged with its variant
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WorkoutSnapshot {
    Running {
        #[serde(flatten)]
        common: SnapshotCommon,
        cadence: f64,
        #[serde(default)]
        pace: f64,
    },
    Cycling {
        #[serde(flatten)]
        common: SnapshotCommon,
        #[serde(rename = "elevationGainM")]
        elevation_gain_m: f64,
        #[serde(default)]
        speed: f64,
    },
}

/// Fields shared by both snapshot variants
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotCommon {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub coordinates: Coordinates,
    pub distance_km: f64,
    pub duration_min: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub interaction_count: u32,
}

impl From<&Workout> for WorkoutSnapshot {
    fn from(workout: &Workout) -> Self {
        let common = SnapshotCommon {
            id: workout.id().to_string(),
            created_at: workout.created_at(),
            coordinates: workout.coordinates(),
            distance_km: workout.distance_km(),
            duration_min: workout.duration_min(),
            description: workout.description().to_string(),
            interaction_count: workout.interaction_count(),
        };
        match *workout.details() {
            WorkoutDetails::Running { cadence, pace } => WorkoutSnapshot::Running {
                common,
                cadence,
                pace,
            },
            WorkoutDetails::Cycling {
                elevation_gain_m,
                speed,
            } => WorkoutSnapshot::Cycling {
                common,
                elevation_gain_m,
                speed,
            },
        }
    }
}

impl TryFrom<WorkoutSnapshot> for Workout {
    type Error = Error;

    /// Rebuild the workout variant, re-deriving `pace` or `speed`
    ///
    /// Inputs must satisfy the same positivity rules a submitted form does.
    /// The stored description is kept; it is only recomputed when missing.
    fn try_from(snapshot: WorkoutSnapshot) -> Result<Self> {
        let (common, input) = match snapshot {
            WorkoutSnapshot::Running {
                common, cadence, ..
            } => (common, VariantInput::Running { cadence }),
            WorkoutSnapshot::Cycling {
                common,
                elevation_gain_m,
                ..
            } => (common, VariantInput::Cycling { elevation_gain_m }),
        };

        let invalid = |what: &str| {
            Error::InvalidRecord(format!("workout {}: {}", common.id, what))
        };
        if common.id.trim().is_empty() {
            return Err(invalid("empty id"));
        }
        if !(common.distance_km.is_finite() && common.distance_km > 0.0) {
            return Err(invalid("distance must be positive"));
        }
        if !(common.duration_min.is_finite() && common.duration_min > 0.0) {
            return Err(invalid("duration must be positive"));
        }
        match input {
            VariantInput::Running { cadence } if !(cadence.is_finite() && cadence > 0.0) => {
                return Err(invalid("cadence must be positive"));
            }
            VariantInput::Cycling { elevation_gain_m } if !elevation_gain_m.is_finite() => {
                return Err(invalid("elevation gain must be a number"));
            }
            _ => {}
        }

        let description = if common.description.trim().is_empty() {
            describe(input.kind(), &common.created_at.with_timezone(&Local))
        } else {
            common.description.clone()
        };

        Ok(Workout::from_parts(
            common.id.clone(),
            common.created_at,
            common.coordinates,
            common.distance_km,
            common.duration_min,
            description,
            common.interaction_count,
            input,
        ))
    }
}

/// Ordered, append-only collection of workouts with an id index
#[derive(Clone, Debug, Default)]
pub struct WorkoutStore {
    workouts: Vec<Workout>,
    index: HashMap<String, usize>,
}

impl WorkoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a workout to the end of the log
    ///
    /// Fails without modifying the store if the id is already present.
    pub fn add(&mut self, workout: Workout) -> Result<()> {
        if self.index.contains_key(workout.id()) {
            return Err(Error::DuplicateId(workout.id().to_string()));
        }
        self.index
            .insert(workout.id().to_string(), self.workouts.len());
        self.workouts.push(workout);
        Ok(())
    }

    /// All workouts in creation order
    pub fn all(&self) -> &[Workout] {
        &self.workouts
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Workout> {
        self.index.get(id).map(|&i| &self.workouts[i])
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut Workout> {
        match self.index.get(id) {
            Some(&i) => self.workouts.get_mut(i),
            None => None,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }

    /// Snapshot every workout, in order, for persistence
    pub fn serialize(&self) -> Vec<WorkoutSnapshot> {
        self.workouts.iter().map(WorkoutSnapshot::from).collect()
    }

    /// Replace the whole store with the given snapshots
    ///
    /// Entries that cannot be rebuilt, or that repeat an earlier id, are
    /// skipped with a warning. Returns the number of entries skipped.
    pub fn restore(&mut self, snapshots: Vec<WorkoutSnapshot>) -> usize {
        self.clear();
        let mut skipped = 0;

        for snapshot in snapshots {
            let result = Workout::try_from(snapshot).and_then(|workout| self.add(workout));
            if let Err(e) = result {
                tracing::warn!("Skipping persisted workout: {}", e);
                skipped += 1;
            }
        }

        tracing::debug!(
            "Restored {} workouts ({} skipped)",
            self.workouts.len(),
            skipped
        );
        skipped
    }

    /// Remove every workout
    pub fn clear(&mut self) {
        self.workouts.clear();
        self.index.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{create_cycling, create_running};

    fn sample_store() -> WorkoutStore {
        let mut store = WorkoutStore::new();
        store
            .add(create_running(Coordinates::new(39.0, -12.0), 5.2, 24.0, 178.0))
            .unwrap();
        store
            .add(create_cycling(Coordinates::new(39.1, -12.1), 27.0, 95.0, 523.0))
            .unwrap();
        store
            .add(create_cycling(Coordinates::new(39.2, -12.2), 12.0, 40.0, -80.0))
            .unwrap();
        store
    }

    #[test]
    fn test_add_and_find() {
        let store = sample_store();
        assert_eq!(store.len(), 3);

        let second = &store.all()[1];
        let found = store.find_by_id(second.id()).unwrap();
        assert_eq!(found, second);
        assert!(store.find_by_id("nope").is_none());
    }

    #[test]
    fn test_add_rejects_duplicate_id() {
        let mut store = sample_store();
        let dup = store.all()[0].clone();

        let err = store.add(dup).unwrap_err();
        assert!(matches!(err, Error::DuplicateId(_)));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_restore_of_serialize_is_identical() {
        let mut store = sample_store();
        let id = store.all()[2].id().to_string();
        store.find_by_id_mut(&id).unwrap().mark_interacted();

        let mut restored = WorkoutStore::new();
        let skipped = restored.restore(store.serialize());

        assert_eq!(skipped, 0);
        assert_eq!(restored.all(), store.all());
        assert_eq!(restored.find_by_id(&id).unwrap().interaction_count(), 1);
    }

    #[test]
    fn test_restore_through_json() {
        let store = sample_store();
        let json = serde_json::to_string(&store.serialize()).unwrap();
        let snapshots: Vec<WorkoutSnapshot> = serde_json::from_str(&json).unwrap();

        let mut restored = WorkoutStore::new();
        restored.restore(snapshots);
        assert_eq!(restored.all(), store.all());
        assert_eq!(restored.all()[0].pace(), store.all()[0].pace());
        assert_eq!(restored.all()[1].speed(), store.all()[1].speed());
    }

    #[test]
    fn test_snapshot_field_layout() {
        let store = sample_store();
        let value = serde_json::to_value(store.serialize()).unwrap();

        let run = &value[0];
        assert_eq!(run["type"], "running");
        for key in [
            "id",
            "createdAt",
            "coordinates",
            "distanceKm",
            "durationMin",
            "description",
            "interactionCount",
            "cadence",
            "pace",
        ] {
            assert!(run.get(key).is_some(), "running snapshot missing {}", key);
        }
        assert_eq!(run["coordinates"], serde_json::json!([39.0, -12.0]));

        let ride = &value[1];
        assert_eq!(ride["type"], "cycling");
        assert!(ride.get("elevationGainM").is_some());
        assert!(ride.get("speed").is_some());
        assert!(ride.get("cadence").is_none());
    }

    #[test]
    fn test_restore_rederives_metrics() {
        let json = r#"[{
            "type": "running",
            "id": "1234567890",
            "createdAt": "2024-04-14T09:30:00Z",
            "coordinates": [39, -12],
            "distanceKm": 5.2,
            "durationMin": 24,
            "description": "Running on April 14",
            "interactionCount": 3,
            "cadence": 178,
            "pace": 999
        }]"#;
        let snapshots: Vec<WorkoutSnapshot> = serde_json::from_str(json).unwrap();

        let mut store = WorkoutStore::new();
        store.restore(snapshots);

        let run = store.find_by_id("1234567890").unwrap();
        assert_eq!(run.pace(), Some(24.0 / 5.2));
        assert_eq!(run.description(), "Running on April 14");
        assert_eq!(run.interaction_count(), 3);
    }

    #[test]
    fn test_restore_skips_invalid_and_duplicate_entries() {
        let mut snapshots = sample_store().serialize();
        snapshots.push(snapshots[0].clone());
        let mut bad = match &snapshots[0] {
            WorkoutSnapshot::Running { common, .. } => common.clone(),
            WorkoutSnapshot::Cycling { .. } => panic!("first sample is a run"),
        };
        bad.id = "bad".into();
        bad.distance_km = -1.0;
        snapshots.push(WorkoutSnapshot::Running {
            common: bad,
            cadence: 170.0,
            pace: 0.0,
        });

        let mut store = WorkoutStore::new();
        let skipped = store.restore(snapshots);
        assert_eq!(skipped, 2);
        assert_eq!(store.len(), 3);
        assert!(store.find_by_id("bad").is_none());
    }

    #[test]
    fn test_restore_replaces_contents() {
        let mut store = sample_store();
        store.restore(Vec::new());
        assert!(store.is_empty());
        assert!(!store.contains("anything"));
    }

    #[test]
    fn test_clear() {
        let mut store = sample_store();
        let id = store.all()[0].id().to_string();
        store.clear();
        assert!(store.is_empty());
        assert!(store.find_by_id(&id).is_none());
    }
}
