//! CSV export of the workout log.

use crate::types::{Workout, WorkoutDetails};
use crate::Result;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    id: String,
    r#type: &'static str,
    created_at: String,
    latitude: f64,
    longitude: f64,
    distance_km: f64,
    duration_min: f64,
    description: String,
    interaction_count: u32,
    cadence: Option<f64>,
    pace_min_per_km: Option<f64>,
    elevation_gain_m: Option<f64>,
    speed_km_per_h: Option<f64>,
}

impl From<&Workout> for CsvRow {
    fn from(workout: &Workout) -> Self {
        let (cadence, pace, elevation_gain_m, speed) = match *workout.details() {
            WorkoutDetails::Running { cadence, pace } => (Some(cadence), Some(pace), None, None),
            WorkoutDetails::Cycling {
                elevation_gain_m,
                speed,
            } => (None, None, Some(elevation_gain_m), Some(speed)),
        };
        let at = workout.coordinates();
        CsvRow {
            id: workout.id().to_string(),
            r#type: workout.kind().tag(),
            created_at: workout.created_at().to_rfc3339(),
            latitude: at.latitude,
            longitude: at.longitude,
            distance_km: workout.distance_km(),
            duration_min: workout.duration_min(),
            description: workout.description().to_string(),
            interaction_count: workout.interaction_count(),
            cadence,
            pace_min_per_km: pace,
            elevation_gain_m,
            speed_km_per_h: speed,
        }
    }
}

/// Write all workouts to a CSV file, replacing it if it exists
///
/// Returns the number of rows written. The file is synced before returning.
pub fn export_csv(workouts: &[Workout], csv_path: &Path) -> Result<usize> {
    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::File::create(csv_path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(file);

    for workout in workouts {
        writer.serialize(CsvRow::from(workout))?;
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} workouts to {:?}", workouts.len(), csv_path);
    Ok(workouts.len())
}
