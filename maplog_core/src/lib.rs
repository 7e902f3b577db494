#![forbid(unsafe_code)]

//! Core domain model and application logic for the maplog workout map.
//!
//! This crate provides:
//! - Workout types (running and cycling, with derived pace and speed)
//! - The ordered workout store and its persisted snapshot form
//! - The key-value persistence boundary
//! - Ports for the map, geolocation and form/list hosts
//! - The event-driven application controller

pub mod types;
pub mod error;
pub mod config;
pub mod logging;
pub mod store;
pub mod storage;
pub mod validation;
pub mod render;
pub mod ports;
pub mod controller;
pub mod export;

// Re-export commonly used types
pub use error::{Error, GeolocationError, Result, ValidationError};
pub use types::*;
pub use config::Config;
pub use store::{WorkoutSnapshot, WorkoutStore};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
pub use ports::{FormField, Geolocator, MapBackend, MapSession, MarkerHandle, WorkoutView};
pub use render::{ListEntry, PanOptions, PopupOptions};
pub use controller::{AppController, AppEvent, AppState, FormState, SubmitOutcome};
pub use export::export_csv;
