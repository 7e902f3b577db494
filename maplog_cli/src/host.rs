//! Terminal implementations of the controller's host ports.

use maplog_core::{
    Coordinates, FormField, GeolocationError, Geolocator, ListEntry, MapBackend, MapSession,
    MarkerHandle, PanOptions, PopupOptions, WorkoutView,
};
use std::collections::HashMap;
use std::time::Duration;

/// Reports a position fixed up front, or none at all
pub struct FixedGeolocator(pub Option<Coordinates>);

impl Geolocator for FixedGeolocator {
    fn request_current_position(&mut self) -> Result<Coordinates, GeolocationError> {
        self.0.ok_or(GeolocationError::Unavailable)
    }
}

/// Map backend that only traces what a rendered map would show
pub struct ConsoleMap;

pub struct ConsoleSession {
    center: Coordinates,
    zoom: u8,
}

pub struct ConsoleMarker {
    at: Coordinates,
}

impl MapBackend for ConsoleMap {
    type Session = ConsoleSession;

    fn init_session(&mut self, center: Coordinates, zoom: u8) -> ConsoleSession {
        tracing::debug!("Map centered on {} at zoom {}", center, zoom);
        ConsoleSession {
            center,
            zoom,
        }
    }
}

impl ConsoleSession {
    pub fn center(&self) -> Coordinates {
        self.center
    }

    pub fn zoom(&self) -> u8 {
        self.zoom
    }
}

impl MapSession for ConsoleSession {
    type Marker = ConsoleMarker;

    fn add_base_layer(&mut self, tile_url_template: &str, _attribution: &str) {
        tracing::debug!("Base layer {}", tile_url_template);
    }

    fn listen_for_clicks(&mut self) {}

    fn add_marker(&mut self, coordinates: Coordinates) -> ConsoleMarker {
        ConsoleMarker { at: coordinates }
    }

    fn set_view(&mut self, center: Coordinates, zoom: u8, pan: PanOptions) {
        self.center = center;
        self.zoom = zoom;
        tracing::debug!(
            "Panning to {} over {}s (animate: {})",
            center,
            pan.duration_secs,
            pan.animate
        );
    }
}

impl MarkerHandle for ConsoleMarker {
    fn bind_popup(&mut self, options: &PopupOptions) {
        tracing::debug!("Popup {} for marker at {}", options.class_name, self.at);
    }

    fn set_popup_content(&mut self, content: &str) {
        tracing::debug!("Marker at {}: {}", self.at, content);
    }

    fn open_popup(&mut self) {}
}

/// Form fields held in memory; list entries collected for printing
#[derive(Default)]
pub struct TerminalView {
    fields: HashMap<FormField, String>,
    entries: Vec<ListEntry>,
}

impl TerminalView {
    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }
}

impl WorkoutView for TerminalView {
    fn field(&self, field: FormField) -> String {
        self.fields.get(&field).cloned().unwrap_or_default()
    }

    fn set_field(&mut self, field: FormField, value: &str) {
        self.fields.insert(field, value.to_string());
    }

    fn show_form(&mut self) {
        tracing::debug!("Form opened");
    }

    fn hide_form(&mut self, _delay: Duration) {
        tracing::debug!("Form closed");
    }

    fn focus(&mut self, field: FormField) {
        tracing::debug!("Focus on {}", field.name());
    }

    fn set_row_visible(&mut self, field: FormField, visible: bool) {
        tracing::debug!("Row {} visible: {}", field.name(), visible);
    }

    fn render_workout(&mut self, entry: &ListEntry) {
        self.entries.push(entry.clone());
    }

    fn clear_list(&mut self) {
        self.entries.clear();
    }

    fn alert(&mut self, message: &str) {
        eprintln!("✗ {}", message);
    }
}
