//! Host collaborators the controller drives.
//!
//! A browser host backs these with a map widget, the geolocation API and
//! the DOM; the CLI and the tests back them with plain Rust types.

use crate::render::{ListEntry, PanOptions, PopupOptions};
use crate::types::Coordinates;
use crate::GeolocationError;
use std::time::Duration;

/// Single-shot position lookup
pub trait Geolocator {
    fn request_current_position(&mut self) -> std::result::Result<Coordinates, GeolocationError>;
}

/// Creates map sessions
pub trait MapBackend {
    type Session: MapSession;

    fn init_session(&mut self, center: Coordinates, zoom: u8) -> Self::Session;
}

/// A live, rendered map
pub trait MapSession {
    type Marker: MarkerHandle;

    fn add_base_layer(&mut self, tile_url_template: &str, attribution: &str);

    /// Start forwarding map clicks to the controller
    fn listen_for_clicks(&mut self);

    fn add_marker(&mut self, coordinates: Coordinates) -> Self::Marker;

    fn set_view(&mut self, center: Coordinates, zoom: u8, pan: PanOptions);
}

/// A marker placed on a map session
pub trait MarkerHandle {
    fn bind_popup(&mut self, options: &PopupOptions);
    fn set_popup_content(&mut self, content: &str);
    fn open_popup(&mut self);
}

/// Named inputs of the workout form
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FormField {
    Type,
    Distance,
    Duration,
    Cadence,
    Elevation,
}

impl FormField {
    pub fn name(self) -> &'static str {
        match self {
            FormField::Type => "type",
            FormField::Distance => "distance",
            FormField::Duration => "duration",
            FormField::Cadence => "cadence",
            FormField::Elevation => "elevation",
        }
    }
}

/// Form, workout list and user alerts
pub trait WorkoutView {
    /// Raw value of a form field
    fn field(&self, field: FormField) -> String;
    fn set_field(&mut self, field: FormField, value: &str);

    fn show_form(&mut self);
    /// Hide the form; it fully collapses after `delay`
    fn hide_form(&mut self, delay: Duration);
    fn focus(&mut self, field: FormField);
    fn set_row_visible(&mut self, field: FormField, visible: bool);

    /// Append one workout to the rendered list
    fn render_workout(&mut self, entry: &ListEntry);
    fn clear_list(&mut self);

    /// Show an error message to the user
    fn alert(&mut self, message: &str);
}
