//! Application controller for the workout map.
//!
//! The controller owns the workout store, the map session and the pending
//! click context, and reacts to one host event at a time:
//!
//! ```text
//! AwaitingLocation ──position──▶ MapReady(Hidden) ──click──▶ MapReady(Visible)
//!                                      ▲                          │ submit
//!                                      └──────── commit ◀── validate ──▶ reject (stays Visible)
//! ```
//!
//! Validation happens synchronously inside [`AppController::submit`], so the
//! validating step is never observable between events.

use crate::config::Config;
use crate::ports::{FormField, Geolocator, MapBackend, MapSession, MarkerHandle, WorkoutView};
use crate::render::{popup_content, ListEntry, PanOptions, PopupOptions};
use crate::storage::{clear_workouts, load_workouts, save_workouts, KeyValueStorage};
use crate::store::WorkoutStore;
use crate::types::{Coordinates, Workout, WorkoutKind};
use crate::validation::{validate, FormInput};
use crate::{GeolocationError, Result, ValidationError};
use std::time::Duration;

/// Visibility of the workout form
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormState {
    Hidden,
    Visible,
}

/// Controller state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppState {
    /// No position yet; the map does not exist
    AwaitingLocation,
    MapReady(FormState),
}

/// Events delivered by the host
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    PositionResolved(Coordinates),
    PositionFailed(GeolocationError),
    MapClicked(Coordinates),
    TypeChanged(WorkoutKind),
    FormSubmitted,
    ListItemSelected(String),
}

/// Result of a form submission
#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// A workout was created and stored
    Committed { id: String },
    /// Input was invalid; the form stays open
    Rejected(ValidationError),
    /// No form was open
    Ignored,
}

/// Drives the workout map from host events
pub struct AppController<M: MapBackend, V: WorkoutView, S: KeyValueStorage> {
    config: Config,
    map_backend: M,
    view: V,
    storage: S,
    session: Option<M::Session>,
    markers: Vec<<M::Session as MapSession>::Marker>,
    store: WorkoutStore,
    pending_click: Option<Coordinates>,
    state: AppState,
}

impl<M, V, S> AppController<M, V, S>
where
    M: MapBackend,
    V: WorkoutView,
    S: KeyValueStorage,
{
    /// Create a controller and replay persisted workouts into the list
    ///
    /// A snapshot that cannot be read is reported to the user and the log
    /// starts empty.
    pub fn new(config: Config, map_backend: M, view: V, storage: S) -> Self {
        let mut controller = Self {
            config,
            map_backend,
            view,
            storage,
            session: None,
            markers: Vec::new(),
            store: WorkoutStore::new(),
            pending_click: None,
            state: AppState::AwaitingLocation,
        };
        controller.rehydrate();
        controller
    }

    fn rehydrate(&mut self) {
        match load_workouts(&self.storage) {
            Ok(snapshots) => {
                let skipped = self.store.restore(snapshots);
                if skipped > 0 {
                    tracing::warn!("{} persisted workouts could not be restored", skipped);
                }
                for workout in self.store.all() {
                    self.view.render_workout(&ListEntry::from(workout));
                }
                tracing::info!("Restored {} workouts", self.store.len());
            }
            Err(e) => {
                tracing::warn!("Failed to load persisted workouts: {}", e);
                self.view
                    .alert(&format!("Could not load your saved workouts: {}", e));
            }
        }
    }

    /// Request the current position and handle the single answer
    pub fn start<G: Geolocator + ?Sized>(&mut self, geolocator: &mut G) {
        match geolocator.request_current_position() {
            Ok(position) => self.position_resolved(position),
            Err(e) => self.position_failed(e),
        }
    }

    /// Dispatch a host event
    ///
    /// Only persistence failures are returned; everything else is handled
    /// here and reported through the view.
    pub fn handle(&mut self, event: AppEvent) -> Result<()> {
        match event {
            AppEvent::PositionResolved(position) => self.position_resolved(position),
            AppEvent::PositionFailed(e) => self.position_failed(e),
            AppEvent::MapClicked(at) => self.map_clicked(at),
            AppEvent::TypeChanged(kind) => self.type_changed(kind),
            AppEvent::FormSubmitted => {
                self.submit()?;
            }
            AppEvent::ListItemSelected(id) => {
                self.select(&id)?;
            }
        }
        Ok(())
    }

    /// Initialize the map around `position` and replay stored markers
    pub fn position_resolved(&mut self, position: Coordinates) {
        if self.state != AppState::AwaitingLocation {
            tracing::debug!("Ignoring position {}: map already initialized", position);
            return;
        }

        let map = &self.config.map;
        let mut session = self.map_backend.init_session(position, map.default_zoom);
        session.add_base_layer(&map.tile_url_template, &map.attribution);
        session.listen_for_clicks();

        for workout in self.store.all() {
            self.markers
                .push(place_marker(&mut session, &self.config, workout));
        }

        tracing::info!(
            "Map ready at {} with {} workouts",
            position,
            self.store.len()
        );
        self.session = Some(session);
        self.state = AppState::MapReady(FormState::Hidden);
    }

    /// Report a failed position request; the map stays uninitialized
    pub fn position_failed(&mut self, error: GeolocationError) {
        tracing::warn!("Geolocation failed: {}", error);
        self.view.alert(error.user_message());
    }

    /// Capture the clicked point and open the form
    ///
    /// A click while the form is already open moves the pending point.
    pub fn map_clicked(&mut self, at: Coordinates) {
        if self.state == AppState::AwaitingLocation {
            tracing::debug!("Ignoring map click before the map exists");
            return;
        }

        self.pending_click = Some(at);
        self.view.show_form();
        self.view.focus(FormField::Distance);
        self.state = AppState::MapReady(FormState::Visible);
        tracing::debug!("Pending workout at {}", at);
    }

    /// Show the field that belongs to the selected type and hide the other
    pub fn type_changed(&mut self, kind: WorkoutKind) {
        self.view
            .set_row_visible(FormField::Cadence, kind == WorkoutKind::Running);
        self.view
            .set_row_visible(FormField::Elevation, kind == WorkoutKind::Cycling);
    }

    /// Raw values currently in the form
    pub fn form_input(&self) -> FormInput {
        FormInput {
            kind: self.view.field(FormField::Type),
            distance: self.view.field(FormField::Distance),
            duration: self.view.field(FormField::Duration),
            cadence: self.view.field(FormField::Cadence),
            elevation: self.view.field(FormField::Elevation),
        }
    }

    /// Validate the open form and, if valid, log a new workout
    ///
    /// On success the workout is stored, drawn and listed, the form is
    /// cleared and hidden, and the log is persisted. If persisting fails the
    /// workout stays in the store, the user is alerted and the error is
    /// returned.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        let at = match (self.state, self.pending_click) {
            (AppState::MapReady(FormState::Visible), Some(at)) => at,
            _ => {
                tracing::debug!("Ignoring submit with no open form");
                return Ok(SubmitOutcome::Ignored);
            }
        };

        let valid = match validate(&self.form_input()) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::debug!("Rejected workout: {}", e);
                self.view.alert(&e.user_message());
                return Ok(SubmitOutcome::Rejected(e));
            }
        };

        let mut workout = Workout::create(at, valid.distance_km, valid.duration_min, valid.variant);
        while self.store.contains(workout.id()) {
            workout = Workout::create(at, valid.distance_km, valid.duration_min, valid.variant);
        }
        let id = workout.id().to_string();

        if let Some(session) = self.session.as_mut() {
            self.markers
                .push(place_marker(session, &self.config, &workout));
        }
        self.view.render_workout(&ListEntry::from(&workout));
        self.store.add(workout)?;
        tracing::info!("Logged workout {}", id);

        self.hide_form(self.config.form.hide_delay());
        self.pending_click = None;
        self.state = AppState::MapReady(FormState::Hidden);

        self.persist()?;
        Ok(SubmitOutcome::Committed { id })
    }

    /// Re-centre the map on a listed workout and count the interaction
    ///
    /// Returns `false` without doing anything if the map does not exist yet
    /// or no workout has that id.
    pub fn select(&mut self, id: &str) -> Result<bool> {
        let Some(session) = self.session.as_mut() else {
            tracing::debug!("Ignoring selection of {} before the map exists", id);
            return Ok(false);
        };
        let Some(workout) = self.store.find_by_id_mut(id) else {
            tracing::debug!("Ignoring selection of unknown workout {}", id);
            return Ok(false);
        };

        session.set_view(
            workout.coordinates(),
            self.config.map.default_zoom,
            PanOptions::animated(&self.config.map),
        );
        workout.mark_interacted();

        self.persist()?;
        Ok(true)
    }

    /// Clear the persisted log and return to the initial state
    ///
    /// The host must call [`AppController::start`] again to rebuild the map.
    pub fn reset(&mut self) -> Result<()> {
        clear_workouts(&mut self.storage)?;

        self.store.clear();
        self.markers.clear();
        self.session = None;
        self.pending_click = None;
        self.hide_form(Duration::ZERO);
        self.view.clear_list();
        self.state = AppState::AwaitingLocation;

        tracing::info!("Workout log reset");
        Ok(())
    }

    fn hide_form(&mut self, delay: Duration) {
        for field in [
            FormField::Distance,
            FormField::Duration,
            FormField::Cadence,
            FormField::Elevation,
        ] {
            self.view.set_field(field, "");
        }
        self.view.hide_form(delay);
    }

    fn persist(&mut self) -> Result<()> {
        if let Err(e) = save_workouts(&mut self.storage, &self.store) {
            tracing::warn!("Failed to persist workouts: {}", e);
            self.view
                .alert(&format!("Could not save your workouts: {}", e));
            return Err(e);
        }
        Ok(())
    }

    pub fn state(&self) -> AppState {
        self.state
    }

    pub fn store(&self) -> &WorkoutStore {
        &self.store
    }

    pub fn pending_click(&self) -> Option<Coordinates> {
        self.pending_click
    }

    pub fn session(&self) -> Option<&M::Session> {
        self.session.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable view access, used by hosts to fill in form fields
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

fn place_marker<T: MapSession>(session: &mut T, config: &Config, workout: &Workout) -> T::Marker {
    let mut marker = session.add_marker(workout.coordinates());
    marker.bind_popup(&PopupOptions::for_workout(&config.popup, workout.kind()));
    marker.set_popup_content(&popup_content(workout));
    marker.open_popup();
    marker
}
