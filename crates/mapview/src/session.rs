use directory::CreatorSummary;
use tracing::debug;

use crate::backend::{DEFAULT_TILE_URL, MapBackend, MapEvent, MapViewError, MarkerHandle};
use crate::cluster;
use crate::geolocate::GeolocationWatcher;
use crate::markers::MarkerLifecycle;
use crate::viewport::{ViewportController, ViewportIntent, WORLD_CENTER, WORLD_ZOOM};

/// Readiness checks allowed before the session gives up and surfaces a
/// maps-unavailable state instead of hanging.
pub const MAX_READY_CHECKS: u32 = 8;

/// Navigation callback invoked when a popup row is activated.
pub type ViewProfileFn = Box<dyn FnMut(&CreatorSummary)>;

/// Owned, explicitly-scoped map resource for one discovery screen.
///
/// The session exclusively owns the backend instance and wires the cluster
/// builder, marker lifecycle, viewport controller and geolocation watcher
/// together. Creation, updates and teardown are explicit operations; after
/// teardown every callback is a no-op.
pub struct MapSession<B: MapBackend> {
    backend: B,
    markers: MarkerLifecycle,
    viewport: ViewportController,
    geolocation: GeolocationWatcher,
    on_view_profile: ViewProfileFn,
    ready: bool,
    gave_up: bool,
    ready_checks: u32,
    mounted: bool,
}

impl<B: MapBackend> MapSession<B> {
    pub fn new(backend: B, on_view_profile: ViewProfileFn) -> Self {
        Self {
            backend,
            markers: MarkerLifecycle::new(),
            viewport: ViewportController::new(),
            geolocation: GeolocationWatcher::new(),
            on_view_profile,
            ready: false,
            gave_up: false,
            ready_checks: 0,
            mounted: true,
        }
    }

    /// Polls backend readiness.
    ///
    /// Returns `Ok(true)` once the backend is ready — at that moment the
    /// initial world view is framed and the session's single automatic
    /// geolocation request goes out. Returns `Ok(false)` while still
    /// waiting, and `Err(NeverReady)` once [`MAX_READY_CHECKS`] checks have
    /// failed; the list view stays fully usable without the map.
    pub fn poll_ready(&mut self) -> Result<bool, MapViewError> {
        if self.ready {
            return Ok(true);
        }
        if self.gave_up {
            return Err(MapViewError::NeverReady);
        }
        if self.backend.is_ready() {
            self.ready = true;
            self.backend.add_tile_layer(DEFAULT_TILE_URL);
            let intent = self.viewport.on_map_ready();
            self.apply(intent);
            self.geolocation.request(&mut self.backend);
            return Ok(true);
        }
        self.ready_checks += 1;
        if self.ready_checks >= MAX_READY_CHECKS {
            self.gave_up = true;
            return Err(MapViewError::NeverReady);
        }
        Ok(false)
    }

    /// The filtered creator set changed: rebuild clusters, reconcile the
    /// rendered markers and let the viewport refit if it still has framing
    /// authority. A no-op until the map is ready.
    pub fn set_creators(&mut self, filtered: &[CreatorSummary]) {
        if !self.mounted || !self.ready {
            return;
        }
        let clusters = cluster::build(filtered);
        self.markers.reconcile(&mut self.backend, &clusters);
        if let Some(intent) = self.viewport.on_markers_changed(self.markers.bounds()) {
            self.apply(intent);
        }
    }

    /// Feeds one backend event into the session. Events arriving after
    /// teardown are dropped, never a crash.
    pub fn handle_event(&mut self, event: MapEvent) {
        if !self.mounted {
            debug!("dropping event after teardown");
            return;
        }
        match event {
            MapEvent::PopupOpened(handle) => self.markers.on_popup_opened(handle),
            MapEvent::Located(point) => {
                let Some(point) = self.geolocation.on_located(&mut self.backend, point) else {
                    return;
                };
                if let Some(intent) = self.viewport.on_device_located(point) {
                    self.apply(intent);
                }
            }
            MapEvent::LocateFailed(reason) => self.geolocation.on_failed(&reason),
        }
    }

    /// Activates one popup row; invokes the navigation callback when the
    /// target is wired. Returns whether a creator was resolved.
    pub fn activate_popup_row(&mut self, handle: MarkerHandle, row: usize) -> bool {
        if !self.mounted {
            return false;
        }
        let Some(creator) = self.markers.activate(handle, row) else {
            return false;
        };
        (self.on_view_profile)(creator);
        true
    }

    /// Explicit recenter action.
    pub fn recenter(&mut self) {
        if !self.mounted || !self.ready {
            return;
        }
        let intent = self.viewport.on_recenter();
        self.apply(intent);
    }

    /// Leaves the screen: releases the rendered markers and turns every
    /// later callback into a no-op. The backend itself is released when the
    /// session drops.
    pub fn teardown(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.markers.clear(&mut self.backend);
    }

    fn apply(&mut self, intent: ViewportIntent) {
        match intent {
            ViewportIntent::InitialWorldView => self.backend.set_view(WORLD_CENTER, WORLD_ZOOM),
            ViewportIntent::FitToClusters(bounds) => self.backend.fit_bounds(bounds),
            ViewportIntent::FlyTo(point, zoom) => self.backend.fly_to(point, zoom),
            ViewportIntent::LocateDevice => self.geolocation.rerequest(&mut self.backend),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn rendered_marker_count(&self) -> usize {
        self.markers.rendered_count()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}
