use foundation::LatLng;
use tracing::{debug, warn};

use crate::backend::{MapBackend, MarkerIcon, MarkerSpec};
use crate::popup::PopupView;

/// One-shot device location watcher.
///
/// Requests the platform capability once per map session, emits at most one
/// "found" point upward and renders the distinct self-location marker. On
/// failure it stays silent; cluster-bounds fitting remains the framing
/// authority. There is no retry loop — a manual recenter is the only
/// resubmission path.
#[derive(Debug, Default)]
pub struct GeolocationWatcher {
    requested: bool,
    found: bool,
}

impl GeolocationWatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues the session's single automatic location request.
    pub fn request(&mut self, backend: &mut dyn MapBackend) {
        if self.requested {
            return;
        }
        self.requested = true;
        backend.locate();
    }

    /// Resubmission via the explicit recenter action; allowed after a
    /// failure, still a no-op once a location was found.
    pub fn rerequest(&mut self, backend: &mut dyn MapBackend) {
        if self.found {
            return;
        }
        self.requested = true;
        backend.locate();
    }

    /// Handles a location callback. Returns the point on the first success
    /// so the caller can hand it to the viewport; every later callback
    /// returns `None`.
    pub fn on_located(&mut self, backend: &mut dyn MapBackend, point: LatLng) -> Option<LatLng> {
        if self.found || !point.is_finite() {
            return None;
        }
        self.found = true;

        let spec = MarkerSpec {
            position: point,
            icon: MarkerIcon::SelfLocation,
            popup: PopupView::info("You are here"),
        };
        if let Err(e) = backend.add_marker(spec) {
            // The framing still moves to the device point; only the pin is
            // missing.
            warn!("self-location marker failed: {e}");
        }
        Some(point)
    }

    /// Denial or timeout is not surfaced to the user.
    pub fn on_failed(&mut self, reason: &str) {
        debug!("geolocation unavailable: {reason}");
    }

    pub fn location_found(&self) -> bool {
        self.found
    }
}

#[cfg(test)]
mod tests {
    use super::GeolocationWatcher;
    use crate::backend::{MapBackend, MarkerIcon};
    use crate::testutil::FakeBackend;
    use foundation::LatLng;

    #[test]
    fn requests_only_once_per_session() {
        let mut backend = FakeBackend::ready();
        let mut watcher = GeolocationWatcher::new();
        watcher.request(&mut backend);
        watcher.request(&mut backend);
        assert_eq!(backend.locate_requests, 1);
    }

    #[test]
    fn rerequest_resubmits_until_found() {
        let mut backend = FakeBackend::ready();
        let mut watcher = GeolocationWatcher::new();
        watcher.request(&mut backend);
        watcher.on_failed("denied");
        watcher.rerequest(&mut backend);
        assert_eq!(backend.locate_requests, 2);

        watcher.on_located(&mut backend, LatLng::new(1.0, 2.0));
        watcher.rerequest(&mut backend);
        assert_eq!(backend.locate_requests, 2);
    }

    #[test]
    fn emits_the_point_exactly_once_and_renders_the_self_marker() {
        let mut backend = FakeBackend::ready();
        let mut watcher = GeolocationWatcher::new();
        let point = LatLng::new(52.52, 13.405);

        assert_eq!(watcher.on_located(&mut backend, point), Some(point));
        assert_eq!(watcher.on_located(&mut backend, point), None);

        assert_eq!(backend.marker_count(), 1);
        let marker = backend.markers.values().next().expect("self marker");
        assert_eq!(marker.icon, MarkerIcon::SelfLocation);
        assert!(marker.popup.rows.is_empty(), "no navigation action");
    }

    #[test]
    fn non_finite_points_are_rejected() {
        let mut backend = FakeBackend::ready();
        let mut watcher = GeolocationWatcher::new();
        assert_eq!(
            watcher.on_located(&mut backend, LatLng::new(f64::NAN, 1.0)),
            None
        );
        assert!(!watcher.location_found());
        assert_eq!(backend.marker_count(), 0);
    }

    #[test]
    fn marker_failure_still_reports_the_point() {
        let mut backend = FakeBackend::ready();
        backend.fail_next_adds = 1;
        let mut watcher = GeolocationWatcher::new();
        let point = LatLng::new(1.0, 2.0);
        assert_eq!(watcher.on_located(&mut backend, point), Some(point));
        assert_eq!(backend.marker_count(), 0);
    }
}
