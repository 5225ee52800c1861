use foundation::{GeoBounds, LatLng};

/// Fixed low-zoom framing used until something better resolves.
pub const WORLD_CENTER: LatLng = LatLng { lat: 20.0, lng: 0.0 };
pub const WORLD_ZOOM: f64 = 2.0;
/// Close zoom used when flying to the device location.
pub const LOCATE_ZOOM: f64 = 13.0;
/// Outward padding applied to cluster-fit bounds so edge markers are not
/// clipped.
pub const BOUNDS_PAD: f64 = 0.3;

/// The single authoritative camera action the map should perform next.
///
/// At most one intent is honored per triggering event; a newly issued
/// intent supersedes rather than queues behind a prior one.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewportIntent {
    InitialWorldView,
    FitToClusters(GeoBounds),
    FlyTo(LatLng, f64),
    LocateDevice,
}

/// Arbitrates competing framing triggers: initial readiness, the one-shot
/// geolocation signal, filtered-set changes and manual recenter.
///
/// Once a device location is recorded it takes framing priority for the
/// rest of the session: cluster-bounds auto-fitting is disabled from that
/// point on.
#[derive(Debug, Default)]
pub struct ViewportController {
    device_location: Option<LatLng>,
}

impl ViewportController {
    pub fn new() -> Self {
        Self::default()
    }

    /// First successful map initialization: frame the world immediately.
    /// Whichever of {device location, cluster bounds} resolves first will
    /// overwrite this.
    pub fn on_map_ready(&self) -> ViewportIntent {
        ViewportIntent::InitialWorldView
    }

    /// First geolocation success of the session; later calls are no-ops.
    pub fn on_device_located(&mut self, point: LatLng) -> Option<ViewportIntent> {
        if self.device_location.is_some() {
            return None;
        }
        self.device_location = Some(point);
        Some(ViewportIntent::FlyTo(point, LOCATE_ZOOM))
    }

    /// The filtered set changed. Fit the camera over the rendered markers
    /// unless the user's own location already took framing priority, or the
    /// bounds are degenerate (no markers, or a single point).
    pub fn on_markers_changed(&self, bounds: Option<GeoBounds>) -> Option<ViewportIntent> {
        if self.device_location.is_some() {
            return None;
        }
        let bounds = bounds?;
        if bounds.is_degenerate() {
            return None;
        }
        Some(ViewportIntent::FitToClusters(bounds.padded(BOUNDS_PAD)))
    }

    /// Explicit recenter: fly home if the device location is known,
    /// otherwise ask for it again.
    pub fn on_recenter(&self) -> ViewportIntent {
        match self.device_location {
            Some(point) => ViewportIntent::FlyTo(point, LOCATE_ZOOM),
            None => ViewportIntent::LocateDevice,
        }
    }

    pub fn device_location(&self) -> Option<LatLng> {
        self.device_location
    }
}
