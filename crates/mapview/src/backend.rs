use foundation::{GeoBounds, LatLng};

use crate::popup::PopupView;

/// Zoom range the backend is required to support.
pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 18.0;

/// Base tile source, `{z}/{x}/{y}` template form.
pub const DEFAULT_TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";

/// Identifies one rendered marker in a deterministic, stable way.
///
/// This is intentionally a small, copyable handle so the click-target
/// registry can key on it without borrowing backend state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub enum MarkerIcon {
    /// Single creator: avatar-style pin.
    Avatar { url: String },
    /// Multi-creator cluster: count badge.
    ClusterBadge { count: usize },
    /// The viewer's own position.
    SelfLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub icon: MarkerIcon,
    pub popup: PopupView,
}

/// Asynchronous signals the backend delivers back to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// The map library (re)opened a marker's popup; click targets must be
    /// re-derived because popup content may have been recreated.
    PopupOpened(MarkerHandle),
    Located(LatLng),
    LocateFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapViewError {
    /// The backend never reported ready within the bounded poll.
    NeverReady,
    Backend(String),
}

impl std::fmt::Display for MapViewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapViewError::NeverReady => write!(f, "map backend never became ready"),
            MapViewError::Backend(msg) => write!(f, "map backend error: {msg}"),
        }
    }
}

impl std::error::Error for MapViewError {}

/// The fixed capability surface of the map library.
///
/// The session owns exactly one backend; only the marker lifecycle and the
/// viewport controller reach it. The trait assumes nothing about the
/// library's internals beyond this surface.
pub trait MapBackend {
    fn is_ready(&self) -> bool;
    fn add_tile_layer(&mut self, url_template: &str);
    fn set_view(&mut self, center: LatLng, zoom: f64);
    fn fly_to(&mut self, center: LatLng, zoom: f64);
    fn fit_bounds(&mut self, bounds: GeoBounds);
    fn add_marker(&mut self, spec: MarkerSpec) -> Result<MarkerHandle, MapViewError>;
    fn remove_marker(&mut self, handle: MarkerHandle);
    fn marker_count(&self) -> usize;
    /// One-shot device location request; the answer arrives later as a
    /// [`MapEvent::Located`] or [`MapEvent::LocateFailed`].
    fn locate(&mut self);
}
