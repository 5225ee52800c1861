use std::collections::BTreeMap;

use directory::CreatorSummary;
use foundation::{GeoBounds, LatLng};

use crate::backend::{MapBackend, MapViewError, MarkerHandle, MarkerSpec};

pub(crate) fn creator_at(id: &str, lat: f64, lng: f64) -> CreatorSummary {
    CreatorSummary {
        id: id.to_string(),
        name: format!("Creator {id}"),
        niche: "food".to_string(),
        location: "Somewhere".to_string(),
        lat: Some(lat),
        lng: Some(lng),
        followers: 1_000,
        open_to_collab: false,
        avatar_url: format!("https://cdn.example/{id}.jpg"),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CameraCall {
    SetView(LatLng, f64),
    FlyTo(LatLng, f64),
    FitBounds(GeoBounds),
}

/// Recording backend used across the crate's tests.
#[derive(Debug, Default)]
pub(crate) struct FakeBackend {
    pub ready: bool,
    /// Fails the next N `add_marker` calls.
    pub fail_next_adds: u32,
    pub markers: BTreeMap<MarkerHandle, MarkerSpec>,
    pub camera: Vec<CameraCall>,
    pub tile_layers: Vec<String>,
    pub locate_requests: u32,
    next_handle: u64,
}

impl FakeBackend {
    pub fn ready() -> Self {
        Self {
            ready: true,
            ..Self::default()
        }
    }

    pub fn unready() -> Self {
        Self::default()
    }

    pub fn last_camera(&self) -> Option<&CameraCall> {
        self.camera.last()
    }
}

impl MapBackend for FakeBackend {
    fn is_ready(&self) -> bool {
        self.ready
    }

    fn add_tile_layer(&mut self, url_template: &str) {
        self.tile_layers.push(url_template.to_string());
    }

    fn set_view(&mut self, center: LatLng, zoom: f64) {
        self.camera.push(CameraCall::SetView(center, zoom));
    }

    fn fly_to(&mut self, center: LatLng, zoom: f64) {
        self.camera.push(CameraCall::FlyTo(center, zoom));
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        self.camera.push(CameraCall::FitBounds(bounds));
    }

    fn add_marker(&mut self, spec: MarkerSpec) -> Result<MarkerHandle, MapViewError> {
        if self.fail_next_adds > 0 {
            self.fail_next_adds -= 1;
            return Err(MapViewError::Backend("injected add failure".to_string()));
        }
        let handle = MarkerHandle(self.next_handle);
        self.next_handle += 1;
        self.markers.insert(handle, spec);
        Ok(handle)
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle);
    }

    fn marker_count(&self) -> usize {
        self.markers.len()
    }

    fn locate(&mut self) {
        self.locate_requests += 1;
    }
}
