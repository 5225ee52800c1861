use std::collections::{BTreeMap, HashMap};

use directory::CreatorSummary;
use foundation::{GeoBounds, LatLng, QuantizedKey};
use tracing::warn;

use crate::backend::{MapBackend, MarkerHandle, MarkerIcon, MarkerSpec};
use crate::cluster::Cluster;
use crate::popup::PopupView;

#[derive(Debug)]
struct RenderedMarker {
    handle: MarkerHandle,
    key: QuantizedKey,
    position: LatLng,
    members: Vec<CreatorSummary>,
}

/// Reconciles rendered markers against each newly built cluster set and owns
/// popup content plus click-target wiring.
///
/// Reconciliation is a full rebuild: every marker of the previous pass is
/// removed before the new set is added. Markers are tracked per handle, so
/// markers owned by other components (the self-location marker) survive a
/// pass untouched.
#[derive(Debug, Default)]
pub struct MarkerLifecycle {
    markers: Vec<RenderedMarker>,
    /// `(handle, row index)` -> index into `markers`. Populated only on
    /// popup-open events and cleared on every reconcile pass, so a stale
    /// target can never fire for a creator no longer present.
    targets: HashMap<(MarkerHandle, usize), usize>,
}

impl MarkerLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the rendered marker set with one marker per cluster.
    ///
    /// A backend failure while adding one marker is logged and skipped; the
    /// remaining clusters still render.
    pub fn reconcile(
        &mut self,
        backend: &mut dyn MapBackend,
        clusters: &BTreeMap<QuantizedKey, Cluster>,
    ) {
        for marker in self.markers.drain(..) {
            backend.remove_marker(marker.handle);
        }
        self.targets.clear();

        for (key, cluster) in clusters {
            let Some(position) = cluster.anchor() else {
                continue;
            };
            let spec = MarkerSpec {
                position,
                icon: icon_for(cluster),
                popup: PopupView::for_cluster(cluster),
            };
            match backend.add_marker(spec) {
                Ok(handle) => self.markers.push(RenderedMarker {
                    handle,
                    key: key.clone(),
                    position,
                    members: cluster.members().to_vec(),
                }),
                Err(e) => warn!("skipping marker at {key}: {e}"),
            }
        }
    }

    /// Re-derives the click targets for one popup. Called on every
    /// popup-open event because the map library may recreate popup content
    /// between opens. An unknown handle is a stale open and is ignored.
    pub fn on_popup_opened(&mut self, handle: MarkerHandle) {
        self.targets.retain(|(h, _), _| *h != handle);
        let Some(index) = self.markers.iter().position(|m| m.handle == handle) else {
            return;
        };
        for row in 0..self.markers[index].members.len() {
            self.targets.insert((handle, row), index);
        }
    }

    /// Resolves an activated popup row to its creator, if the target is
    /// still wired.
    pub fn activate(&self, handle: MarkerHandle, row: usize) -> Option<&CreatorSummary> {
        let index = *self.targets.get(&(handle, row))?;
        self.markers.get(index)?.members.get(row)
    }

    /// Union bounds over the rendered markers; `None` when nothing renders.
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.markers.iter().map(|m| m.position))
    }

    pub fn rendered_count(&self) -> usize {
        self.markers.len()
    }

    pub fn rendered_keys(&self) -> impl Iterator<Item = &QuantizedKey> {
        self.markers.iter().map(|m| &m.key)
    }

    /// Removes every owned marker; used on teardown.
    pub fn clear(&mut self, backend: &mut dyn MapBackend) {
        for marker in self.markers.drain(..) {
            backend.remove_marker(marker.handle);
        }
        self.targets.clear();
    }
}

fn icon_for(cluster: &Cluster) -> MarkerIcon {
    match cluster {
        Cluster::Singleton(creator) => MarkerIcon::Avatar {
            url: creator.avatar_url.clone(),
        },
        Cluster::Group(members) => MarkerIcon::ClusterBadge {
            count: members.len(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::MarkerLifecycle;
    use crate::backend::{MapBackend, MarkerIcon};
    use crate::cluster::build;
    use crate::testutil::{FakeBackend, creator_at};

    #[test]
    fn reconcile_renders_one_marker_per_cluster() {
        let mut backend = FakeBackend::ready();
        let mut lifecycle = MarkerLifecycle::new();
        let creators = vec![
            creator_at("a", 1.0, 1.0),
            creator_at("b", 1.0, 1.0),
            creator_at("c", 2.0, 2.0),
        ];
        lifecycle.reconcile(&mut backend, &build(&creators));

        assert_eq!(backend.marker_count(), 2);
        assert_eq!(lifecycle.rendered_count(), 2);

        let icons: Vec<&MarkerIcon> = backend.markers.values().map(|s| &s.icon).collect();
        assert!(
            icons
                .iter()
                .any(|i| matches!(i, MarkerIcon::ClusterBadge { count: 2 }))
        );
        assert!(icons.iter().any(|i| matches!(i, MarkerIcon::Avatar { .. })));
    }

    #[test]
    fn reconciling_twice_neither_leaks_nor_duplicates() {
        let mut backend = FakeBackend::ready();
        let mut lifecycle = MarkerLifecycle::new();
        let creators = vec![creator_at("a", 1.0, 1.0), creator_at("b", 2.0, 2.0)];
        let clusters = build(&creators);

        lifecycle.reconcile(&mut backend, &clusters);
        let count_once = backend.marker_count();
        lifecycle.reconcile(&mut backend, &clusters);
        assert_eq!(backend.marker_count(), count_once);
    }

    #[test]
    fn one_failing_marker_does_not_abort_the_batch() {
        let mut backend = FakeBackend::ready();
        backend.fail_next_adds = 1;
        let mut lifecycle = MarkerLifecycle::new();
        let creators = vec![
            creator_at("a", 1.0, 1.0),
            creator_at("b", 2.0, 2.0),
            creator_at("c", 3.0, 3.0),
        ];
        lifecycle.reconcile(&mut backend, &build(&creators));
        assert_eq!(backend.marker_count(), 2);
        assert_eq!(lifecycle.rendered_count(), 2);
    }

    #[test]
    fn click_targets_exist_only_after_popup_open() {
        let mut backend = FakeBackend::ready();
        let mut lifecycle = MarkerLifecycle::new();
        let creators = vec![creator_at("a", 1.0, 1.0), creator_at("b", 1.0, 1.0)];
        lifecycle.reconcile(&mut backend, &build(&creators));
        let handle = *backend.markers.keys().next().expect("marker");

        assert!(lifecycle.activate(handle, 0).is_none());

        lifecycle.on_popup_opened(handle);
        assert_eq!(lifecycle.activate(handle, 0).expect("row 0").id, "a");
        assert_eq!(lifecycle.activate(handle, 1).expect("row 1").id, "b");
        assert!(lifecycle.activate(handle, 2).is_none());
    }

    #[test]
    fn stale_targets_die_with_the_pass() {
        let mut backend = FakeBackend::ready();
        let mut lifecycle = MarkerLifecycle::new();
        let creators = vec![creator_at("a", 1.0, 1.0)];
        lifecycle.reconcile(&mut backend, &build(&creators));
        let old_handle = *backend.markers.keys().next().expect("marker");
        lifecycle.on_popup_opened(old_handle);
        assert!(lifecycle.activate(old_handle, 0).is_some());

        // New pass with a different creator set: the old wiring must be gone.
        let replacement = vec![creator_at("z", 9.0, 9.0)];
        lifecycle.reconcile(&mut backend, &build(&replacement));
        assert!(lifecycle.activate(old_handle, 0).is_none());
    }

    #[test]
    fn popup_open_for_unknown_handle_is_ignored() {
        let mut backend = FakeBackend::ready();
        let mut lifecycle = MarkerLifecycle::new();
        lifecycle.reconcile(&mut backend, &build(&[creator_at("a", 1.0, 1.0)]));
        lifecycle.on_popup_opened(crate::backend::MarkerHandle(999));
        assert!(lifecycle.activate(crate::backend::MarkerHandle(999), 0).is_none());
    }

    #[test]
    fn foreign_markers_survive_reconcile() {
        let mut backend = FakeBackend::ready();
        // A marker owned by someone else (the self-location marker).
        let foreign = backend
            .add_marker(crate::backend::MarkerSpec {
                position: foundation::LatLng::new(0.0, 0.0),
                icon: MarkerIcon::SelfLocation,
                popup: crate::popup::PopupView::info("You are here"),
            })
            .expect("add");

        let mut lifecycle = MarkerLifecycle::new();
        lifecycle.reconcile(&mut backend, &build(&[creator_at("a", 1.0, 1.0)]));
        lifecycle.reconcile(&mut backend, &build(&[creator_at("b", 2.0, 2.0)]));

        assert!(backend.markers.contains_key(&foreign));
        assert_eq!(backend.marker_count(), 2);
    }

    #[test]
    fn bounds_cover_rendered_markers() {
        let mut backend = FakeBackend::ready();
        let mut lifecycle = MarkerLifecycle::new();
        lifecycle.reconcile(
            &mut backend,
            &build(&[creator_at("a", 1.0, 1.0), creator_at("b", 5.0, -3.0)]),
        );
        let bounds = lifecycle.bounds().expect("bounds");
        assert_eq!(bounds.south, 1.0);
        assert_eq!(bounds.north, 5.0);
        assert_eq!(bounds.west, -3.0);
        assert_eq!(bounds.east, 1.0);

        lifecycle.clear(&mut backend);
        assert!(lifecycle.bounds().is_none());
        assert_eq!(backend.marker_count(), 0);
    }
}
