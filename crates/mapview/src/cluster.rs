use std::collections::BTreeMap;

use directory::CreatorSummary;
use foundation::{LatLng, QuantizedKey, quantize};

/// One or more creators sharing a quantized coordinate key, rendered as a
/// single map marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Cluster {
    Singleton(CreatorSummary),
    /// Size >= 2; members keep encounter order from the filtered set.
    Group(Vec<CreatorSummary>),
}

impl Cluster {
    pub fn members(&self) -> &[CreatorSummary] {
        match self {
            Cluster::Singleton(creator) => std::slice::from_ref(creator),
            Cluster::Group(members) => members,
        }
    }

    pub fn size(&self) -> usize {
        self.members().len()
    }

    /// Marker position: the first-encountered member's exact coordinates.
    pub fn anchor(&self) -> Option<LatLng> {
        let first = self.members().first()?;
        let p = LatLng::new(first.lat?, first.lng?);
        p.is_finite().then_some(p)
    }

    /// Appends a member, upgrading a singleton to a group.
    fn push(&mut self, creator: CreatorSummary) {
        match self {
            Cluster::Singleton(first) => {
                let first = first.clone();
                *self = Cluster::Group(vec![first, creator]);
            }
            Cluster::Group(members) => members.push(creator),
        }
    }
}

/// Quantized grouping key for a creator, when it has finite coordinates.
pub fn creator_key(creator: &CreatorSummary) -> Option<QuantizedKey> {
    quantize(creator.lat?, creator.lng?)
}

/// Groups `creators` by quantized coordinate key in a single pass.
///
/// Ordering contract:
/// - Within a group, members appear in encounter order.
/// - Map iteration is key-ordered, so the same input always yields the same
///   observable sequence of clusters.
///
/// Creators without a key are skipped; they stay visible in the list view
/// but never reach the map. O(n) in creator count; the candidate set is
/// client-scale, so no spatial index.
pub fn build(creators: &[CreatorSummary]) -> BTreeMap<QuantizedKey, Cluster> {
    let mut clusters: BTreeMap<QuantizedKey, Cluster> = BTreeMap::new();
    for creator in creators {
        let Some(key) = creator_key(creator) else {
            continue;
        };
        match clusters.get_mut(&key) {
            Some(cluster) => cluster.push(creator.clone()),
            None => {
                clusters.insert(key, Cluster::Singleton(creator.clone()));
            }
        }
    }
    clusters
}

#[cfg(test)]
mod tests {
    use super::{Cluster, build};
    use crate::testutil::creator_at;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    #[test]
    fn nearby_coordinates_group_and_distant_ones_do_not() {
        let creators = vec![
            creator_at("a", 12.971_60, 77.594_60),
            creator_at("b", 12.971_61, 77.594_64),
            creator_at("c", 13.0, 77.6),
        ];
        let clusters = build(&creators);
        assert_eq!(clusters.len(), 2);

        let sizes: Vec<usize> = clusters.values().map(Cluster::size).collect();
        assert!(sizes.contains(&2));
        assert!(sizes.contains(&1));

        let group = clusters
            .values()
            .find(|c| c.size() == 2)
            .expect("group cluster");
        let ids: Vec<&str> = group.members().iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"], "encounter order preserved");
    }

    #[test]
    fn clustering_is_a_partition_of_keyed_creators() {
        let creators = vec![
            creator_at("a", 1.0, 1.0),
            creator_at("b", 1.0, 1.0),
            creator_at("c", 2.0, 2.0),
            {
                let mut keyless = creator_at("d", 0.0, 0.0);
                keyless.lat = None;
                keyless
            },
            {
                let mut bad = creator_at("e", 0.0, 0.0);
                bad.lng = Some(f64::NAN);
                bad
            },
        ];
        let clusters = build(&creators);

        let mut seen = BTreeSet::new();
        for cluster in clusters.values() {
            for member in cluster.members() {
                assert!(seen.insert(member.id.clone()), "no duplicates");
            }
        }
        let expected: BTreeSet<String> =
            ["a", "b", "c"].into_iter().map(String::from).collect();
        assert_eq!(seen, expected, "keyed creators exactly");
    }

    #[test]
    fn same_input_yields_same_cluster_sequence() {
        let creators = vec![
            creator_at("a", 5.0, 5.0),
            creator_at("b", -3.0, 8.0),
            creator_at("c", 5.0, 5.0),
        ];
        let first: Vec<_> = build(&creators).into_iter().collect();
        let second: Vec<_> = build(&creators).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn anchor_is_first_member_position() {
        let creators = vec![
            creator_at("a", 12.971_60, 77.594_60),
            creator_at("b", 12.971_61, 77.594_64),
        ];
        let clusters = build(&creators);
        let cluster = clusters.values().next().expect("cluster");
        let anchor = cluster.anchor().expect("anchor");
        assert_eq!(anchor.lat, 12.971_60);
        assert_eq!(anchor.lng, 77.594_60);
    }

    #[test]
    fn empty_input_builds_no_clusters() {
        assert!(build(&[]).is_empty());
    }
}
