use directory::{CreatorSummary, format_followers};

use crate::cluster::Cluster;

/// One activatable row of a marker popup. Row index doubles as the click
/// target; there is no markup or ad-hoc element id to collide on.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupRow {
    pub creator_id: String,
    pub name: String,
    pub niche: String,
    pub followers_label: String,
}

impl PopupRow {
    fn for_creator(creator: &CreatorSummary) -> Self {
        Self {
            creator_id: creator.id.clone(),
            name: creator.name.clone(),
            niche: creator.niche.clone(),
            followers_label: format_followers(creator.followers),
        }
    }
}

/// Typed popup content handed to the backend for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct PopupView {
    pub title: Option<String>,
    /// Each row carries a view-profile action; empty for purely
    /// informational popups such as the self-location marker.
    pub rows: Vec<PopupRow>,
}

impl PopupView {
    pub fn for_cluster(cluster: &Cluster) -> Self {
        Self {
            title: match cluster {
                Cluster::Singleton(_) => None,
                Cluster::Group(members) => Some(format!("{} creators here", members.len())),
            },
            rows: cluster.members().iter().map(PopupRow::for_creator).collect(),
        }
    }

    pub fn info(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            rows: Vec::new(),
        }
    }
}
