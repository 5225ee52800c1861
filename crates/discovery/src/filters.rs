use std::collections::BTreeSet;

use directory::CreatorSummary;
use serde::{Deserialize, Serialize};

/// Named audience-size bracket used to facet creators.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FollowerRange {
    #[default]
    Any,
    Under10k,
    From10kTo100k,
    From100kTo1m,
    Over1m,
}

impl FollowerRange {
    /// Bracket membership.
    ///
    /// The lower boundary of `From10kTo100k` is inclusive while
    /// `From100kTo1m` and `Over1m` are strict at their lower ends. The
    /// asymmetry is preserved from the shipped behavior rather than fixed.
    pub fn contains(&self, followers: u64) -> bool {
        match self {
            FollowerRange::Any => true,
            FollowerRange::Under10k => followers < 10_000,
            FollowerRange::From10kTo100k => (10_000..=100_000).contains(&followers),
            FollowerRange::From100kTo1m => followers > 100_000 && followers <= 1_000_000,
            FollowerRange::Over1m => followers > 1_000_000,
        }
    }

    /// Parses the user-facing bracket label (`<10k`, `10k-100k`, `100k-1m`,
    /// `>1m`).
    pub fn parse_label(label: &str) -> Option<Self> {
        match label {
            "any" => Some(FollowerRange::Any),
            "<10k" => Some(FollowerRange::Under10k),
            "10k-100k" => Some(FollowerRange::From10kTo100k),
            "100k-1m" | "100k-1M" => Some(FollowerRange::From100kTo1m),
            ">1m" | ">1M" => Some(FollowerRange::Over1m),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FollowerRange::Any => "any",
            FollowerRange::Under10k => "<10k",
            FollowerRange::From10kTo100k => "10k-100k",
            FollowerRange::From100kTo1m => "100k-1M",
            FollowerRange::Over1m => ">1M",
        }
    }
}

/// Structured facets of the discovery screen. The pipeline receives one of
/// these per evaluation as an immutable input; ownership stays with the
/// screen-level UI state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExploreFilters {
    /// OR semantics within the set; empty means unrestricted.
    #[serde(default)]
    pub niches: BTreeSet<String>,
    /// Case-insensitive substring of the location label; empty means
    /// unrestricted.
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub follower_range: FollowerRange,
    /// When set, only creators flagged open to collaborate pass.
    #[serde(default)]
    pub open_to_collab_only: bool,
}

impl ExploreFilters {
    pub fn is_unrestricted(&self) -> bool {
        self.niches.is_empty()
            && self.location.is_empty()
            && self.follower_range == FollowerRange::Any
            && !self.open_to_collab_only
    }
}

/// Applies the discovery predicates over `creators` and yields the visible
/// set, consumed by both the list and the map.
///
/// Predicate groups AND together, in order: self-exclusion, niche set (OR
/// within), location substring, follower bracket, collab flag, free-text
/// search (OR across name/niche/location). Output order equals input order;
/// inputs are never mutated.
pub fn apply(
    creators: &[CreatorSummary],
    filters: &ExploreFilters,
    exclude_id: Option<&str>,
    search: &str,
) -> Vec<CreatorSummary> {
    let location_needle = filters.location.to_lowercase();
    let search_needle = search.to_lowercase();

    creators
        .iter()
        .filter(|creator| exclude_id != Some(creator.id.as_str()))
        .filter(|creator| filters.niches.is_empty() || filters.niches.contains(&creator.niche))
        .filter(|creator| {
            location_needle.is_empty()
                || creator.location.to_lowercase().contains(&location_needle)
        })
        .filter(|creator| filters.follower_range.contains(creator.followers))
        .filter(|creator| !filters.open_to_collab_only || creator.open_to_collab)
        .filter(|creator| {
            search_needle.is_empty()
                || creator.name.to_lowercase().contains(&search_needle)
                || creator.niche.to_lowercase().contains(&search_needle)
                || creator.location.to_lowercase().contains(&search_needle)
        })
        .cloned()
        .collect()
}
