use serde::{Deserialize, Serialize};

/// Read-only projection of a creator record as the discovery surfaces
/// consume it. Produced upstream; nothing in this workspace mutates one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub niche: String,
    #[serde(default)]
    pub location: String,
    /// Geocoded position; absent or non-finite values keep the creator off
    /// the map while it stays visible in the list.
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub followers: u64,
    #[serde(default)]
    pub open_to_collab: bool,
    #[serde(default)]
    pub avatar_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    LoadFailed(String),
    Corrupt(String),
}

impl std::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectoryError::LoadFailed(msg) => write!(f, "creator load failed: {msg}"),
            DirectoryError::Corrupt(msg) => write!(f, "creator data corrupt: {msg}"),
        }
    }
}

impl std::error::Error for DirectoryError {}

/// The read API the discovery screens are built against.
///
/// A failed fetch surfaces as a single load-failed state; partial results
/// are never applied.
pub trait CreatorStore {
    fn fetch_all(&self) -> Result<Vec<CreatorSummary>, DirectoryError>;
}

#[derive(Debug, Default)]
pub struct InMemoryCreatorStore {
    creators: Vec<CreatorSummary>,
}

impl InMemoryCreatorStore {
    pub fn new(creators: Vec<CreatorSummary>) -> Self {
        Self { creators }
    }
}

impl CreatorStore for InMemoryCreatorStore {
    fn fetch_all(&self) -> Result<Vec<CreatorSummary>, DirectoryError> {
        Ok(self.creators.clone())
    }
}

pub fn creators_from_json(payload: &str) -> Result<Vec<CreatorSummary>, DirectoryError> {
    serde_json::from_str(payload).map_err(|e| DirectoryError::Corrupt(e.to_string()))
}

/// Compact audience-size label: `812`, `10k`, `12.5k`, `1.2M`.
pub fn format_followers(count: u64) -> String {
    if count >= 1_000_000 {
        trim_decimal(count as f64 / 1_000_000.0, "M")
    } else if count >= 1_000 {
        trim_decimal(count as f64 / 1_000.0, "k")
    } else {
        count.to_string()
    }
}

fn trim_decimal(value: f64, suffix: &str) -> String {
    let text = format!("{value:.1}");
    let text = text.strip_suffix(".0").unwrap_or(&text);
    format!("{text}{suffix}")
}
