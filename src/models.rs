use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One normalized calendar occurrence, regardless of which feed produced it.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Event {
    pub source: String,
    pub title: String,
    pub start: DateTime<FixedOffset>,
    pub location: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Stable sha256-derived key. Identity keys include the URL (selection slots),
/// merge keys exclude it (cross-source dedup).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventKey(String);

impl EventKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EventKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Event {
    pub fn identity_key(&self) -> EventKey {
        hash_parts(&[&self.title, &self.start.to_rfc3339(), &self.url])
    }

    pub fn merge_key(&self) -> EventKey {
        hash_parts(&[&self.title, &self.start.to_rfc3339()])
    }
}

fn hash_parts(parts: &[&str]) -> EventKey {
    let mut hasher = Sha256::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            hasher.update(b"|");
        }
        hasher.update(part.as_bytes());
    }
    EventKey(format!("{:x}", hasher.finalize()))
}
