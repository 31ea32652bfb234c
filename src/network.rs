//! Network resource records
//!
//! A sidecar JSON input listing the resources the page loaded. The analyzer
//! only needs the script subset: a task blamed on a URL that is a known
//! script resource is the most actionable attribution.

use serde::{Deserialize, Deserializer};
use std::collections::HashSet;

/// Resource type classification for a network record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Document,
    Script,
    Stylesheet,
    Image,
    Font,
    Xhr,
    Other,
}

// Record producers disagree on casing ("script", "Script", "SCRIPT"), so
// the type string is matched case-insensitively; unknown types map to Other.
impl<'de> Deserialize<'de> for ResourceType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(match raw.to_ascii_lowercase().as_str() {
            "document" => ResourceType::Document,
            "script" => ResourceType::Script,
            "stylesheet" => ResourceType::Stylesheet,
            "image" => ResourceType::Image,
            "font" => ResourceType::Font,
            "xhr" => ResourceType::Xhr,
            _ => ResourceType::Other,
        })
    }
}

/// One network resource fetched during the page load
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkRecord {
    pub url: String,
    #[serde(rename = "resourceType")]
    pub resource_type: ResourceType,
}

/// Parse a JSON array of network records
pub fn parse_network_records(bytes: &[u8]) -> serde_json::Result<Vec<NetworkRecord>> {
    let records: Vec<NetworkRecord> = serde_json::from_slice(bytes)?;
    tracing::debug!(count = records.len(), "parsed network records");
    Ok(records)
}

/// URLs confirmed to be script resources
pub fn script_urls(records: &[NetworkRecord]) -> HashSet<String> {
    records
        .iter()
        .filter(|r| r.resource_type == ResourceType::Script)
        .map(|r| r.url.clone())
        .collect()
}
