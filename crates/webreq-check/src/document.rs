//! Check file format and loading.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::debug;
use webreq_conditions::{ResourceType, Stage};

/// On-disk encoding of a check file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from a file extension; `None` for files we don't read.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(DocumentFormat::Json),
            "yaml" | "yml" => Some(DocumentFormat::Yaml),
            _ => None,
        }
    }
}

/// A set of condition descriptions plus the samples to evaluate them on.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckDocument {
    #[serde(default)]
    pub conditions: Vec<ConditionEntry>,
    #[serde(default)]
    pub samples: Vec<SampleEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionEntry {
    pub id: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

/// A recorded request at one lifecycle stage.
///
/// Header lines use the `Name: value` form. A missing `responseHeaders`
/// means the stage had no response headers, which is different from an
/// empty list only in intent; both evaluate as "no headers".
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleEntry {
    pub id: String,
    pub stage: Stage,
    pub url: String,
    #[serde(default)]
    pub first_party_url: Option<String>,
    #[serde(default)]
    pub resource_type: Option<ResourceType>,
    #[serde(default)]
    pub request_headers: Vec<String>,
    #[serde(default)]
    pub response_headers: Option<Vec<String>>,
}

/// Split a `Name: value` line. The name must be non-empty.
pub fn split_header_line(line: &str) -> Option<(&str, &str)> {
    let (name, value) = line.split_once(':')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    Some((name, value.trim()))
}

pub fn parse_document(content: &str, format: DocumentFormat) -> Result<CheckDocument> {
    match format {
        DocumentFormat::Json => serde_json::from_str(content).context("Invalid JSON check file"),
        DocumentFormat::Yaml => serde_yaml::from_str(content).context("Invalid YAML check file"),
    }
}

/// Read and parse a check file, choosing the format from its extension
/// (JSON when the extension is not recognized).
pub fn load_document(path: &Path) -> Result<CheckDocument> {
    debug!(path = %path.display(), "loading check file");
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let format = DocumentFormat::from_path(path).unwrap_or(DocumentFormat::Json);
    parse_document(&content, format).with_context(|| format!("Failed to parse {}", path.display()))
}
