//! Owned request/response records.
//!
//! Useful when the request has already been captured (replayed traffic,
//! fixtures, offline checks) rather than borrowed from a live network stack.

use serde::{Deserialize, Serialize};

use crate::attribute::resolve_content_type;
use crate::request::{HeaderIter, RequestHandle, ResponseHeaders};

/// A captured request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestRecord {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_party_url: Option<String>,
    #[serde(default)]
    pub headers: Vec<(String, String)>,
}

impl RequestRecord {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn first_party(mut self, url: impl Into<String>) -> Self {
        self.first_party_url = Some(url.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl RequestHandle for RequestRecord {
    fn url(&self) -> &str {
        &self.url
    }

    fn first_party_url(&self) -> Option<&str> {
        self.first_party_url.as_deref()
    }

    fn iter_headers(&self) -> HeaderIter<'_> {
        Box::new(self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str())))
    }
}

/// Captured response header lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct ResponseRecord {
    pub headers: Vec<(String, String)>,
}

impl ResponseRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl FromIterator<(String, String)> for ResponseRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            headers: iter.into_iter().collect(),
        }
    }
}

impl ResponseHeaders for ResponseRecord {
    fn iter_header_lines(&self) -> HeaderIter<'_> {
        Box::new(self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str())))
    }

    fn normalized_content_type(&self) -> Option<String> {
        resolve_content_type(
            self.headers
                .iter()
                .filter(|(name, _)| name.eq_ignore_ascii_case("content-type"))
                .map(|(_, value)| value.as_str()),
        )
    }
}
