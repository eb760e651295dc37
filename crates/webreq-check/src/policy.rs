//! Collaborators used when evaluating recorded samples.

use http::Uri;
use std::net::IpAddr;
use webreq_conditions::{RequestHandle, ResourceInfoAccessor, ResourceType, ThirdPartyCookiePolicy};

/// Treats two URLs as first-party when their hosts share the last two DNS
/// labels. IP hosts must match exactly.
///
/// This approximates registrable domains without a public suffix list, so
/// `a.co.uk` and `b.co.uk` count as the same site.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPolicy;

impl ThirdPartyCookiePolicy for HostPolicy {
    fn is_first_party(&self, url: &str, first_party_url: Option<&str>) -> bool {
        let Some(first_party_url) = first_party_url else {
            return true;
        };
        match (site_of(url), site_of(first_party_url)) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// The site key of `url`: the last two host labels, lowercased.
pub fn site_of(url: &str) -> Option<String> {
    let uri: Uri = url.parse().ok()?;
    let host = uri
        .host()?
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim_end_matches('.')
        .to_ascii_lowercase();
    if host.is_empty() {
        return None;
    }
    if host.parse::<IpAddr>().is_ok() {
        return Some(host);
    }

    let mut labels: Vec<&str> = host.rsplit('.').take(2).collect();
    labels.reverse();
    Some(labels.join("."))
}

/// Reports the resource type recorded with a sample, whatever the request.
#[derive(Debug, Clone, Copy)]
pub struct RecordedResourceType(pub Option<ResourceType>);

impl ResourceInfoAccessor for RecordedResourceType {
    fn resource_type_of(&self, _request: &dyn RequestHandle) -> Option<ResourceType> {
        self.0
    }
}
