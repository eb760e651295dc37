//! Adapters for the `http` crate's request and header types.
//!
//! Header values that are not valid visible ASCII are skipped.

use http::header::CONTENT_TYPE;
use http::{HeaderMap, Request};

use crate::attribute::resolve_content_type;
use crate::request::{HeaderIter, RequestHandle, ResponseHeaders};

/// Request extension carrying the top-level URL a request was made for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstPartyUrl(pub String);

/// Borrowed [`RequestHandle`] over an [`http::Request`].
#[derive(Debug)]
pub struct HttpRequestView<'a> {
    url: String,
    first_party_url: Option<&'a str>,
    headers: &'a HeaderMap,
}

impl<'a> HttpRequestView<'a> {
    pub fn new<B>(request: &'a Request<B>) -> Self {
        Self {
            url: request.uri().to_string(),
            first_party_url: request
                .extensions()
                .get::<FirstPartyUrl>()
                .map(|fp| fp.0.as_str()),
            headers: request.headers(),
        }
    }
}

impl RequestHandle for HttpRequestView<'_> {
    fn url(&self) -> &str {
        &self.url
    }

    fn first_party_url(&self) -> Option<&str> {
        self.first_party_url
    }

    fn iter_headers(&self) -> HeaderIter<'_> {
        header_lines(self.headers)
    }
}

impl ResponseHeaders for HeaderMap {
    fn iter_header_lines(&self) -> HeaderIter<'_> {
        header_lines(self)
    }

    fn normalized_content_type(&self) -> Option<String> {
        resolve_content_type(
            self.get_all(CONTENT_TYPE)
                .iter()
                .filter_map(|value| value.to_str().ok()),
        )
    }
}

fn header_lines(headers: &HeaderMap) -> HeaderIter<'_> {
    Box::new(
        headers
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v))),
    )
}
