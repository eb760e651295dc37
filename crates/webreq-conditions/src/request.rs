//! The request/response view that conditions are evaluated against.
//!
//! The network stack owns requests, responses and the cookie policy. This
//! module only describes the narrow interfaces the engine reads through, and
//! bundles them into a [`RequestSnapshot`] for one lifecycle stage.

use crate::resource_type::ResourceType;
use crate::stage::Stage;

/// Iterator over `(name, value)` header pairs.
pub type HeaderIter<'a> = Box<dyn Iterator<Item = (&'a str, &'a str)> + 'a>;

/// An in-flight network request.
pub trait RequestHandle {
    /// The request URL.
    fn url(&self) -> &str;

    /// The top-level URL the request was made on behalf of, if known.
    fn first_party_url(&self) -> Option<&str>;

    /// The request headers as they will be sent.
    fn iter_headers(&self) -> HeaderIter<'_>;
}

/// Headers of a received response.
pub trait ResponseHeaders {
    /// Every header line, in received order, repeated names included.
    fn iter_header_lines(&self) -> HeaderIter<'_>;

    /// The effective `Content-Type` header value, if present.
    ///
    /// With repeated values this is a single one of them, never a join.
    fn normalized_content_type(&self) -> Option<String>;
}

/// Looks up the resource type of a request.
pub trait ResourceInfoAccessor {
    fn resource_type_of(&self, request: &dyn RequestHandle) -> Option<ResourceType>;
}

impl<F> ResourceInfoAccessor for F
where
    F: Fn(&dyn RequestHandle) -> Option<ResourceType>,
{
    fn resource_type_of(&self, request: &dyn RequestHandle) -> Option<ResourceType> {
        self(request)
    }
}

/// Strict third-party cookie policy.
pub trait ThirdPartyCookiePolicy {
    /// Whether `url` counts as first-party relative to `first_party_url`.
    fn is_first_party(&self, url: &str, first_party_url: Option<&str>) -> bool;
}

impl<F> ThirdPartyCookiePolicy for F
where
    F: Fn(&str, Option<&str>) -> bool,
{
    fn is_first_party(&self, url: &str, first_party_url: Option<&str>) -> bool {
        self(url, first_party_url)
    }
}

/// Everything a condition may look at for one request at one stage.
///
/// All data must already be available; evaluation never blocks.
#[derive(Clone, Copy)]
pub struct RequestSnapshot<'a> {
    pub stage: Stage,
    pub request: &'a dyn RequestHandle,
    /// `None` when the stage has no response (yet), or for synthetic stages.
    pub response_headers: Option<&'a dyn ResponseHeaders>,
    pub resource_info: &'a dyn ResourceInfoAccessor,
    pub cookie_policy: &'a dyn ThirdPartyCookiePolicy,
}

impl<'a> RequestSnapshot<'a> {
    pub fn new(
        stage: Stage,
        request: &'a dyn RequestHandle,
        resource_info: &'a dyn ResourceInfoAccessor,
        cookie_policy: &'a dyn ThirdPartyCookiePolicy,
    ) -> Self {
        Self {
            stage,
            request,
            response_headers: None,
            resource_info,
            cookie_policy,
        }
    }

    pub fn with_response_headers(mut self, headers: &'a dyn ResponseHeaders) -> Self {
        self.response_headers = Some(headers);
        self
    }

    /// Same snapshot at a different stage.
    pub fn at_stage(mut self, stage: Stage) -> Self {
        self.stage = stage;
        self
    }

    pub(crate) fn resource_type(&self) -> Option<ResourceType> {
        self.resource_info.resource_type_of(self.request)
    }
}

impl std::fmt::Debug for RequestSnapshot<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSnapshot")
            .field("stage", &self.stage)
            .field("url", &self.request.url())
            .field("has_response_headers", &self.response_headers.is_some())
            .finish()
    }
}
