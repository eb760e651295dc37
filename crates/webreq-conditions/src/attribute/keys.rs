//! Declarative attribute keys.

pub const RESOURCE_TYPE: &str = "resourceType";
pub const CONTENT_TYPE: &str = "contentType";
pub const EXCLUDE_CONTENT_TYPE: &str = "excludeContentType";
pub const REQUEST_HEADERS: &str = "requestHeaders";
pub const EXCLUDE_REQUEST_HEADERS: &str = "excludeRequestHeaders";
pub const RESPONSE_HEADERS: &str = "responseHeaders";
pub const EXCLUDE_RESPONSE_HEADERS: &str = "excludeResponseHeaders";
pub const THIRD_PARTY: &str = "thirdPartyForCookies";
pub const STAGES: &str = "stages";
