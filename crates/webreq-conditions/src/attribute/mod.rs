//! Condition attributes.
//!
//! A condition attribute is one immutable predicate over a
//! [`RequestSnapshot`]. The set of kinds is closed, so attributes are a single
//! enum and callers match on it exhaustively. New attributes are added by
//! registering a constructor with the [`AttributeFactory`](crate::AttributeFactory),
//! not by implementing a trait.
//!
//! Each kind has a fixed [`StageMask`]; an attribute evaluated outside its
//! stages is never fulfilled.

mod build;
mod content_type;
pub mod keys;

pub use build::{
    build_content_type, build_request_headers, build_resource_type, build_response_headers,
    build_stages, build_third_party,
};
pub use content_type::{mime_type, resolve_content_type};

use serde_json::Value;

use crate::matcher::HeaderMatcher;
use crate::request::RequestSnapshot;
use crate::resource_type::ResourceType;
use crate::stage::{Stage, StageMask};

/// Discriminant of a [`ConditionAttribute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    ResourceType,
    ContentType,
    RequestHeaders,
    ResponseHeaders,
    ThirdParty,
    Stages,
}

/// One typed, immutable condition.
#[derive(Debug, Clone)]
pub enum ConditionAttribute {
    /// Fulfilled when the request's resource type is listed.
    ResourceType(Vec<ResourceType>),

    /// Fulfilled when list membership of the response MIME type equals `inclusive`.
    ContentType {
        content_types: Vec<String>,
        inclusive: bool,
    },

    /// Fulfilled when "some request header matches" equals `positive`.
    RequestHeaders {
        matcher: HeaderMatcher,
        positive: bool,
    },

    /// Fulfilled when "some response header matches" equals `positive`.
    ResponseHeaders {
        matcher: HeaderMatcher,
        positive: bool,
    },

    /// Fulfilled when the request's third-party status equals `match_third_party`.
    ThirdParty { match_third_party: bool },

    /// Fulfilled at the listed stages.
    Stages(StageMask),
}

impl ConditionAttribute {
    pub fn attribute_type(&self) -> AttributeType {
        match self {
            ConditionAttribute::ResourceType(_) => AttributeType::ResourceType,
            ConditionAttribute::ContentType { .. } => AttributeType::ContentType,
            ConditionAttribute::RequestHeaders { .. } => AttributeType::RequestHeaders,
            ConditionAttribute::ResponseHeaders { .. } => AttributeType::ResponseHeaders,
            ConditionAttribute::ThirdParty { .. } => AttributeType::ThirdParty,
            ConditionAttribute::Stages(_) => AttributeType::Stages,
        }
    }

    /// The declarative key this attribute is built from.
    ///
    /// Dual-polarity kinds report the key matching their polarity, e.g.
    /// `excludeContentType` for a non-inclusive content-type attribute.
    pub fn name(&self) -> &'static str {
        match self {
            ConditionAttribute::ResourceType(_) => keys::RESOURCE_TYPE,
            ConditionAttribute::ContentType { inclusive, .. } => {
                if *inclusive {
                    keys::CONTENT_TYPE
                } else {
                    keys::EXCLUDE_CONTENT_TYPE
                }
            }
            ConditionAttribute::RequestHeaders { positive, .. } => {
                if *positive {
                    keys::REQUEST_HEADERS
                } else {
                    keys::EXCLUDE_REQUEST_HEADERS
                }
            }
            ConditionAttribute::ResponseHeaders { positive, .. } => {
                if *positive {
                    keys::RESPONSE_HEADERS
                } else {
                    keys::EXCLUDE_RESPONSE_HEADERS
                }
            }
            ConditionAttribute::ThirdParty { .. } => keys::THIRD_PARTY,
            ConditionAttribute::Stages(_) => keys::STAGES,
        }
    }

    /// Stages at which this attribute may be evaluated.
    ///
    /// Request headers are only read at `onBeforeSendHeaders`, the point at
    /// which they are final; response headers and content type only at
    /// `onHeadersReceived`.
    pub fn stages(&self) -> StageMask {
        match self {
            ConditionAttribute::ResourceType(_) | ConditionAttribute::ThirdParty { .. } => {
                StageMask::all()
            }
            ConditionAttribute::ContentType { .. } | ConditionAttribute::ResponseHeaders { .. } => {
                StageMask::HEADERS_RECEIVED
            }
            ConditionAttribute::RequestHeaders { .. } => StageMask::BEFORE_SEND_HEADERS,
            ConditionAttribute::Stages(mask) => *mask,
        }
    }

    /// Evaluate this attribute against a snapshot.
    ///
    /// Never fails: missing data makes positive checks unfulfilled and
    /// negated checks fulfilled.
    pub fn is_fulfilled(&self, snapshot: &RequestSnapshot<'_>) -> bool {
        if !self.stages().includes(snapshot.stage) {
            return false;
        }

        match self {
            ConditionAttribute::ResourceType(types) => snapshot
                .resource_type()
                .is_some_and(|resource_type| types.contains(&resource_type)),

            ConditionAttribute::ContentType {
                content_types,
                inclusive,
            } => {
                let mime = snapshot
                    .response_headers
                    .and_then(|headers| headers.normalized_content_type())
                    .and_then(|content_type| mime_type(&content_type));
                let listed = mime.is_some_and(|mime| {
                    content_types
                        .iter()
                        .any(|listed| listed.eq_ignore_ascii_case(&mime))
                });
                listed == *inclusive
            }

            ConditionAttribute::RequestHeaders { matcher, positive } => {
                let found = snapshot
                    .request
                    .iter_headers()
                    .any(|(name, value)| matcher.test_name_value(name, value));
                found == *positive
            }

            ConditionAttribute::ResponseHeaders { matcher, positive } => {
                // No headers at all is treated as an empty header set.
                let found = snapshot.response_headers.is_some_and(|headers| {
                    headers
                        .iter_header_lines()
                        .any(|(name, value)| matcher.test_name_value(name, value))
                });
                found == *positive
            }

            ConditionAttribute::ThirdParty { match_third_party } => {
                let request = snapshot.request;
                let is_first_party = snapshot
                    .cookie_policy
                    .is_first_party(request.url(), request.first_party_url());
                *match_third_party == !is_first_party
            }

            ConditionAttribute::Stages(mask) => mask.includes(snapshot.stage),
        }
    }

    /// Value equality used by the factory to share identical attributes.
    ///
    /// Header-based attributes are never equal to anything, themselves
    /// included, so the factory never shares them. Two rules with identical
    /// header tests each hold their own matcher.
    pub fn equals(&self, other: &ConditionAttribute) -> bool {
        if self.attribute_type() != other.attribute_type() {
            return false;
        }

        match (self, other) {
            (ConditionAttribute::ResourceType(a), ConditionAttribute::ResourceType(b)) => a == b,
            (
                ConditionAttribute::ContentType {
                    content_types: a,
                    inclusive: a_inclusive,
                },
                ConditionAttribute::ContentType {
                    content_types: b,
                    inclusive: b_inclusive,
                },
            ) => a_inclusive == b_inclusive && a == b,
            (
                ConditionAttribute::ThirdParty {
                    match_third_party: a,
                },
                ConditionAttribute::ThirdParty {
                    match_third_party: b,
                },
            ) => a == b,
            (ConditionAttribute::Stages(a), ConditionAttribute::Stages(b)) => a == b,
            _ => false,
        }
    }

    /// Rebuild a declarative value that the factory accepts under [`name`](Self::name).
    pub fn to_value(&self) -> Value {
        match self {
            ConditionAttribute::ResourceType(types) => Value::Array(
                types
                    .iter()
                    .map(|t| Value::String(t.as_str().to_string()))
                    .collect(),
            ),
            ConditionAttribute::ContentType { content_types, .. } => Value::Array(
                content_types
                    .iter()
                    .map(|t| Value::String(t.clone()))
                    .collect(),
            ),
            ConditionAttribute::RequestHeaders { matcher, .. }
            | ConditionAttribute::ResponseHeaders { matcher, .. } => matcher.to_value(),
            ConditionAttribute::ThirdParty { match_third_party } => {
                Value::Bool(*match_third_party)
            }
            ConditionAttribute::Stages(mask) => Value::Array(
                mask.stages()
                    .map(|stage: Stage| Value::String(stage.as_str().to_string()))
                    .collect(),
            ),
        }
    }
}
