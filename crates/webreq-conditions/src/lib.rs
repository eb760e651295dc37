//! Declarative condition attributes for web request rules.
//!
//! Rule-loading code hands a declarative key and a raw value to the
//! [`AttributeFactory`], which returns a typed, shared [`ConditionAttribute`].
//! Per request and lifecycle stage, the rule engine asks each attribute
//! whether it is fulfilled by a [`RequestSnapshot`].
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use webreq_conditions::{
//!     create_attribute, RequestHandle, RequestRecord, RequestSnapshot, ResourceType, Stage,
//! };
//!
//! let stages = create_attribute("stages", &json!(["onBeforeRequest", "onHeadersReceived"]))
//!     .unwrap();
//!
//! let request = RequestRecord::new("https://example.com/");
//! let resource_info = |_: &dyn RequestHandle| Some(ResourceType::MainFrame);
//! let cookie_policy = |_: &str, _: Option<&str>| true;
//! let snapshot = RequestSnapshot::new(
//!     Stage::BeforeSendHeaders,
//!     &request,
//!     &resource_info,
//!     &cookie_policy,
//! );
//!
//! assert!(!stages.is_fulfilled(&snapshot));
//! assert!(stages.is_fulfilled(&snapshot.at_stage(Stage::HeadersReceived)));
//! ```

pub mod adapters;
pub mod attribute;
pub mod error;
pub mod factory;
pub mod matcher;
pub mod record;
pub mod request;
pub mod resource_type;
pub mod stage;

pub use adapters::{FirstPartyUrl, HttpRequestView};
pub use attribute::{AttributeType, ConditionAttribute};
pub use error::ConditionError;
pub use factory::{create_attribute, AttributeFactory};
pub use matcher::{HeaderMatchTest, HeaderMatcher, MatchKind, StringMatchTest};
pub use record::{RequestRecord, ResponseRecord};
pub use request::{
    RequestHandle, RequestSnapshot, ResourceInfoAccessor, ResponseHeaders,
    ThirdPartyCookiePolicy,
};
pub use resource_type::ResourceType;
pub use stage::{Stage, StageMask};
