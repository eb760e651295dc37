//! Name-keyed attribute factory with value-based deduplication.
//!
//! The factory maps each declarative key to a constructor. After a successful
//! construction it looks for an equal attribute previously produced for the
//! same key and, if one is still alive, hands out that shared instance instead.
//!
//! The dedup table only holds weak references: an attribute lives exactly as
//! long as the rules that hold it. Attributes are immutable once returned, so
//! the lock guards the table only and evaluation needs no synchronization.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::attribute::{
    build_content_type, build_request_headers, build_resource_type, build_response_headers,
    build_stages, build_third_party, keys, ConditionAttribute,
};
use crate::error::ConditionError;

/// Constructor registered for a declarative key.
pub type Constructor = fn(&str, &Value) -> Result<ConditionAttribute, ConditionError>;

static GLOBAL_FACTORY: Lazy<AttributeFactory> = Lazy::new(AttributeFactory::new);

/// Build an attribute through the process-wide factory.
pub fn create_attribute(
    key: &str,
    value: &Value,
) -> Result<Arc<ConditionAttribute>, ConditionError> {
    AttributeFactory::global().create(key, value)
}

pub struct AttributeFactory {
    constructors: HashMap<&'static str, Constructor>,
    interned: Mutex<HashMap<&'static str, Vec<Weak<ConditionAttribute>>>>,
}

impl AttributeFactory {
    /// A factory with every built-in attribute registered and an empty dedup table.
    pub fn new() -> Self {
        let mut constructors: HashMap<&'static str, Constructor> = HashMap::new();
        constructors.insert(keys::RESOURCE_TYPE, build_resource_type);
        constructors.insert(keys::CONTENT_TYPE, build_content_type);
        constructors.insert(keys::EXCLUDE_CONTENT_TYPE, build_content_type);
        constructors.insert(keys::REQUEST_HEADERS, build_request_headers);
        constructors.insert(keys::EXCLUDE_REQUEST_HEADERS, build_request_headers);
        constructors.insert(keys::RESPONSE_HEADERS, build_response_headers);
        constructors.insert(keys::EXCLUDE_RESPONSE_HEADERS, build_response_headers);
        constructors.insert(keys::THIRD_PARTY, build_third_party);
        constructors.insert(keys::STAGES, build_stages);

        Self {
            constructors,
            interned: Mutex::new(HashMap::new()),
        }
    }

    /// The process-wide factory, created on first use.
    pub fn global() -> &'static AttributeFactory {
        &GLOBAL_FACTORY
    }

    pub fn is_known(&self, key: &str) -> bool {
        self.constructors.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<_> = self.constructors.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Build the attribute for `key`, reusing an equal live instance if there is one.
    pub fn create(
        &self,
        key: &str,
        value: &Value,
    ) -> Result<Arc<ConditionAttribute>, ConditionError> {
        let (&key, constructor) = self
            .constructors
            .get_key_value(key)
            .ok_or_else(|| ConditionError::UnknownKey(key.to_string()))?;

        let attribute = constructor(key, value).map_err(|e| {
            debug!(key, error = %e, "rejected condition attribute");
            e
        })?;

        let mut interned = self.interned.lock();
        let instances = interned.entry(key).or_default();
        instances.retain(|weak| weak.strong_count() > 0);

        let existing = instances
            .iter()
            .filter_map(Weak::upgrade)
            .find(|shared| shared.equals(&attribute));
        if let Some(shared) = existing {
            trace!(key, "reusing equal condition attribute");
            return Ok(shared);
        }

        let shared = Arc::new(attribute);
        instances.push(Arc::downgrade(&shared));
        debug!(key, "created condition attribute");
        Ok(shared)
    }

    /// Build every attribute of a condition description, in key order.
    ///
    /// Stops at the first key that fails.
    pub fn create_all(
        &self,
        description: &Map<String, Value>,
    ) -> Result<Vec<Arc<ConditionAttribute>>, ConditionError> {
        description
            .iter()
            .map(|(key, value)| self.create(key, value))
            .collect()
    }

    /// Number of interned attributes still referenced by someone.
    pub fn live_instances(&self) -> usize {
        self.interned
            .lock()
            .values()
            .flatten()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }
}

impl Default for AttributeFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AttributeFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributeFactory")
            .field("keys", &self.keys())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn test_unknown_key() {
        let factory = AttributeFactory::new();
        let err = factory.create("urlMatches", &json!("x")).unwrap_err();
        assert_eq!(err, ConditionError::UnknownKey("urlMatches".to_string()));
        assert!(!factory.is_known("urlMatches"));
    }

    #[test]
    fn test_all_keys_registered() {
        let factory = AttributeFactory::new();
        assert_eq!(
            factory.keys(),
            vec![
                "contentType",
                "excludeContentType",
                "excludeRequestHeaders",
                "excludeResponseHeaders",
                "requestHeaders",
                "resourceType",
                "responseHeaders",
                "stages",
                "thirdPartyForCookies",
            ]
        );
    }

    #[test]
    fn test_equal_values_share_one_instance() {
        let factory = AttributeFactory::new();
        let a = factory.create("resourceType", &json!(["image"])).unwrap();
        let b = factory.create("resourceType", &json!(["image"])).unwrap();
        let c = factory.create("resourceType", &json!(["script"])).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(factory.live_instances(), 2);
    }

    #[test]
    fn test_dedup_is_per_key() {
        let factory = AttributeFactory::new();
        let include = factory.create("contentType", &json!(["text/html"])).unwrap();
        let exclude = factory
            .create("excludeContentType", &json!(["text/html"]))
            .unwrap();
        assert!(!Arc::ptr_eq(&include, &exclude));
        assert_eq!(exclude.name(), "excludeContentType");
    }

    #[test]
    fn test_header_attributes_are_not_shared() {
        let factory = AttributeFactory::new();
        let value = json!([{ "name-equals": "Cookie" }]);
        let a = factory.create("requestHeaders", &value).unwrap();
        let b = factory.create("requestHeaders", &value).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_dropped_attributes_are_not_retained() {
        let factory = AttributeFactory::new();
        let first = factory.create("thirdPartyForCookies", &json!(true)).unwrap();
        assert_eq!(factory.live_instances(), 1);
        drop(first);
        assert_eq!(factory.live_instances(), 0);

        let second = factory.create("thirdPartyForCookies", &json!(true)).unwrap();
        assert_eq!(factory.live_instances(), 1);
        assert_eq!(second.to_value(), json!(true));
    }

    #[test]
    fn test_create_all_stops_at_first_error() {
        let factory = AttributeFactory::new();
        let description = json!({
            "contentType": ["text/html"],
            "stages": ["onBeforeRequest", "nope"],
            "thirdPartyForCookies": true
        });
        let err = factory
            .create_all(description.as_object().unwrap())
            .unwrap_err();
        assert_eq!(err.key(), "stages");

        let description = json!({
            "contentType": ["text/html"],
            "thirdPartyForCookies": true
        });
        let attributes = factory.create_all(description.as_object().unwrap()).unwrap();
        let names: Vec<_> = attributes.iter().map(|a| a.name()).collect();
        assert_eq!(names, vec!["contentType", "thirdPartyForCookies"]);
    }

    #[test]
    #[traced_test]
    fn test_rejection_is_logged() {
        let factory = AttributeFactory::new();
        assert!(factory.create("stages", &json!("onCompleted")).is_err());
        assert!(logs_contain("rejected condition attribute"));
    }

    #[test]
    fn test_global_factory_is_shared() {
        assert!(std::ptr::eq(
            AttributeFactory::global(),
            AttributeFactory::global()
        ));
        let a = create_attribute("stages", &json!(["onCompleted"])).unwrap();
        let b = create_attribute("stages", &json!(["onCompleted"])).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
