//! OR-of-AND matching over header name/value pairs.

use serde_json::Value;

use super::header_test::{HeaderMatchTest, HeaderMatcherError};

/// Matches a header line if any of its groups matches.
///
/// A matcher with no groups never matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMatcher {
    groups: Vec<HeaderMatchTest>,
}

impl HeaderMatcher {
    pub fn new(groups: Vec<HeaderMatchTest>) -> Self {
        Self { groups }
    }

    /// Build a matcher from a list of group dictionaries.
    ///
    /// A single malformed group fails the whole matcher.
    pub fn from_value(value: &Value) -> Result<Self, HeaderMatcherError> {
        let items = value.as_array().ok_or(HeaderMatcherError::NotAList)?;

        let groups = items
            .iter()
            .enumerate()
            .map(|(index, item)| {
                let dict = item
                    .as_object()
                    .ok_or(HeaderMatcherError::GroupNotADictionary { index })?;
                HeaderMatchTest::from_dictionary(dict)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[HeaderMatchTest] {
        &self.groups
    }

    /// Whether any group matches `name: value`.
    pub fn test_name_value(&self, name: &str, value: &str) -> bool {
        self.groups.iter().any(|group| group.matches(name, value))
    }

    pub fn to_value(&self) -> Value {
        Value::Array(self.groups.iter().map(HeaderMatchTest::to_value).collect())
    }
}
