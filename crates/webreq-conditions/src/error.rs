//! Construction errors for condition attributes.

/// Error produced while turning a declarative value into a condition attribute.
///
/// Evaluation never fails; every variant here is raised at rule-compile time
/// and names the declarative key that caused it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConditionError {
    /// The key is not registered with the factory.
    #[error("Unknown condition attribute '{0}'")]
    UnknownKey(String),

    /// The value has the wrong shape or contains an invalid entry.
    #[error("Condition '{key}' has an invalid value: {reason}")]
    MalformedValue { key: String, reason: String },

    /// Reserved for attributes whose values conflict with each other.
    #[error("Condition '{key}' cannot be combined with '{other}'")]
    UnsupportedCombination { key: String, other: String },
}

impl ConditionError {
    pub(crate) fn malformed(key: &str, reason: impl Into<String>) -> Self {
        ConditionError::MalformedValue {
            key: key.to_string(),
            reason: reason.into(),
        }
    }

    /// The declarative key this error is about.
    pub fn key(&self) -> &str {
        match self {
            ConditionError::UnknownKey(key) => key,
            ConditionError::MalformedValue { key, .. } => key,
            ConditionError::UnsupportedCombination { key, .. } => key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_key() {
        let err = ConditionError::UnknownKey("colour".to_string());
        assert_eq!(err.to_string(), "Unknown condition attribute 'colour'");
        assert_eq!(err.key(), "colour");

        let err = ConditionError::malformed("stages", "expected a list");
        assert_eq!(
            err.to_string(),
            "Condition 'stages' has an invalid value: expected a list"
        );
        assert_eq!(err.key(), "stages");
    }
}
