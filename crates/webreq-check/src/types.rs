//! Report types produced by a check run.

use serde::Serialize;
use std::path::{Path, PathBuf};
use webreq_conditions::Stage;

/// Severity level of a check issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// The condition or sample cannot be used.
    Error,
    /// Usable, but almost certainly not what the author meant.
    Warning,
}

impl Severity {
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }
}

/// A single problem found in a check file.
#[derive(Debug, Clone, Serialize)]
pub struct CheckIssue {
    pub severity: Severity,
    /// Issue code (e.g., "E002", "W001").
    pub code: String,
    pub message: String,
    #[serde(serialize_with = "serialize_path")]
    pub file: PathBuf,
    /// Location within the file (e.g., "conditions[0].attributes.stages").
    pub location: Option<String>,
    pub suggestion: Option<String>,
}

fn serialize_path<S>(path: &Path, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(&path.to_string_lossy())
}

impl CheckIssue {
    pub fn error(code: impl Into<String>, message: impl Into<String>, file: PathBuf) -> Self {
        Self {
            severity: Severity::Error,
            code: code.into(),
            message: message.into(),
            file,
            location: None,
            suggestion: None,
        }
    }

    pub fn warning(code: impl Into<String>, message: impl Into<String>, file: PathBuf) -> Self {
        Self {
            severity: Severity::Warning,
            code: code.into(),
            message: message.into(),
            file,
            location: None,
            suggestion: None,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

/// Whether one attribute of a condition held for a sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributeOutcome {
    pub key: String,
    pub fulfilled: bool,
}

/// Evaluation of one compiled condition against one sample.
///
/// `fulfilled` is the conjunction of the attribute outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionOutcome {
    pub condition: String,
    pub fulfilled: bool,
    pub attributes: Vec<AttributeOutcome>,
}

/// Every compiled condition evaluated against one sample.
#[derive(Debug, Clone, Serialize)]
pub struct SampleOutcome {
    pub sample: String,
    #[serde(serialize_with = "serialize_path")]
    pub file: PathBuf,
    pub stage: Stage,
    pub conditions: Vec<ConditionOutcome>,
}

impl SampleOutcome {
    pub fn condition(&self, id: &str) -> Option<&ConditionOutcome> {
        self.conditions.iter().find(|c| c.condition == id)
    }
}

/// Result of checking one or more files.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckReport {
    pub issues: Vec<CheckIssue>,
    pub outcomes: Vec<SampleOutcome>,
    pub files_checked: usize,
    pub conditions_checked: usize,
    /// Attributes successfully built, counting shared ones once per use.
    pub attributes_built: usize,
    /// Distinct attribute instances after deduplication.
    pub attributes_shared: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl CheckReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_issue(&mut self, issue: CheckIssue) {
        match issue.severity {
            Severity::Error => self.errors += 1,
            Severity::Warning => self.warnings += 1,
        }
        self.issues.push(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    /// Whether the run should fail; in strict mode warnings count too.
    pub fn failed(&self, strict: bool) -> bool {
        self.errors > 0 || (strict && self.warnings > 0)
    }

    /// Look up the outcome of a sample by id.
    pub fn sample(&self, id: &str) -> Option<&SampleOutcome> {
        self.outcomes.iter().find(|s| s.sample == id)
    }

    pub fn merge(&mut self, other: CheckReport) {
        self.issues.extend(other.issues);
        self.outcomes.extend(other.outcomes);
        self.files_checked += other.files_checked;
        self.conditions_checked += other.conditions_checked;
        self.attributes_built += other.attributes_built;
        self.attributes_shared += other.attributes_shared;
        self.errors += other.errors;
        self.warnings += other.warnings;
    }
}
