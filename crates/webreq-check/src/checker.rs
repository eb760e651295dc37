//! Compiles condition descriptions and evaluates them against samples.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;
use webreq_conditions::{
    AttributeFactory, ConditionAttribute, ConditionError, RequestRecord, RequestSnapshot,
    ResponseRecord, StageMask,
};

use crate::document::{split_header_line, CheckDocument, ConditionEntry, SampleEntry};
use crate::policy::{HostPolicy, RecordedResourceType};
use crate::types::{AttributeOutcome, CheckIssue, CheckReport, ConditionOutcome, SampleOutcome};

/// A condition whose every attribute was built.
#[derive(Debug)]
pub struct CompiledCondition {
    pub id: String,
    pub attributes: Vec<Arc<ConditionAttribute>>,
}

impl CompiledCondition {
    /// Stages at which every attribute can hold at once.
    pub fn stages(&self) -> StageMask {
        self.attributes
            .iter()
            .fold(StageMask::all(), |mask, attr| mask & attr.stages())
    }
}

/// Check one parsed document. `file` is only used to label issues.
///
/// All conditions go through a single factory, so equal attributes across
/// conditions are shared the way a rule set loaded together would share them.
pub fn check_document(document: &CheckDocument, file: &Path) -> CheckReport {
    let mut report = CheckReport::new();
    report.files_checked = 1;

    let factory = AttributeFactory::new();
    let compiled = compile_conditions(&factory, &document.conditions, file, &mut report);
    report.attributes_shared = factory.live_instances();

    for (index, sample) in document.samples.iter().enumerate() {
        let outcome = evaluate_sample(&compiled, sample, index, file, &mut report);
        report.outcomes.push(outcome);
    }

    report
}

pub fn compile_conditions(
    factory: &AttributeFactory,
    conditions: &[ConditionEntry],
    file: &Path,
    report: &mut CheckReport,
) -> Vec<CompiledCondition> {
    let mut seen = HashSet::new();
    let mut compiled = Vec::new();

    for (index, condition) in conditions.iter().enumerate() {
        let location = format!("conditions[{index}]");
        report.conditions_checked += 1;

        if !seen.insert(condition.id.as_str()) {
            report.add_issue(
                CheckIssue::warning(
                    "W002",
                    format!("Duplicate condition id '{}'", condition.id),
                    file.to_path_buf(),
                )
                .with_location(&location)
                .with_suggestion("Give every condition a unique id so results can be told apart"),
            );
        }

        if condition.attributes.is_empty() {
            report.add_issue(
                CheckIssue::warning(
                    "W001",
                    format!("Condition '{}' has no attributes and matches everything", condition.id),
                    file.to_path_buf(),
                )
                .with_location(format!("{location}.attributes")),
            );
        }

        let mut attributes = Vec::with_capacity(condition.attributes.len());
        let mut failed = false;
        for (key, value) in &condition.attributes {
            match factory.create(key, value) {
                Ok(attr) => attributes.push(attr),
                Err(e) => {
                    failed = true;
                    report.add_issue(attribute_issue(
                        factory,
                        &condition.id,
                        &e,
                        file,
                        format!("{location}.attributes.{key}"),
                    ));
                }
            }
        }
        if failed {
            continue;
        }

        report.attributes_built += attributes.len();
        let condition = CompiledCondition {
            id: condition.id.clone(),
            attributes,
        };

        if !condition.attributes.is_empty() && condition.stages().is_empty() {
            let names: Vec<_> = condition.attributes.iter().map(|a| a.name()).collect();
            report.add_issue(
                CheckIssue::warning(
                    "W003",
                    format!(
                        "Condition '{}' can never be fulfilled: its attributes share no stage",
                        condition.id
                    ),
                    file.to_path_buf(),
                )
                .with_location(&location)
                .with_suggestion(format!("Check the stages of: {}", names.join(", "))),
            );
        }

        debug!(
            condition = %condition.id,
            attributes = condition.attributes.len(),
            "compiled condition"
        );
        compiled.push(condition);
    }

    compiled
}

fn attribute_issue(
    factory: &AttributeFactory,
    condition: &str,
    error: &ConditionError,
    file: &Path,
    location: String,
) -> CheckIssue {
    match error {
        ConditionError::UnknownKey(_) => CheckIssue::error(
            "E002",
            format!("{error} in condition '{condition}'"),
            file.to_path_buf(),
        )
        .with_location(location)
        .with_suggestion(format!("Known attributes: {}", factory.keys().join(", "))),
        _ => CheckIssue::error(
            "E003",
            format!("{error} in condition '{condition}'"),
            file.to_path_buf(),
        )
        .with_location(location),
    }
}

fn header_lines(
    lines: &[String],
    location: &str,
    file: &Path,
    report: &mut CheckReport,
) -> Vec<(String, String)> {
    let mut headers = Vec::with_capacity(lines.len());
    for (index, line) in lines.iter().enumerate() {
        match split_header_line(line) {
            Some((name, value)) => headers.push((name.to_string(), value.to_string())),
            None => report.add_issue(
                CheckIssue::error(
                    "E004",
                    format!("Malformed header line '{line}'"),
                    file.to_path_buf(),
                )
                .with_location(format!("{location}[{index}]"))
                .with_suggestion("Write header lines as 'Name: value'"),
            ),
        }
    }
    headers
}

pub fn evaluate_sample(
    compiled: &[CompiledCondition],
    sample: &SampleEntry,
    index: usize,
    file: &Path,
    report: &mut CheckReport,
) -> SampleOutcome {
    let location = format!("samples[{index}]");

    let mut request = RequestRecord::new(sample.url.as_str());
    request.first_party_url = sample.first_party_url.clone();
    request.headers = header_lines(
        &sample.request_headers,
        &format!("{location}.requestHeaders"),
        file,
        report,
    );
    let response = sample.response_headers.as_ref().map(|lines| ResponseRecord {
        headers: header_lines(lines, &format!("{location}.responseHeaders"), file, report),
    });

    let resource_info = RecordedResourceType(sample.resource_type);
    let mut snapshot = RequestSnapshot::new(sample.stage, &request, &resource_info, &HostPolicy);
    if let Some(response) = &response {
        snapshot = snapshot.with_response_headers(response);
    }

    let conditions = compiled
        .iter()
        .map(|condition| {
            let attributes: Vec<_> = condition
                .attributes
                .iter()
                .map(|attr| AttributeOutcome {
                    key: attr.name().to_string(),
                    fulfilled: attr.is_fulfilled(&snapshot),
                })
                .collect();
            ConditionOutcome {
                condition: condition.id.clone(),
                fulfilled: attributes.iter().all(|a| a.fulfilled),
                attributes,
            }
        })
        .collect();

    SampleOutcome {
        sample: sample.id.clone(),
        file: file.to_path_buf(),
        stage: sample.stage,
        conditions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{parse_document, DocumentFormat};
    use std::path::PathBuf;

    fn check(json: &str) -> CheckReport {
        let doc = parse_document(json, DocumentFormat::Json).unwrap();
        check_document(&doc, &PathBuf::from("test.json"))
    }

    #[test]
    fn test_unknown_key_suggests_known_ones() {
        let report = check(r#"{"conditions": [{"id": "c", "attributes": {"colour": ["red"]}}]}"#);
        assert_eq!(report.errors, 1);
        let issue = &report.issues[0];
        assert_eq!(issue.code, "E002");
        assert_eq!(issue.location.as_deref(), Some("conditions[0].attributes.colour"));
        assert!(issue.suggestion.as_deref().unwrap().contains("thirdPartyForCookies"));
    }

    #[test]
    fn test_malformed_value() {
        let report = check(
            r#"{"conditions": [{"id": "c", "attributes": {"requestHeaders": [{"name-is": "x"}]}}]}"#,
        );
        assert_eq!(report.errors, 1);
        assert_eq!(report.issues[0].code, "E003");
        assert!(report.issues[0].message.contains("'requestHeaders'"));
        assert!(report.issues[0].message.contains("in condition 'c'"));
    }

    #[test]
    fn test_disjoint_stages_warn() {
        let report = check(
            r#"{"conditions": [{"id": "never", "attributes": {
                "contentType": ["text/html"],
                "requestHeaders": [{}]
            }}]}"#,
        );
        assert_eq!(report.errors, 0);
        assert_eq!(report.warnings, 1);
        assert_eq!(report.issues[0].code, "W003");
    }

    #[test]
    fn test_duplicate_and_empty_conditions_warn() {
        let report = check(
            r#"{"conditions": [
                {"id": "a", "attributes": {"thirdPartyForCookies": true}},
                {"id": "a"}
            ]}"#,
        );
        let codes: Vec<_> = report.issues.iter().map(|i| i.code.as_str()).collect();
        assert_eq!(codes, vec!["W002", "W001"]);
    }

    #[test]
    fn test_equal_attributes_are_counted_once() {
        let report = check(
            r#"{"conditions": [
                {"id": "a", "attributes": {"thirdPartyForCookies": true, "stages": ["onCompleted"]}},
                {"id": "b", "attributes": {"thirdPartyForCookies": true}},
                {"id": "c", "attributes": {"responseHeaders": [{}]}},
                {"id": "d", "attributes": {"responseHeaders": [{}]}}
            ]}"#,
        );
        assert_eq!(report.attributes_built, 5);
        // Header attributes are never shared
        assert_eq!(report.attributes_shared, 4);
    }

    #[test]
    fn test_malformed_header_line_is_skipped() {
        let report = check(
            r#"{
                "conditions": [{"id": "c", "attributes": {"requestHeaders": [{"name-equals": "accept"}]}}],
                "samples": [{
                    "id": "s",
                    "stage": "onBeforeSendHeaders",
                    "url": "https://example.com/",
                    "requestHeaders": ["garbage", "Accept: */*"]
                }]
            }"#,
        );
        assert_eq!(report.errors, 1);
        assert_eq!(
            report.issues[0].location.as_deref(),
            Some("samples[0].requestHeaders[0]")
        );
        assert!(report.sample("s").unwrap().condition("c").unwrap().fulfilled);
    }
}
