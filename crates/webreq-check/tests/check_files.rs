//! File-level checks against real files on disk.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;
use webreq_check::{
    check_directory, check_file, check_str, collect_check_files, CheckReport, DocumentFormat,
};

const RULES_YAML: &str = r#"
conditions:
  - id: block-third-party-scripts
    attributes:
      resourceType: [script]
      thirdPartyForCookies: true
  - id: html-pages
    attributes:
      contentType: [text/html]
  - id: no-cookie-header
    attributes:
      excludeRequestHeaders:
        - name-equals: Cookie
  - id: late-stages
    attributes:
      stages: [onBeforeRequest, onHeadersReceived]

samples:
  - id: tracker-script
    stage: onBeforeRequest
    url: https://cdn.tracker.example/t.js
    firstPartyUrl: https://news.example/
    resourceType: script
  - id: article
    stage: onHeadersReceived
    url: https://news.example/article
    resourceType: main_frame
    responseHeaders:
      - "Content-Type: text/html; charset=utf-8"
  - id: article-no-headers
    stage: onHeadersReceived
    url: https://news.example/article
  - id: api-call
    stage: onBeforeSendHeaders
    url: https://news.example/api
    requestHeaders:
      - "cookie: session=1"
"#;

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn fulfilled(report: &CheckReport, sample: &str, condition: &str) -> bool {
    report
        .sample(sample)
        .and_then(|s| s.condition(condition))
        .map(|c| c.fulfilled)
        .unwrap()
}

#[test]
fn test_yaml_file_evaluates_samples() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "rules.yaml", RULES_YAML);

    let report = check_file(&path);
    assert!(report.issues.is_empty(), "{:?}", report.issues);
    assert_eq!(report.conditions_checked, 4);
    assert_eq!(report.outcomes.len(), 4);

    assert!(fulfilled(&report, "tracker-script", "block-third-party-scripts"));
    assert!(fulfilled(&report, "tracker-script", "late-stages"));
    assert!(!fulfilled(&report, "tracker-script", "html-pages"));

    assert!(fulfilled(&report, "article", "html-pages"));
    assert!(!fulfilled(&report, "article", "block-third-party-scripts"));
    assert!(fulfilled(&report, "article", "late-stages"));

    // No response headers means no MIME type
    assert!(!fulfilled(&report, "article-no-headers", "html-pages"));

    // Header names match case-insensitively
    assert!(!fulfilled(&report, "api-call", "no-cookie-header"));
    assert!(!fulfilled(&report, "api-call", "late-stages"));
}

#[test]
fn test_attribute_outcomes_are_reported() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "rules.yml", RULES_YAML);

    let report = check_file(&path);
    let sample = report.sample("article").unwrap();
    let condition = sample.condition("block-third-party-scripts").unwrap();
    let keys: Vec<_> = condition
        .attributes
        .iter()
        .map(|a| (a.key.as_str(), a.fulfilled))
        .collect();
    assert_eq!(
        keys,
        vec![("resourceType", false), ("thirdPartyForCookies", false)]
    );
}

#[test]
fn test_unreadable_file_is_an_issue() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.json", "{ not json");

    let report = check_file(&path);
    assert_eq!(report.errors, 1);
    assert_eq!(report.issues[0].code, "E001");
    assert!(report.issues[0].message.contains("broken.json"));

    let missing = check_file(&dir.path().join("missing.json"));
    assert_eq!(missing.issues[0].code, "E001");
}

#[test]
fn test_directory_checks_each_file() {
    let dir = TempDir::new().unwrap();
    write(&dir, "a.yaml", RULES_YAML);
    write(
        &dir,
        "b.json",
        r#"{"conditions": [{"id": "bad", "attributes": {"stages": ["onLunch"]}}]}"#,
    );
    write(&dir, "notes.txt", "ignored");

    let report = check_directory(dir.path());
    assert_eq!(report.files_checked, 2);
    assert_eq!(report.conditions_checked, 5);
    assert_eq!(report.errors, 1);

    let issue = &report.issues[0];
    assert_eq!(issue.code, "E003");
    assert_eq!(issue.file.file_name().unwrap(), "b.json");
    assert!(issue.message.contains("'stages'"));
}

#[test]
fn test_unreadable_directory_is_reported() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no-such-dir");

    let mut report = CheckReport::new();
    let files = collect_check_files(&missing, &mut report);
    assert!(files.is_empty());
    assert_eq!(report.errors, 1);
    assert_eq!(report.issues[0].code, "E001");
    assert_eq!(report.issues[0].file, missing);

    let report = check_directory(&missing);
    assert!(report.has_errors());
    assert_eq!(report.files_checked, 0);
}

#[test]
fn test_collect_skips_only_unsupported_files() {
    let dir = TempDir::new().unwrap();
    write(&dir, "b.yml", RULES_YAML);
    write(&dir, "a.json", "{}");
    write(&dir, "c.toml", "");
    fs::create_dir(dir.path().join("nested.json")).unwrap();

    let mut report = CheckReport::new();
    let files = collect_check_files(dir.path(), &mut report);
    let names: Vec<_> = files
        .iter()
        .map(|f| f.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.json", "b.yml"]);
    assert!(report.issues.is_empty());
}

#[test]
fn test_json_report_shape() {
    let report = check_str(
        r#"{
            "conditions": [{"id": "third", "attributes": {"thirdPartyForCookies": true}}],
            "samples": [{"id": "s", "stage": "onCompleted", "url": "https://a.example/",
                         "firstPartyUrl": "https://b.example/"}]
        }"#,
        DocumentFormat::Json,
        "inline.json",
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["filesChecked"], 1);
    assert_eq!(json["errors"], 0);
    assert_eq!(json["outcomes"][0]["stage"], "onCompleted");
    assert_eq!(json["outcomes"][0]["conditions"][0]["fulfilled"], true);
    assert_eq!(
        json["outcomes"][0]["conditions"][0]["attributes"][0]["key"],
        "thirdPartyForCookies"
    );
}

#[test]
fn test_strict_mode_fails_on_warnings() {
    let report = check_str(
        "conditions:\n  - id: everything\n",
        DocumentFormat::Yaml,
        "w.yaml",
    );
    assert_eq!(report.errors, 0);
    assert_eq!(report.warnings, 1);
    assert!(!report.failed(false));
    assert!(report.failed(true));
}
