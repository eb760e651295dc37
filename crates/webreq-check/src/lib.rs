//! Offline checking of web request condition descriptions.
//!
//! A check file lists condition descriptions (declarative attribute maps)
//! and, optionally, recorded request samples. Every description is built
//! through the condition engine; construction errors become issues, and each
//! sample reports which conditions it would fulfill at its stage.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use webreq_check::{check_directory, check_file};
//!
//! let report = check_file(Path::new("rules.yaml"));
//! let all = check_directory(Path::new("./rules"));
//!
//! if report.has_errors() || all.has_errors() {
//!     eprintln!("Found {} errors", report.errors + all.errors);
//! }
//! ```

mod checker;
mod document;
mod policy;
mod types;

use std::path::{Path, PathBuf};

pub use checker::{check_document, compile_conditions, evaluate_sample, CompiledCondition};
pub use document::{
    load_document, parse_document, split_header_line, CheckDocument, ConditionEntry,
    DocumentFormat, SampleEntry,
};
pub use policy::{site_of, HostPolicy, RecordedResourceType};
pub use types::{
    AttributeOutcome, CheckIssue, CheckReport, ConditionOutcome, SampleOutcome, Severity,
};

/// Check a single file. Read and parse failures are reported as issues.
pub fn check_file(path: &Path) -> CheckReport {
    match load_document(path) {
        Ok(document) => check_document(&document, path),
        Err(e) => {
            let mut report = CheckReport::new();
            report.files_checked = 1;
            report.add_issue(
                CheckIssue::error("E001", format!("{e:#}"), path.to_path_buf())
                    .with_suggestion("Check for JSON/YAML syntax errors"),
            );
            report
        }
    }
}

/// Check a content string directly, labelling issues with `source_name`.
pub fn check_str(content: &str, format: DocumentFormat, source_name: &str) -> CheckReport {
    let path = Path::new(source_name);
    match parse_document(content, format) {
        Ok(document) => check_document(&document, path),
        Err(e) => {
            let mut report = CheckReport::new();
            report.files_checked = 1;
            report.add_issue(CheckIssue::error("E001", format!("{e:#}"), path.to_path_buf()));
            report
        }
    }
}

/// Check files (`.json`, `.yaml`, `.yml`) directly inside a directory.
///
/// Each file gets its own factory; attributes are not shared across files.
pub fn check_directory(path: &Path) -> CheckReport {
    let mut report = CheckReport::new();
    for file in collect_check_files(path, &mut report) {
        report.merge(check_file(&file));
    }
    report
}

/// Check files in `path`, non-recursive and sorted. A file path yields itself.
///
/// A directory or entry that cannot be read is reported as an E001 issue.
pub fn collect_check_files(path: &Path, report: &mut CheckReport) -> Vec<PathBuf> {
    if path.is_file() {
        return vec![path.to_path_buf()];
    }

    let entries = match std::fs::read_dir(path) {
        Ok(entries) => entries,
        Err(e) => {
            report.add_issue(CheckIssue::error(
                "E001",
                format!("Failed to read directory: {e}"),
                path.to_path_buf(),
            ));
            return Vec::new();
        }
    };

    let mut files = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let file = entry.path();
                if file.is_file() && DocumentFormat::from_path(&file).is_some() {
                    files.push(file);
                }
            }
            Err(e) => report.add_issue(CheckIssue::error(
                "E001",
                format!("Failed to read directory entry: {e}"),
                path.to_path_buf(),
            )),
        }
    }
    files.sort();
    files
}
