//! Web request condition checker CLI
//!
//! Builds condition descriptions through the condition engine, reports
//! construction errors, and evaluates the conditions against recorded samples.
//!
//! Usage:
//!   webreq-check <directory_or_file> [OPTIONS]

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use webreq_check::{check_directory, CheckIssue, CheckReport, SampleOutcome, Severity};

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Web request condition checker
#[derive(Parser, Debug)]
#[command(name = "webreq-check")]
#[command(
    author,
    version,
    about = "Check web request condition descriptions and evaluate them against samples"
)]
struct Args {
    /// Path to a check file or a directory containing check files
    #[arg(required = true)]
    path: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", env = "WEBREQ_CHECK_OUTPUT")]
    output: OutputFormat,

    /// Only show errors (hide warnings and sample results)
    #[arg(short = 'e', long)]
    errors_only: bool,

    /// Verbose output, including per-attribute results and debug logs
    #[arg(short, long)]
    verbose: bool,

    /// Strict mode - treat warnings as errors
    #[arg(short, long)]
    strict: bool,
}

fn main() {
    let args = Args::parse();

    match run(&args) {
        Ok(failed) => std::process::exit(if failed { 1 } else { 0 }),
        Err(e) => {
            eprintln!("{RED}{BOLD}error:{RESET} {e:#}");
            std::process::exit(2);
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    init_tracing(args.verbose)?;

    if !args.path.exists() {
        anyhow::bail!("{} does not exist", args.path.display());
    }

    let report = check_directory(&args.path);

    match args.output {
        OutputFormat::Json => {
            let output =
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
            println!("{output}");
        }
        OutputFormat::Text => print_report(&report, args),
    }

    Ok(report.failed(args.strict))
}

fn init_tracing(verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };

    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

fn print_report(report: &CheckReport, args: &Args) {
    println!("{BOLD}{CYAN}Webreq Condition Checker{RESET}");
    println!("{DIM}{RULE}{RESET}");
    println!("{DIM}Scanning:{RESET} {CYAN}{}{RESET}", args.path.display());
    println!(
        "{DIM}Found:{RESET}    {BOLD}{}{RESET} check file(s)\n",
        report.files_checked
    );

    if report.files_checked == 0 {
        println!(
            "{YELLOW}Warning:{RESET} No JSON or YAML files found in {}",
            args.path.display()
        );
        return;
    }

    print_issues(report, args.errors_only);
    if !args.errors_only {
        print_samples(&report.outcomes, args.verbose);
    }
    print_summary(report);
}

fn print_issues(report: &CheckReport, errors_only: bool) {
    if report.issues.is_empty() {
        println!("{GREEN}{BOLD}No issues found!{RESET}\n");
        return;
    }

    let mut by_file: BTreeMap<&Path, Vec<&CheckIssue>> = BTreeMap::new();
    for issue in &report.issues {
        if errors_only && issue.severity != Severity::Error {
            continue;
        }
        by_file.entry(issue.file.as_path()).or_default().push(issue);
    }

    for (file, issues) in by_file {
        let file_errors = issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
            .count();
        let file_warnings = issues.len() - file_errors;

        let status = if file_errors > 0 {
            format!("{RED}FAIL{RESET}")
        } else {
            format!("{YELLOW}WARN{RESET}")
        };

        let counts = match (file_errors, file_warnings) {
            (0, w) => format!(" {DIM}({YELLOW}{w} warning(s){RESET}{DIM}){RESET}"),
            (e, 0) => format!(" {DIM}({RED}{e} error(s){RESET}{DIM}){RESET}"),
            (e, w) => format!(
                " {DIM}({RED}{e} error(s){RESET}{DIM}, {YELLOW}{w} warning(s){RESET}{DIM}){RESET}"
            ),
        };

        let file_name = file.file_name().unwrap_or_default().to_string_lossy();
        println!("{status} {BOLD}{CYAN}{file_name}{RESET}{counts}");

        for issue in issues {
            let color = severity_color(issue.severity);
            let marker = format!("{color}|{RESET}");
            let location = issue
                .location
                .as_ref()
                .map(|l| format!("{DIM}[{RESET}{CYAN}{l}{RESET}{DIM}]{RESET} "))
                .unwrap_or_default();

            println!(
                "  {marker} {location}{BOLD}{color}{}{RESET}: {} {DIM}({color}{}{DIM}){RESET}",
                issue.severity.label(),
                issue.message,
                issue.code
            );

            if let Some(suggestion) = &issue.suggestion {
                println!("  {marker}   {GREEN}-> {suggestion}{RESET}");
            }
        }
        println!();
    }
}

fn print_samples(outcomes: &[SampleOutcome], verbose: bool) {
    if outcomes.is_empty() {
        return;
    }

    println!("{BOLD}{CYAN}Samples{RESET}");
    for sample in outcomes {
        println!(
            "  {BOLD}{}{RESET} {DIM}@ {}{RESET}",
            sample.sample, sample.stage
        );
        for condition in &sample.conditions {
            let mark = if condition.fulfilled {
                format!("{GREEN}match{RESET}")
            } else {
                format!("{DIM}no match{RESET}")
            };
            println!("    {CYAN}{}{RESET}: {mark}", condition.condition);

            if verbose {
                for attr in &condition.attributes {
                    let value = if attr.fulfilled {
                        format!("{GREEN}yes{RESET}")
                    } else {
                        format!("{RED}no{RESET}")
                    };
                    println!("      {DIM}{}:{RESET} {value}", attr.key);
                }
            }
        }
    }
    println!();
}

fn print_summary(report: &CheckReport) {
    println!("{DIM}{RULE}{RESET}");
    println!("{BOLD}{CYAN}Summary{RESET}");
    println!("{DIM}{RULE}{RESET}");
    println!(
        "  {DIM}Files checked:{RESET}      {BOLD}{}{RESET}",
        report.files_checked
    );
    println!(
        "  {DIM}Conditions:{RESET}         {BOLD}{}{RESET}",
        report.conditions_checked
    );
    println!(
        "  {DIM}Attributes built:{RESET}   {BOLD}{}{RESET} {DIM}({} distinct){RESET}",
        report.attributes_built, report.attributes_shared
    );
    println!(
        "  {DIM}Samples evaluated:{RESET}  {BOLD}{}{RESET}",
        report.outcomes.len()
    );

    if report.errors > 0 {
        println!("  {RED}Errors:{RESET}             {BOLD}{RED}{}{RESET}", report.errors);
    } else {
        println!("  {GREEN}Errors:{RESET}             {BOLD}{GREEN}0{RESET}");
    }

    if report.warnings > 0 {
        println!(
            "  {YELLOW}Warnings:{RESET}           {BOLD}{YELLOW}{}{RESET}",
            report.warnings
        );
    } else {
        println!("  {DIM}Warnings:{RESET}           {BOLD}0{RESET}");
    }

    println!();

    if report.errors == 0 && report.warnings == 0 {
        println!("{GREEN}{BOLD}All checks passed!{RESET}");
    } else if report.errors == 0 {
        println!("{YELLOW}{BOLD}Passed with warnings{RESET}");
    } else {
        println!("{RED}{BOLD}Check failed with errors{RESET}");
    }
}

fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => RED,
        Severity::Warning => YELLOW,
    }
}
