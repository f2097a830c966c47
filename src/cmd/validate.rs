//! Validate command - surface advisories without printing the full report

use crate::cmd::StatementArgs;
use crate::core::Warning;
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    #[command(flatten)]
    input: StatementArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// A validation issue for output
#[derive(Debug, Clone, Serialize)]
struct ValidationIssue {
    #[serde(rename = "type")]
    issue_type: &'static str,
    message: String,
    detail: Warning,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ValidationOutput<'a> {
    form: &'static str,
    expected_year: i32,
    record_count: usize,
    issue_count: usize,
    issues: &'a [ValidationIssue],
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let statement = self.input.read_statement()?;
        let issues: Vec<ValidationIssue> = statement
            .warnings
            .iter()
            .map(|w| ValidationIssue {
                issue_type: w.kind(),
                message: w.message(),
                detail: w.clone(),
            })
            .collect();

        if self.json {
            let output = ValidationOutput {
                form: statement.form.id,
                expected_year: self.input.expected_year(),
                record_count: statement.records.len(),
                issue_count: issues.len(),
                issues: &issues,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            self.print_text(statement.form.id, statement.records.len(), &issues);
        }

        // Exit with code 1 if issues found
        if !issues.is_empty() {
            std::process::exit(1);
        }
        Ok(())
    }

    fn print_text(&self, form: &str, records: usize, issues: &[ValidationIssue]) {
        println!();
        println!(
            "VALIDATION RESULTS ({}, {} records, expected year {})",
            form,
            records,
            self.input.expected_year()
        );
        println!();

        if issues.is_empty() {
            println!("\u{2713} No issues found.");
        } else {
            println!("\u{26A0} {} issue(s) found:", issues.len());
            println!();
            for (i, issue) in issues.iter().enumerate() {
                println!("  {}. [{}] {}", i + 1, issue.issue_type, issue.message);
            }
        }
        println!();
    }
}
