//! Summary command - declaration line, category and statement totals

use crate::cmd::{format_uah, StatementArgs};
use crate::core::{Aggregation, Category, CategoryFilter, Statement, Totals, Warning};
use clap::Args;
use schemars::JsonSchema;
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct SummaryCommand {
    #[command(flatten)]
    input: StatementArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

/// Totals of one statement, as printed by `summary --json`.
#[derive(Debug, Serialize, JsonSchema)]
pub struct SummaryReport {
    /// Form variant id, e.g. F1401804
    pub form: String,
    /// Reporting period as written in the statement, if readable
    pub period: Option<String>,
    pub lines: Vec<LineSummary>,
    pub categories: Vec<CategorySummary>,
    /// Sums over every record of the statement
    pub document: Totals,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct LineSummary {
    /// Declaration line number, e.g. 10.13
    pub line: String,
    pub title: String,
    /// Whether withheld tax and military tax are declared on this line
    pub taxable: bool,
    pub totals: Totals,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CategorySummary {
    pub category: Category,
    pub title: String,
    /// Declaration line the category is reported on
    pub line: Option<String>,
    pub totals: Totals,
}

impl SummaryReport {
    pub fn new(statement: &Statement, aggregation: &Aggregation<'_>) -> Self {
        let form = statement.form;
        let lines = form
            .lines
            .iter()
            .map(|spec| LineSummary {
                line: spec.line.to_string(),
                title: spec.title.to_string(),
                taxable: spec.taxable,
                totals: aggregation.lines.get(spec.line).copied().unwrap_or_default(),
            })
            .collect();
        let categories = aggregation
            .categories
            .iter()
            .map(|(category, totals)| CategorySummary {
                category: *category,
                title: category.title().to_string(),
                line: form.line_for(*category).map(|spec| spec.line.to_string()),
                totals: *totals,
            })
            .collect();

        SummaryReport {
            form: form.id.to_string(),
            period: statement.period.map(|p| p.to_string()),
            lines,
            categories,
            document: aggregation.document,
            warnings: statement.warnings.clone(),
        }
    }
}

impl SummaryCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let statement = self.input.read_statement()?;
        let aggregation = statement.aggregate(&CategoryFilter::all());
        let report = SummaryReport::new(&statement, &aggregation);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_summary(&statement, &report);
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "Line")]
    line: String,
    #[tabled(rename = "Description")]
    title: String,
    #[tabled(rename = "Records")]
    count: usize,
    #[tabled(rename = "Income paid")]
    income_paid: String,
    #[tabled(rename = "PIT withheld")]
    tax_paid: String,
    #[tabled(rename = "Military tax")]
    military_tax: String,
}

fn print_summary(statement: &Statement, report: &SummaryReport) {
    println!();
    println!("DECLARATION SUMMARY ({})", statement.form.title);
    if let Some(period) = &report.period {
        println!("  Period: {}", period);
    }
    println!();

    let rows: Vec<LineRow> = report
        .lines
        .iter()
        .map(|l| {
            let taxed = |amount| if l.taxable { format_uah(amount) } else { "-".to_string() };
            LineRow {
                line: l.line.clone(),
                title: l.title.clone(),
                count: l.totals.count,
                income_paid: format_uah(l.totals.income_paid),
                tax_paid: taxed(l.totals.tax_paid),
                military_tax: taxed(l.totals.military_tax),
            }
        })
        .collect();
    let table = Table::new(&rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!();

    println!("CATEGORIES");
    for c in report.categories.iter().filter(|c| c.totals.count > 0) {
        println!(
            "  {:32} {:>4}  {:>18}  -> {}",
            c.title,
            c.totals.count,
            format_uah(c.totals.income_paid),
            c.line.as_deref().unwrap_or("not declared")
        );
    }
    println!();

    print_totals("STATEMENT TOTAL", &report.document);

    if !report.warnings.is_empty() {
        println!();
        for warning in &report.warnings {
            println!("\u{26A0} {}", warning);
        }
    }
    println!();
}

fn print_totals(label: &str, totals: &Totals) {
    println!("{} ({} records)", label, totals.count);
    println!(
        "  Income accrued: {} | paid: {}",
        format_uah(totals.income_accrued),
        format_uah(totals.income_paid)
    );
    println!(
        "  PIT accrued: {} | withheld: {} | Military tax: {}",
        format_uah(totals.tax_accrued),
        format_uah(totals.tax_paid),
        format_uah(totals.military_tax)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::form::F1401803;
    use crate::core::IncomeRecord;
    use rust_decimal_macros::dec;

    #[test]
    fn report_lists_every_line_of_the_form() {
        let statement = Statement {
            form: &F1401803,
            period: None,
            records: vec![IncomeRecord {
                row_key: "1".to_string(),
                date: "31.01 2022".to_string(),
                company: "ПриватБанк".to_string(),
                income_accrued: dec!(100),
                income_paid: dec!(100),
                tax_accrued: dec!(18),
                tax_paid: dec!(18),
                tax_code: 127,
            }],
            warnings: vec![Warning::PeriodMissing],
        };
        let aggregation = statement.aggregate(&CategoryFilter::all());
        let report = SummaryReport::new(&statement, &aggregation);

        let lines: Vec<_> = report.lines.iter().map(|l| l.line.as_str()).collect();
        assert_eq!(lines, ["10.10", "11.3"]);
        assert_eq!(report.lines[0].totals.military_tax, dec!(1.50));
        assert_eq!(report.lines[1].totals, Totals::default());
        assert_eq!(report.categories.len(), 4);
        assert_eq!(report.categories[3].line, None);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["lines"][0]["totals"]["income_paid"], "100");
        assert_eq!(json["warnings"][0]["type"], "PeriodMissing");
    }
}
