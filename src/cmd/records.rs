//! Records command - the reconstructed income records with category filters

use crate::cmd::schema::CsvColumn;
use crate::cmd::{category_filter, format_uah, CategoryArg, StatementArgs};
use crate::core::{Aggregation, Category, CategoryFilter, ClassifiedRecord, Totals};
use clap::Args;
use deklar_derive::CsvColumns;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct RecordsCommand {
    #[command(flatten)]
    input: StatementArgs,

    /// Only show these categories (repeatable); all when omitted
    #[arg(short, long, value_enum)]
    category: Vec<CategoryArg>,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

impl RecordsCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let statement = self.input.read_statement()?;
        let filter = category_filter(&self.category);
        let aggregation = statement.aggregate(&filter);

        if self.csv {
            write_csv(&aggregation.records, io::stdout())
        } else {
            self.print_table(&filter, &aggregation);
            Ok(())
        }
    }

    fn print_table(&self, filter: &CategoryFilter, aggregation: &Aggregation<'_>) {
        if aggregation.records.is_empty() {
            println!(
                "No records found matching filters ({} in statement)",
                aggregation.document.count
            );
            return;
        }

        let mut rows: Vec<RecordRow> = aggregation
            .records
            .iter()
            .map(|r| RecordRow::new(r, format_uah))
            .collect();
        rows.push(RecordRow::totals(&aggregation.visible, format_uah));

        if !filter.is_empty() {
            let shown: Vec<&str> = filter.iter().map(Category::title).collect();
            println!("Categories: {}", shown.join(", "));
        }
        let table = Table::new(&rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
        println!(
            "Showing {} of {} records",
            aggregation.visible.count, aggregation.document.count
        );
    }
}

fn write_csv<W: io::Write>(records: &[ClassifiedRecord<'_>], writer: W) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(RecordRow::new(record, plain_amount))?;
    }
    wtr.flush()?;
    Ok(())
}

fn plain_amount(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

/// Row of the records table and of `records --csv`
#[derive(Debug, Clone, Tabled, Serialize, CsvColumns)]
pub struct RecordRow {
    /// ROWNUM of the record in the statement
    #[tabled(rename = "#")]
    #[serde(rename = "row")]
    pub row: String,

    /// Payment date as written in the statement, followed by the year
    #[tabled(rename = "Date")]
    pub date: String,

    /// Tax agent that paid the income
    #[tabled(rename = "Company")]
    pub company: String,

    /// Numeric income code
    #[tabled(rename = "Code")]
    pub tax_code: String,

    /// Declaration category the code maps to
    #[tabled(rename = "Category")]
    pub category: String,

    /// Income accrued
    #[tabled(rename = "Accrued")]
    pub income_accrued: String,

    /// Income paid
    #[tabled(rename = "Paid")]
    pub income_paid: String,

    /// Personal income tax accrued
    #[tabled(rename = "PIT accrued")]
    pub tax_accrued: String,

    /// Personal income tax withheld
    #[tabled(rename = "PIT paid")]
    pub tax_paid: String,

    /// 1.5% of income paid when PIT was withheld
    #[tabled(rename = "Military tax")]
    pub military_tax: String,
}

impl RecordRow {
    fn new(classified: &ClassifiedRecord<'_>, money: fn(Decimal) -> String) -> Self {
        let record = classified.record;
        RecordRow {
            row: record.row_key.clone(),
            date: record.date.clone(),
            company: record.company.clone(),
            tax_code: record.tax_code.to_string(),
            category: classified.category.to_string(),
            income_accrued: money(record.income_accrued),
            income_paid: money(record.income_paid),
            tax_accrued: money(record.tax_accrued),
            tax_paid: money(record.tax_paid),
            military_tax: money(record.military_tax()),
        }
    }

    fn totals(totals: &Totals, money: fn(Decimal) -> String) -> Self {
        RecordRow {
            row: String::new(),
            date: "Total".to_string(),
            company: String::new(),
            tax_code: String::new(),
            category: String::new(),
            income_accrued: money(totals.income_accrued),
            income_paid: money(totals.income_paid),
            tax_accrued: money(totals.tax_accrued),
            tax_paid: money(totals.tax_paid),
            military_tax: money(totals.military_tax),
        }
    }
}
