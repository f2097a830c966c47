//! Schema command - print the output formats

use crate::cmd::records::RecordRow;
use crate::cmd::summary::SummaryReport;
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema of `summary --json`
    JsonSchema,
    /// CSV header row of `records --csv`
    CsvHeader,
    /// CSV column descriptions of `records --csv`
    CsvFields,
}

/// One column of a CSV export, generated by `#[derive(CsvColumns)]`.
#[derive(Debug, Clone, Copy)]
pub struct CsvColumn {
    pub name: &'static str,
    pub required: bool,
    pub description: &'static str,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => self.print_csv_header(),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(SummaryReport);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_header(&self) -> anyhow::Result<()> {
        let names: Vec<&str> = RecordRow::csv_columns().iter().map(|c| c.name).collect();
        println!("{}", names.join(","));
        Ok(())
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        println!("CSV Output Format");
        println!("=================");
        println!();
        for column in RecordRow::csv_columns() {
            let req = if column.required { "required" } else { "optional" };
            println!("{:16} ({:8})  {}", column.name, req, column.description);
        }
        println!();
        println!("Amounts are hryvnias with two decimal places and a '.' separator");
        Ok(())
    }
}
