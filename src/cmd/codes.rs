//! Codes command - how each form variant classifies tax codes

use crate::cmd::FormArg;
use crate::core::{Category, FormVariant, FORMS};
use clap::Args;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

#[derive(Args, Debug)]
pub struct CodesCommand {
    /// Only list this form variant
    #[arg(short, long, value_enum)]
    form: Option<FormArg>,

    /// Output as JSON instead of formatted tables
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct CodeRow {
    #[tabled(rename = "Code")]
    code: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Line")]
    line: String,
}

#[derive(Debug, Serialize)]
struct FormCodes {
    form: &'static str,
    schema_locator: &'static str,
    codes: Vec<CodeRow>,
}

impl CodesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let forms: Vec<&FormVariant> = match self.form {
            Some(form) => vec![form.variant()],
            None => FORMS.to_vec(),
        };
        let listing: Vec<FormCodes> = forms
            .into_iter()
            .map(|form| FormCodes {
                form: form.id,
                schema_locator: form.schema_locator,
                codes: code_rows(form),
            })
            .collect();

        if self.json {
            println!("{}", serde_json::to_string_pretty(&listing)?);
            return Ok(());
        }
        for entry in &listing {
            println!();
            println!("{} ({})", entry.form, entry.schema_locator);
            println!("{}", Table::new(&entry.codes).with(Style::rounded()));
        }
        println!();
        Ok(())
    }
}

fn code_rows(form: &FormVariant) -> Vec<CodeRow> {
    let line_of = |category: Category| {
        form.line_for(category)
            .map_or_else(|| "-".to_string(), |spec| spec.line.to_string())
    };
    let mut rows: Vec<CodeRow> = form
        .tax_codes
        .iter()
        .map(|(code, category)| CodeRow {
            code: code.to_string(),
            category: category.title().to_string(),
            line: line_of(*category),
        })
        .collect();
    rows.push(CodeRow {
        code: "any other".to_string(),
        category: Category::Other.title().to_string(),
        line: line_of(Category::Other),
    });
    rows
}
