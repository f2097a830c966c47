pub mod codes;
pub mod records;
pub mod schema;
pub mod summary;
pub mod validate;

use crate::core::{Category, CategoryFilter, FormVariant, LoadOptions, Session, Statement, Upload};
use crate::core::form::{F1401803, F1401804, F1401805};
use chrono::Datelike;
use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use std::io::{self, BufReader};
use std::path::PathBuf;

/// Input options shared by every command that reads a statement.
#[derive(Args, Debug)]
pub struct StatementArgs {
    /// Statement XML file (F14018xx). Reads from stdin with "-"
    #[arg(default_value = "-")]
    file: PathBuf,

    /// Form variant; detected from the schema locator when omitted
    #[arg(short, long, value_enum)]
    form: Option<FormArg>,

    /// Year the statement should cover (defaults to last calendar year)
    #[arg(short, long)]
    year: Option<i32>,
}

impl StatementArgs {
    pub fn expected_year(&self) -> i32 {
        self.year
            .unwrap_or_else(|| chrono::Local::now().year() - 1)
    }

    /// Read and process the statement (or stdin with "-")
    pub fn read_statement(&self) -> anyhow::Result<Statement> {
        let upload = if self.file.as_os_str() == "-" {
            let stdin = io::stdin();
            let upload = Upload::from_reader("<stdin>", BufReader::new(stdin.lock()))?;
            if upload.bytes.is_empty() {
                anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
            }
            upload
        } else {
            Upload::from_path(&self.file)?
        };

        let name = upload.name.clone();
        let mut session = Session::new(LoadOptions {
            form: self.form.map(FormArg::variant),
            expected_year: Some(self.expected_year()),
        });
        if let Err(err) = session.select(Some(upload)) {
            if err.is_unexpected() {
                let hint = format!("{name} looks like a genuine statement that could not be read");
                return Err(anyhow::Error::new(err).context(hint));
            }
            return Err(err.into());
        }
        session
            .current()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("No statement loaded"))
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormArg {
    F1401803,
    F1401804,
    F1401805,
}

impl FormArg {
    pub fn variant(self) -> &'static FormVariant {
        match self {
            FormArg::F1401803 => &F1401803,
            FormArg::F1401804 => &F1401804,
            FormArg::F1401805 => &F1401805,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CategoryArg {
    /// Deposit interest and card cashback
    Cashback,
    CorporateBond,
    GovernmentBond,
    Dividends,
    DiiaCity,
    InvestmentProfit,
    /// Individual entrepreneur (FOP) payments
    Fop,
    MedicalInsurance,
    BorrowedFunds,
    Other,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Cashback => Category::CashbackDeposit,
            CategoryArg::CorporateBond => Category::CorporateBond,
            CategoryArg::GovernmentBond => Category::GovernmentBond,
            CategoryArg::Dividends => Category::Dividends,
            CategoryArg::DiiaCity => Category::DiiaCityWage,
            CategoryArg::InvestmentProfit => Category::InvestmentProfit,
            CategoryArg::Fop => Category::SimplifiedTaxation,
            CategoryArg::MedicalInsurance => Category::MedicalInsurance,
            CategoryArg::BorrowedFunds => Category::BorrowedFunds,
            CategoryArg::Other => Category::Other,
        }
    }
}

pub fn category_filter(args: &[CategoryArg]) -> CategoryFilter {
    args.iter().copied().map(Category::from).collect()
}

/// Hryvnia amount as written in Ukrainian documents, e.g. `1 234,56 ₴`.
pub fn format_uah(amount: Decimal) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((&fixed, "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('\u{00A0}');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() { "-" } else { "" };
    format!("{sign}{grouped},{fraction}\u{00A0}₴")
}
