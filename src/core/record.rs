use super::document::{Cell, RawDeclarationDocument};
use super::form::FormVariant;
use super::statement::DocumentError;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};

/// Military levy on paid income where personal income tax was withheld.
pub const MILITARY_TAX_RATE: Decimal = dec!(0.015);

/// Largest amount accepted in a single cell, one quadrillion hryvnias.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000000);

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ReconstructError {
    #[error("row {row} appears more than once in column {column}")]
    DuplicateRow { column: String, row: String },
    #[error("row {row} has no tax code")]
    MissingTaxCode { row: String },
    #[error("row {row} has an unreadable tax code '{label}'")]
    InvalidTaxCode { row: String, label: String },
    #[error("row {row} has no year")]
    MissingYear { row: String },
    #[error("row {row} has an invalid amount '{value}' in column {column}")]
    InvalidAmount {
        row: String,
        column: String,
        value: String,
    },
}

/// One income payment reconstructed from the statement's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeRecord {
    /// `ROWNUM` the columns were joined on
    pub row_key: String,
    /// Day and month (or quarter) followed by the year
    pub date: String,
    pub company: String,
    pub income_accrued: Decimal,
    pub income_paid: Decimal,
    pub tax_accrued: Decimal,
    pub tax_paid: Decimal,
    pub tax_code: u16,
}

impl IncomeRecord {
    /// Military tax owed on this payment.
    ///
    /// Derived from the paid amounts only: income without withheld personal
    /// income tax is exempt.
    pub fn military_tax(&self) -> Decimal {
        military_tax(self.income_paid, self.tax_paid)
    }
}

pub fn military_tax(income_paid: Decimal, tax_paid: Decimal) -> Decimal {
    if tax_paid.is_zero() {
        return Decimal::ZERO;
    }
    (income_paid * MILITARY_TAX_RATE).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Rebuild income records from a raw statement.
///
/// The schema locator is checked against `form` before any column is read.
/// Records follow the order of the date column; rows with a blank date are
/// summary lines and are skipped.
pub fn reconstruct(
    raw: &RawDeclarationDocument,
    form: &FormVariant,
) -> Result<Vec<IncomeRecord>, DocumentError> {
    match raw.schema_locator.as_deref() {
        Some(locator) if form.accepts(locator) => {}
        found => {
            return Err(DocumentError::SchemaMismatch {
                expected: form.schema_locator.to_string(),
                found: found.map(str::to_string),
            })
        }
    }
    Ok(join_rows(raw, form)?)
}

fn join_rows(
    raw: &RawDeclarationDocument,
    form: &FormVariant,
) -> Result<Vec<IncomeRecord>, ReconstructError> {
    let layout = &form.layout;
    let years = Column::new(raw, layout.year);
    let companies = Column::new(raw, layout.company);
    let incomes_accrued = Column::new(raw, layout.income_accrued);
    let incomes_paid = Column::new(raw, layout.income_paid);
    let taxes_accrued = Column::new(raw, layout.tax_accrued);
    let taxes_paid = Column::new(raw, layout.tax_paid);
    let tax_codes = Column::new(raw, layout.tax_code);

    let dates = raw.column(layout.date);
    let mut seen = HashSet::with_capacity(dates.len());
    let mut records = Vec::with_capacity(dates.len());

    for Cell { row_key, text: date } in dates {
        // Undated rows are totals lines; their keys are never joined.
        let date = date.trim();
        if date.is_empty() {
            log::debug!("Skipping row {} without a date", row_key);
            continue;
        }
        if !seen.insert(row_key.as_str()) {
            return Err(ReconstructError::DuplicateRow {
                column: layout.date.to_string(),
                row: row_key.clone(),
            });
        }

        let row = row_key.as_str();
        let label = tax_codes
            .get(row)?
            .ok_or_else(|| ReconstructError::MissingTaxCode {
                row: row_key.clone(),
            })?;
        let year = years.get(row)?.ok_or_else(|| ReconstructError::MissingYear {
            row: row_key.clone(),
        })?;

        let record = IncomeRecord {
            row_key: row_key.clone(),
            date: format!("{date} {year}"),
            company: companies.get(row)?.unwrap_or_default().to_string(),
            income_accrued: incomes_accrued.amount(row)?,
            income_paid: incomes_paid.amount(row)?,
            tax_accrued: taxes_accrued.amount(row)?,
            tax_paid: taxes_paid.amount(row)?,
            tax_code: parse_tax_code(label, row)?,
        };
        log::debug!(
            "Row {}: code {} paid {} tax {}",
            record.row_key,
            record.tax_code,
            record.income_paid,
            record.tax_paid
        );
        records.push(record);
    }

    log::info!("Reconstructed {} income records", records.len());
    Ok(records)
}

/// Row key to text lookup for one column.
struct Column<'a> {
    tag: &'a str,
    cells: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> Column<'a> {
    fn new(raw: &'a RawDeclarationDocument, tag: &'a str) -> Self {
        let mut cells: HashMap<&str, Vec<&str>> = HashMap::new();
        for cell in raw.column(tag) {
            cells
                .entry(cell.row_key.as_str())
                .or_default()
                .push(cell.text.as_str());
        }
        Column { tag, cells }
    }

    /// A row key used twice in the column is an error once that row is read.
    fn get(&self, row: &str) -> Result<Option<&'a str>, ReconstructError> {
        match self.cells.get(row).map(Vec::as_slice) {
            None => Ok(None),
            Some([text]) => Ok(Some(*text)),
            Some(_) => Err(ReconstructError::DuplicateRow {
                column: self.tag.to_string(),
                row: row.to_string(),
            }),
        }
    }

    /// Missing and blank cells count as zero.
    fn amount(&self, row: &str) -> Result<Decimal, ReconstructError> {
        match self.get(row)? {
            Some(text) => parse_amount(text, self.tag, row),
            None => Ok(Decimal::ZERO),
        }
    }
}

fn parse_amount(text: &str, tag: &str, row: &str) -> Result<Decimal, ReconstructError> {
    let cleaned: String = text
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let invalid = || ReconstructError::InvalidAmount {
        row: row.to_string(),
        column: tag.to_string(),
        value: text.to_string(),
    };
    let amount = Decimal::from_str_exact(&cleaned).map_err(|_| invalid())?;
    // Keeps any statement's sums far from Decimal's range.
    if amount.abs() > MAX_AMOUNT {
        return Err(invalid());
    }
    Ok(amount)
}

/// Only the number before the first `" - "` is the code.
fn parse_tax_code(label: &str, row: &str) -> Result<u16, ReconstructError> {
    let code = label.split(" - ").next().unwrap_or_default().trim();
    code.parse().map_err(|_| ReconstructError::InvalidTaxCode {
        row: row.to_string(),
        label: label.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::form::{F1401803, F1401804};

    /// (row, date, tax code label, income, tax)
    pub(crate) type Row<'a> = (&'a str, &'a str, &'a str, &'a str, &'a str);

    fn column(rows: &[Row<'_>], pick: impl Fn(&Row<'_>) -> String) -> Vec<Cell> {
        rows.iter().map(|r| Cell::new(r.0, pick(r))).collect()
    }

    /// F1401804 statement where accrued equals paid for income and tax.
    pub(crate) fn statement(rows: &[Row<'_>]) -> RawDeclarationDocument {
        RawDeclarationDocument::default()
            .with_schema_locator("F1401804.XSD")
            .with_column("T1RXXXXG3S", column(rows, |r| r.1.to_string()))
            .with_column("T1RXXXXG4", column(rows, |_| "2022".to_string()))
            .with_column("T1RXXXXG6S", column(rows, |_| "АТ КБ \"ПРИВАТБАНК\"".to_string()))
            .with_column("T1RXXXXG7", column(rows, |r| r.3.to_string()))
            .with_column("T1RXXXXG8", column(rows, |r| r.3.to_string()))
            .with_column("T1RXXXXG9", column(rows, |r| r.4.to_string()))
            .with_column("T1RXXXXG10", column(rows, |r| r.4.to_string()))
            .with_column("T1RXXXXG11S", column(rows, |r| r.2.to_string()))
    }

    #[test]
    fn joins_columns_by_row_key() {
        let raw = statement(&[
            ("1", "15.03", "126 - Проценти", "1000.00", "15.00"),
            ("2", "20.04", "999 - Інше", "500.00", "0"),
        ]);
        let records = reconstruct(&raw, &F1401804).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_key, "1");
        assert_eq!(records[0].date, "15.03 2022");
        assert_eq!(records[0].company, "АТ КБ \"ПРИВАТБАНК\"");
        assert_eq!(records[0].tax_code, 126);
        assert_eq!(records[0].income_paid, dec!(1000.00));
        assert_eq!(records[0].military_tax(), dec!(15.00));
        assert_eq!(records[1].tax_code, 999);
        assert_eq!(records[1].military_tax(), Decimal::ZERO);
    }

    #[test]
    fn columns_may_be_out_of_order() {
        let raw = statement(&[("1", "15.03", "126", "10", "1.8"), ("2", "16.03", "129", "20", "0")])
            .with_column(
                "T1RXXXXG8",
                vec![Cell::new("2", "20.00"), Cell::new("1", "10.00")],
            );
        let records = reconstruct(&raw, &F1401804).unwrap();
        assert_eq!(records[0].income_paid, dec!(10.00));
        assert_eq!(records[1].income_paid, dec!(20.00));
    }

    #[test]
    fn blank_dates_are_skipped() {
        let raw = statement(&[
            ("1", "15.03", "126", "10", "1.8"),
            ("2", "", "126", "10", "1.8"),
            ("3", "17.03", "126", "10", "1.8"),
        ]);
        let records = reconstruct(&raw, &F1401804).unwrap();
        let keys: Vec<_> = records.iter().map(|r| r.row_key.as_str()).collect();
        assert_eq!(keys, ["1", "3"]);
    }

    #[test]
    fn missing_amounts_default_to_zero() {
        let raw = statement(&[("1", "15.03", "126", "10", "1.8")])
            .with_column("T1RXXXXG7", vec![])
            .with_column("T1RXXXXG9", vec![Cell::new("1", "  ")]);
        let record = &reconstruct(&raw, &F1401804).unwrap()[0];
        assert_eq!(record.income_accrued, Decimal::ZERO);
        assert_eq!(record.tax_accrued, Decimal::ZERO);
        assert_eq!(record.income_paid, dec!(10));
    }

    #[test]
    fn missing_company_is_empty() {
        let raw = statement(&[("1", "15.03", "126", "10", "1.8")]).with_column("T1RXXXXG6S", vec![]);
        assert_eq!(reconstruct(&raw, &F1401804).unwrap()[0].company, "");
    }

    #[test]
    fn comma_decimal_separator_is_accepted() {
        let raw = statement(&[("1", "15.03", "126", "1 234,56", "0")]);
        assert_eq!(reconstruct(&raw, &F1401804).unwrap()[0].income_paid, dec!(1234.56));
    }

    #[test]
    fn missing_tax_code_is_an_error() {
        let raw = statement(&[("1", "15.03", "126", "10", "1.8")]).with_column("T1RXXXXG11S", vec![]);
        assert!(matches!(
            reconstruct(&raw, &F1401804),
            Err(DocumentError::Reconstruction(ReconstructError::MissingTaxCode { .. }))
        ));
    }

    #[test]
    fn unreadable_tax_code_is_an_error() {
        let raw = statement(&[("1", "15.03", "Проценти - 126", "10", "1.8")]);
        assert!(matches!(
            reconstruct(&raw, &F1401804),
            Err(DocumentError::Reconstruction(ReconstructError::InvalidTaxCode { .. }))
        ));
    }

    #[test]
    fn invalid_amount_is_an_error() {
        let raw = statement(&[("1", "15.03", "126", "12.3.4", "1.8")]);
        let err = reconstruct(&raw, &F1401804).unwrap_err();
        assert_eq!(
            err,
            DocumentError::Reconstruction(ReconstructError::InvalidAmount {
                row: "1".to_string(),
                column: "T1RXXXXG7".to_string(),
                value: "12.3.4".to_string(),
            })
        );
    }

    #[test]
    fn duplicate_row_keys_are_rejected() {
        let raw = statement(&[
            ("1", "15.03", "126", "10", "1.8"),
            ("1", "16.03", "126", "10", "1.8"),
        ]);
        assert!(matches!(
            reconstruct(&raw, &F1401804),
            Err(DocumentError::Reconstruction(ReconstructError::DuplicateRow { .. }))
        ));
    }

    #[test]
    fn undated_rows_may_share_a_row_key() {
        let raw = statement(&[
            ("1", "15.03", "126", "10", "1.8"),
            ("9", "", "", "10", "1.8"),
            ("9", "", "", "10", "1.8"),
        ]);
        let records = reconstruct(&raw, &F1401804).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn duplicate_key_in_a_joined_column_is_rejected() {
        let raw = statement(&[("1", "15.03", "126", "10", "1.8")]).with_column(
            "T1RXXXXG8",
            vec![Cell::new("1", "10"), Cell::new("1", "20")],
        );
        assert_eq!(
            reconstruct(&raw, &F1401804),
            Err(DocumentError::Reconstruction(ReconstructError::DuplicateRow {
                column: "T1RXXXXG8".to_string(),
                row: "1".to_string(),
            }))
        );
    }

    #[test]
    fn amounts_beyond_the_limit_are_invalid() {
        let huge = "50000000000000000000000000000";
        let raw = statement(&[
            ("1", "15.03", "126", huge, "0"),
            ("2", "16.03", "126", huge, "0"),
        ]);
        assert!(matches!(
            reconstruct(&raw, &F1401804),
            Err(DocumentError::Reconstruction(ReconstructError::InvalidAmount { .. }))
        ));

        let raw = statement(&[("1", "15.03", "126", "1000000000000000", "-1000000000000000")]);
        let record = &reconstruct(&raw, &F1401804).unwrap()[0];
        assert_eq!(record.income_paid, MAX_AMOUNT);
    }

    #[test]
    fn other_variant_locator_is_a_schema_mismatch() {
        let raw = statement(&[("1", "15.03", "126", "10", "1.8")]).with_schema_locator("F1401803.XSD");
        assert_eq!(
            reconstruct(&raw, &F1401804),
            Err(DocumentError::SchemaMismatch {
                expected: "F1401804.XSD".to_string(),
                found: Some("F1401803.XSD".to_string()),
            })
        );
        assert!(reconstruct(&raw, &F1401803).is_ok());
    }

    #[test]
    fn schema_is_checked_before_columns() {
        // Broken columns are never looked at when the schema does not match.
        let raw = statement(&[("1", "15.03", "", "x", "y")]).with_schema_locator("F1401803.XSD");
        assert!(matches!(
            reconstruct(&raw, &F1401804),
            Err(DocumentError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn military_tax_rounds_half_up() {
        assert_eq!(military_tax(dec!(1000.00), dec!(180.00)), dec!(15.00));
        // 0.015 * 33.00 = 0.495
        assert_eq!(military_tax(dec!(33.00), dec!(5.94)), dec!(0.50));
        // 0.015 * 1.00 = 0.015
        assert_eq!(military_tax(dec!(1.00), dec!(0.18)), dec!(0.02));
        assert_eq!(military_tax(dec!(1000.00), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn tax_code_prefix_only() {
        assert_eq!(parse_tax_code("126 - Проценти - депозит", "1"), Ok(126));
        assert_eq!(parse_tax_code(" 129 ", "1"), Ok(129));
        assert!(parse_tax_code("", "1").is_err());
    }
}
