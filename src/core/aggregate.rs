use super::category::{Category, CategoryFilter};
use super::form::{DeclarationLine, FormVariant};
use super::record::IncomeRecord;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::Serialize;
use std::collections::BTreeMap;

/// Running sums over a set of income records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Totals {
    pub count: usize,
    #[schemars(with = "String")]
    pub income_accrued: Decimal,
    #[schemars(with = "String")]
    pub income_paid: Decimal,
    #[schemars(with = "String")]
    pub tax_accrued: Decimal,
    #[schemars(with = "String")]
    pub tax_paid: Decimal,
    #[schemars(with = "String")]
    pub military_tax: Decimal,
}

impl Totals {
    pub fn add(&mut self, record: &IncomeRecord) {
        self.count += 1;
        self.income_accrued += record.income_accrued;
        self.income_paid += record.income_paid;
        self.tax_accrued += record.tax_accrued;
        self.tax_paid += record.tax_paid;
        self.military_tax += record.military_tax();
    }
}

/// Totals per declaration line of the active form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationTotals(BTreeMap<DeclarationLine, Totals>);

impl DeclarationTotals {
    pub fn get(&self, line: DeclarationLine) -> Option<&Totals> {
        self.0.get(&line)
    }
}

/// A record together with the category it was classified into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedRecord<'a> {
    pub record: &'a IncomeRecord,
    pub category: Category,
}

/// Output of one classification pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregation<'a> {
    /// Records the filter lets through, in statement order
    pub records: Vec<ClassifiedRecord<'a>>,
    /// Sums over `records` only
    pub visible: Totals,
    /// Sums over the whole statement
    pub document: Totals,
    pub categories: BTreeMap<Category, Totals>,
    pub lines: DeclarationTotals,
}

/// Classify records with `form`'s tax-code table and fold them into totals.
///
/// Category, line and document totals always cover every record; the filter
/// only decides which records are returned and summed into `visible`.
pub fn aggregate<'a>(
    records: &'a [IncomeRecord],
    form: &FormVariant,
    filter: &CategoryFilter,
) -> Aggregation<'a> {
    let mut categories: BTreeMap<Category, Totals> = form
        .categories()
        .into_iter()
        .map(|c| (c, Totals::default()))
        .collect();
    let mut lines: BTreeMap<DeclarationLine, Totals> = form
        .lines
        .iter()
        .map(|spec| (spec.line, Totals::default()))
        .collect();

    let mut shown = Vec::new();
    let mut visible = Totals::default();
    let mut document = Totals::default();

    for record in records {
        let category = form.classify(record.tax_code);

        document.add(record);
        categories.entry(category).or_default().add(record);
        if let Some(spec) = form.line_for(category) {
            lines.entry(spec.line).or_default().add(record);
        }

        if filter.allows(category) {
            visible.add(record);
            shown.push(ClassifiedRecord { record, category });
        }
    }

    log::debug!(
        "Aggregated {} records, {} shown with filter {:?}",
        document.count,
        visible.count,
        filter
    );

    Aggregation {
        records: shown,
        visible,
        document,
        categories,
        lines: DeclarationTotals(lines),
    }
}
