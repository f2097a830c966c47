use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Declaration category an income record is reported under.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Category {
    /// Deposit interest and card cashback
    CashbackDeposit,
    CorporateBond,
    /// Government bonds (OVDP)
    GovernmentBond,
    Dividends,
    /// Wages of Diia City residents
    DiiaCityWage,
    InvestmentProfit,
    /// Payments to an individual entrepreneur (FOP) on the simplified system
    SimplifiedTaxation,
    MedicalInsurance,
    BorrowedFunds,
    /// Everything the active form does not map
    Other,
}

impl Category {
    pub fn title(self) -> &'static str {
        match self {
            Category::CashbackDeposit => "Депозити та кешбеки",
            Category::CorporateBond => "Корпоративні облігації",
            Category::GovernmentBond => "Державні облігації",
            Category::Dividends => "Дивіденди",
            Category::DiiaCityWage => "Заробітна плата Дія Сіті",
            Category::InvestmentProfit => "Інвестиційний прибуток",
            Category::SimplifiedTaxation => "Виплати на ФОП",
            Category::MedicalInsurance => "Медичне страхування",
            Category::BorrowedFunds => "Позикові кошти",
            Category::Other => "Інше",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

/// Categories selected for display. Empty means everything is shown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter(BTreeSet<Category>);

impl CategoryFilter {
    pub fn all() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn insert(&mut self, category: Category) {
        self.0.insert(category);
    }

    #[cfg(test)]
    pub fn remove(&mut self, category: Category) {
        self.0.remove(&category);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn allows(&self, category: Category) -> bool {
        self.0.is_empty() || self.0.contains(&category)
    }

    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Category> for CategoryFilter {
    fn from_iter<I: IntoIterator<Item = Category>>(iter: I) -> Self {
        CategoryFilter(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_filter_allows_everything() {
        let filter = CategoryFilter::all();
        assert!(filter.allows(Category::Other));
        assert!(filter.allows(Category::Dividends));
    }

    #[test]
    fn filter_toggles_like_checkboxes() {
        let mut filter = CategoryFilter::all();
        filter.insert(Category::GovernmentBond);
        assert!(filter.allows(Category::GovernmentBond));
        assert!(!filter.allows(Category::CashbackDeposit));

        filter.remove(Category::GovernmentBond);
        assert!(filter.is_empty());
        assert!(filter.allows(Category::CashbackDeposit));
    }
}
