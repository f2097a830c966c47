//! Compiled-in configuration of the supported statement form variants.
//!
//! A variant fixes which schema locator it accepts, how its reporting period
//! is expressed, where each column lives in `DECLARBODY`, how tax codes map to
//! categories and how categories fold into declaration lines. Supporting a new
//! variant means adding another `FormVariant` value to [`FORMS`].

use super::category::Category;
use super::period::PeriodScheme;
use std::fmt;

/// Numbered row of the tax declaration, e.g. `10.13`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DeclarationLine {
    pub major: u8,
    pub minor: u8,
}

impl DeclarationLine {
    pub const fn new(major: u8, minor: u8) -> Self {
        DeclarationLine { major, minor }
    }
}

impl fmt::Display for DeclarationLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl std::str::FromStr for DeclarationLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s
            .split_once('.')
            .ok_or_else(|| format!("declaration line '{s}' is not of the form 10.13"))?;
        let parse = |part: &str| {
            part.trim()
                .parse::<u8>()
                .map_err(|_| format!("declaration line '{s}' is not of the form 10.13"))
        };
        Ok(DeclarationLine::new(parse(major)?, parse(minor)?))
    }
}

impl serde::Serialize for DeclarationLine {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A declaration line and the categories reported under it.
#[derive(Debug, Clone, Copy)]
pub struct LineSpec {
    pub line: DeclarationLine,
    pub title: &'static str,
    /// Whether tax withheld and military tax are reported on this line
    pub taxable: bool,
    pub categories: &'static [Category],
}

/// Tags of the `DECLARBODY` elements a variant reads.
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    /// Day and month (or quarter) of the payment
    pub date: &'static str,
    pub year: &'static str,
    pub company: &'static str,
    pub income_accrued: &'static str,
    pub income_paid: &'static str,
    pub tax_accrued: &'static str,
    pub tax_paid: &'static str,
    /// `"<code> - <description>"` label
    pub tax_code: &'static str,
    pub period_from_unit: &'static str,
    pub period_from_year: &'static str,
    pub period_to_unit: &'static str,
    pub period_to_year: &'static str,
}

/// Immutable description of one statement form version.
#[derive(Debug)]
pub struct FormVariant {
    pub id: &'static str,
    pub title: &'static str,
    pub schema_locator: &'static str,
    pub period: PeriodScheme,
    pub layout: Layout,
    pub tax_codes: &'static [(u16, Category)],
    pub lines: &'static [LineSpec],
}

impl FormVariant {
    /// Whether a document's schema locator belongs to this variant.
    pub fn accepts(&self, locator: &str) -> bool {
        normalize_locator(locator) == normalize_locator(self.schema_locator)
    }

    pub fn classify(&self, tax_code: u16) -> Category {
        self.tax_codes
            .iter()
            .find(|(code, _)| *code == tax_code)
            .map_or(Category::Other, |(_, category)| *category)
    }

    /// Categories this variant distinguishes, `Other` last.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.tax_codes.iter().map(|(_, c)| *c).collect();
        categories.push(Category::Other);
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn line_for(&self, category: Category) -> Option<&LineSpec> {
        self.lines.iter().find(|l| l.categories.contains(&category))
    }

    /// Variant whose schema locator matches the document's.
    pub fn detect(locator: &str) -> Option<&'static FormVariant> {
        FORMS.iter().copied().find(|f| f.accepts(locator))
    }
}

/// Variants are singletons; the id identifies them.
impl PartialEq for FormVariant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FormVariant {}

fn normalize_locator(locator: &str) -> String {
    locator.trim().to_ascii_uppercase()
}

const LAYOUT: Layout = Layout {
    date: "T1RXXXXG3S",
    year: "T1RXXXXG4",
    company: "T1RXXXXG6S",
    income_accrued: "T1RXXXXG7",
    income_paid: "T1RXXXXG8",
    tax_accrued: "T1RXXXXG9",
    tax_paid: "T1RXXXXG10",
    tax_code: "T1RXXXXG11S",
    period_from_unit: "R0101G1S",
    period_from_year: "R0101G2",
    period_to_unit: "R0101G3S",
    period_to_year: "R0101G4",
};

const OTHER_INCOME: DeclarationLine = DeclarationLine::new(10, 13);
const NON_TAXABLE: DeclarationLine = DeclarationLine::new(11, 3);

pub static F1401803: FormVariant = FormVariant {
    id: "F1401803",
    title: "Відомість про суми виплачених доходів (F1401803)",
    schema_locator: "F1401803.XSD",
    period: PeriodScheme::Monthly,
    layout: LAYOUT,
    tax_codes: &[
        (110, Category::CorporateBond),
        (126, Category::CashbackDeposit),
        (127, Category::CashbackDeposit),
        (129, Category::GovernmentBond),
    ],
    lines: &[
        LineSpec {
            line: DeclarationLine::new(10, 10),
            title: "Інші доходи",
            taxable: true,
            categories: &[Category::CashbackDeposit, Category::CorporateBond],
        },
        LineSpec {
            line: NON_TAXABLE,
            title: "Доходи, що не підлягають оподаткуванню",
            taxable: false,
            categories: &[Category::GovernmentBond],
        },
    ],
};

pub static F1401804: FormVariant = FormVariant {
    id: "F1401804",
    title: "Відомість про суми виплачених доходів (F1401804)",
    schema_locator: "F1401804.XSD",
    period: PeriodScheme::Monthly,
    layout: LAYOUT,
    tax_codes: &[
        (109, Category::Dividends),
        (110, Category::CorporateBond),
        (113, Category::InvestmentProfit),
        (126, Category::CashbackDeposit),
        (127, Category::CashbackDeposit),
        (129, Category::GovernmentBond),
        (157, Category::SimplifiedTaxation),
    ],
    lines: &[
        LineSpec {
            line: DeclarationLine::new(10, 4),
            title: "Дивіденди",
            taxable: true,
            categories: &[Category::Dividends],
        },
        LineSpec {
            line: DeclarationLine::new(10, 8),
            title: "Інвестиційний прибуток",
            taxable: true,
            categories: &[Category::InvestmentProfit],
        },
        LineSpec {
            line: OTHER_INCOME,
            title: "Інші доходи",
            taxable: true,
            categories: &[Category::CashbackDeposit, Category::CorporateBond],
        },
        LineSpec {
            line: DeclarationLine::new(11, 1),
            title: "Доходи ФОП на спрощеній системі",
            taxable: false,
            categories: &[Category::SimplifiedTaxation],
        },
        LineSpec {
            line: NON_TAXABLE,
            title: "Доходи, що не підлягають оподаткуванню",
            taxable: false,
            categories: &[Category::GovernmentBond],
        },
    ],
};

pub static F1401805: FormVariant = FormVariant {
    id: "F1401805",
    title: "Відомість про суми виплачених доходів, поквартальна (F1401805)",
    schema_locator: "F1401805.XSD",
    period: PeriodScheme::Quarterly,
    layout: LAYOUT,
    tax_codes: &[
        (109, Category::Dividends),
        (110, Category::CorporateBond),
        (113, Category::InvestmentProfit),
        (126, Category::CashbackDeposit),
        (127, Category::CashbackDeposit),
        (129, Category::GovernmentBond),
        (134, Category::BorrowedFunds),
        (157, Category::SimplifiedTaxation),
        (160, Category::MedicalInsurance),
        (195, Category::DiiaCityWage),
    ],
    lines: &[
        LineSpec {
            line: DeclarationLine::new(10, 3),
            title: "Заробітна плата резидента Дія Сіті",
            taxable: true,
            categories: &[Category::DiiaCityWage],
        },
        LineSpec {
            line: DeclarationLine::new(10, 4),
            title: "Дивіденди",
            taxable: true,
            categories: &[Category::Dividends],
        },
        LineSpec {
            line: DeclarationLine::new(10, 8),
            title: "Інвестиційний прибуток",
            taxable: true,
            categories: &[Category::InvestmentProfit],
        },
        LineSpec {
            line: OTHER_INCOME,
            title: "Інші доходи",
            taxable: true,
            categories: &[Category::CashbackDeposit, Category::CorporateBond],
        },
        LineSpec {
            line: DeclarationLine::new(11, 1),
            title: "Доходи ФОП на спрощеній системі",
            taxable: false,
            categories: &[Category::SimplifiedTaxation],
        },
        LineSpec {
            line: NON_TAXABLE,
            title: "Доходи, що не підлягають оподаткуванню",
            taxable: false,
            categories: &[
                Category::GovernmentBond,
                Category::MedicalInsurance,
                Category::BorrowedFunds,
            ],
        },
    ],
};

pub static FORMS: &[&FormVariant] = &[&F1401803, &F1401804, &F1401805];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_variant_recognizes_other() {
        for form in FORMS {
            assert_eq!(form.categories().last(), Some(&Category::Other));
        }
    }

    #[test]
    fn category_counts_per_variant() {
        assert_eq!(F1401803.categories().len(), 4);
        assert_eq!(F1401804.categories().len(), 7);
        assert_eq!(F1401805.categories().len(), 10);
    }

    #[test]
    fn unknown_codes_are_other() {
        assert_eq!(F1401805.classify(999), Category::Other);
        assert_eq!(F1401803.classify(157), Category::Other);
        assert_eq!(F1401804.classify(157), Category::SimplifiedTaxation);
    }

    #[test]
    fn each_category_lands_on_at_most_one_line() {
        for form in FORMS {
            for category in form.categories() {
                let lines = form
                    .lines
                    .iter()
                    .filter(|l| l.categories.contains(&category))
                    .count();
                assert!(lines <= 1, "{} {:?} on {} lines", form.id, category, lines);
            }
        }
    }

    #[test]
    fn line_categories_are_recognized_by_their_form() {
        for form in FORMS {
            let known = form.categories();
            for spec in form.lines {
                for category in spec.categories {
                    assert!(known.contains(category), "{} {}", form.id, spec.line);
                }
            }
        }
    }

    #[test]
    fn locator_comparison_is_normalized() {
        assert!(F1401803.accepts("f1401803.xsd"));
        assert!(F1401803.accepts(" F1401803.XSD "));
        assert!(!F1401804.accepts("F1401803.XSD"));
    }

    #[test]
    fn detect_and_lookup() {
        assert_eq!(FormVariant::detect("F1401805.xsd").map(|f| f.id), Some("F1401805"));
        assert!(FormVariant::detect("J0100115.XSD").is_none());
    }

    #[test]
    fn declaration_lines_order_numerically() {
        let mut lines: Vec<DeclarationLine> = ["11.3", "10.13", "10.4", "10.10"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        lines.sort();
        let shown: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        assert_eq!(shown, ["10.4", "10.10", "10.13", "11.3"]);
        assert!("10".parse::<DeclarationLine>().is_err());
    }
}
