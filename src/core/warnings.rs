use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::Serialize;

/// Advisory conditions found while loading a statement. None of them stop
/// processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Warning {
    /// The statement does not cover one whole calendar year (or not the
    /// expected one).
    PeriodMismatch {
        period: String,
        expected_year: Option<i32>,
    },
    /// The reporting period fields are absent or unreadable.
    PeriodMissing,
    /// Records whose tax code the form does not map, totalled in `Other`.
    UnclassifiedIncome {
        count: usize,
        codes: Vec<u16>,
        #[schemars(with = "String")]
        income_paid: Decimal,
    },
}

impl Warning {
    pub fn kind(&self) -> &'static str {
        match self {
            Warning::PeriodMismatch { .. } => "PeriodMismatch",
            Warning::PeriodMissing => "PeriodMissing",
            Warning::UnclassifiedIncome { .. } => "UnclassifiedIncome",
        }
    }

    pub fn message(&self) -> String {
        match self {
            Warning::PeriodMismatch {
                period,
                expected_year: Some(year),
            } => format!("Statement covers {period}, expected the whole of {year}"),
            Warning::PeriodMismatch {
                period,
                expected_year: None,
            } => format!("Statement covers {period}, expected one whole calendar year"),
            Warning::PeriodMissing => "Statement has no readable reporting period".to_string(),
            Warning::UnclassifiedIncome {
                count,
                codes,
                income_paid,
            } => {
                let codes: Vec<String> = codes.iter().map(u16::to_string).collect();
                format!(
                    "{count} record(s) with tax code(s) {} are not mapped to a declaration line ({income_paid:.2} paid)",
                    codes.join(", ")
                )
            }
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}
