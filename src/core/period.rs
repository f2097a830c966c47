use schemars::JsonSchema;
use serde::Serialize;
use std::fmt;

/// How a form variant expresses its reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub enum PeriodScheme {
    Monthly,
    Quarterly,
}

impl PeriodScheme {
    /// Number of units in a calendar year.
    pub fn units(self) -> u8 {
        match self {
            PeriodScheme::Monthly => 12,
            PeriodScheme::Quarterly => 4,
        }
    }

    /// Parse a period unit as written in the statement.
    pub fn parse_unit(self, text: &str) -> Option<u8> {
        let text = text.trim();
        let unit = match self {
            PeriodScheme::Monthly => month_number(text).or_else(|| text.parse().ok()),
            PeriodScheme::Quarterly => quarter_number(text).or_else(|| text.parse().ok()),
        }?;
        (1..=self.units()).contains(&unit).then_some(unit)
    }
}

const MONTHS: [&str; 12] = [
    "Січень",
    "Лютий",
    "Березень",
    "Квітень",
    "Травень",
    "Червень",
    "Липень",
    "Серпень",
    "Вересень",
    "Жовтень",
    "Листопад",
    "Грудень",
];

fn month_number(text: &str) -> Option<u8> {
    let lower = text.to_lowercase();
    MONTHS
        .iter()
        .position(|m| m.to_lowercase() == lower)
        .map(|i| i as u8 + 1)
}

fn quarter_number(text: &str) -> Option<u8> {
    match text {
        "I" => Some(1),
        "II" => Some(2),
        "III" => Some(3),
        "IV" => Some(4),
        _ => None,
    }
}

/// A month or quarter of a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct PeriodPoint {
    pub unit: u8,
    pub year: i32,
}

/// Range of the income statement, `from` and `to` inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct ReportingPeriod {
    pub scheme: PeriodScheme,
    pub from: PeriodPoint,
    pub to: PeriodPoint,
}

impl ReportingPeriod {
    /// Parse the four raw period fields; `None` if any is missing or invalid.
    pub fn parse(
        scheme: PeriodScheme,
        from_unit: Option<&str>,
        from_year: Option<&str>,
        to_unit: Option<&str>,
        to_year: Option<&str>,
    ) -> Option<Self> {
        let point = |unit: Option<&str>, year: Option<&str>| -> Option<PeriodPoint> {
            Some(PeriodPoint {
                unit: scheme.parse_unit(unit?)?,
                year: year?.trim().parse().ok()?,
            })
        };
        Some(ReportingPeriod {
            scheme,
            from: point(from_unit, from_year)?,
            to: point(to_unit, to_year)?,
        })
    }

    /// Covers one whole calendar year, optionally a specific one.
    pub fn is_full_year(&self, expected_year: Option<i32>) -> bool {
        self.from.unit == 1
            && self.to.unit == self.scheme.units()
            && self.from.year == self.to.year
            && expected_year.map_or(true, |y| self.from.year == y)
    }
}

impl fmt::Display for PeriodPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.unit, self.year)
    }
}

impl fmt::Display for ReportingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scheme {
            PeriodScheme::Monthly => write!(
                f,
                "{} {} – {} {}",
                MONTHS[self.from.unit as usize - 1],
                self.from.year,
                MONTHS[self.to.unit as usize - 1],
                self.to.year
            ),
            PeriodScheme::Quarterly => write!(
                f,
                "{} кв. {} – {} кв. {}",
                self.from.unit, self.from.year, self.to.unit, self.to.year
            ),
        }
    }
}
