pub mod aggregate;
pub mod category;
pub mod document;
pub mod form;
pub mod period;
pub mod record;
pub mod statement;
pub mod warnings;
pub mod xml;

// Flat public surface for domain types and functions.
pub use aggregate::{Aggregation, ClassifiedRecord, Totals};
#[allow(unused_imports)]
pub use aggregate::DeclarationTotals;
pub use category::{Category, CategoryFilter};
#[allow(unused_imports)]
pub use document::{Cell, RawDeclarationDocument};
pub use form::{FormVariant, FORMS};
#[allow(unused_imports)]
pub use form::{DeclarationLine, LineSpec};
#[allow(unused_imports)]
pub use period::{PeriodScheme, ReportingPeriod};
#[allow(unused_imports)]
pub use record::{military_tax, reconstruct, IncomeRecord, ReconstructError, MILITARY_TAX_RATE};
pub use statement::{LoadOptions, Session, Statement, Upload};
#[allow(unused_imports)]
pub use statement::DocumentError;
pub use warnings::Warning;
#[allow(unused_imports)]
pub use xml::XmlError;
