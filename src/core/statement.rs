//! Loading an uploaded statement: type check, decoding, parsing, schema
//! gate and reconstruction, all or nothing.

use super::aggregate::{aggregate, Aggregation};
use super::category::{Category, CategoryFilter};
use super::document::RawDeclarationDocument;
use super::form::FormVariant;
use super::period::ReportingPeriod;
use super::record::{reconstruct, IncomeRecord, ReconstructError};
use super::warnings::Warning;
use super::xml::{self, XmlError};
use rust_decimal::Decimal;
use std::io::Read;
use std::path::Path;

const XML_MEDIA_TYPES: &[&str] = &["text/xml", "application/xml"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("{name} is not an XML file ({media_type})")]
    NotXml { name: String, media_type: String },
    #[error("could not read {name}: {message}")]
    Read { name: String, message: String },
    #[error("{name} is empty")]
    Empty { name: String },
    #[error("statement is not well-formed XML: {0}")]
    Malformed(#[from] XmlError),
    #[error("statement is not a {expected} document (schema {})", .found.as_deref().unwrap_or("missing"))]
    SchemaMismatch {
        expected: String,
        found: Option<String>,
    },
    #[error("unexpected statement contents, please report this file: {0}")]
    Reconstruction(#[from] ReconstructError),
}

impl DocumentError {
    /// Data the form guarantees was missing, as opposed to a wrong upload.
    pub fn is_unexpected(&self) -> bool {
        matches!(self, DocumentError::Reconstruction(_))
    }
}

/// A file handed to the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Upload {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Read a file, with the media type implied by its extension. Files that
    /// are not `.xml` are rejected before they are read.
    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let name = path.display().to_string();
        let media_type = media_type_for(path);
        check_media_type(&name, media_type)?;
        let bytes = std::fs::read(path).map_err(|e| DocumentError::Read {
            name: name.clone(),
            message: e.to_string(),
        })?;
        Ok(Upload::new(name, media_type, bytes))
    }

    /// Read a stream assumed to carry XML, such as stdin.
    pub fn from_reader<R: Read>(name: &str, mut reader: R) -> Result<Self, DocumentError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| DocumentError::Read {
                name: name.to_string(),
                message: e.to_string(),
            })?;
        Ok(Upload::new(name, XML_MEDIA_TYPES[0], bytes))
    }
}

fn media_type_for(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xml") => "text/xml",
        _ => "application/octet-stream",
    }
}

fn check_media_type(name: &str, media_type: &str) -> Result<(), DocumentError> {
    if XML_MEDIA_TYPES
        .iter()
        .any(|t| media_type.trim().eq_ignore_ascii_case(t))
    {
        Ok(())
    } else {
        Err(DocumentError::NotXml {
            name: name.to_string(),
            media_type: media_type.to_string(),
        })
    }
}

/// How uploads are interpreted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Force a form variant instead of detecting it from the schema locator
    pub form: Option<&'static FormVariant>,
    /// Calendar year the statement should cover
    pub expected_year: Option<i32>,
}

/// A successfully processed statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub form: &'static FormVariant,
    pub period: Option<ReportingPeriod>,
    pub records: Vec<IncomeRecord>,
    pub warnings: Vec<Warning>,
}

impl Statement {
    pub fn load(upload: &Upload, options: &LoadOptions) -> Result<Self, DocumentError> {
        check_media_type(&upload.name, &upload.media_type)?;
        if upload.bytes.is_empty() {
            return Err(DocumentError::Empty {
                name: upload.name.clone(),
            });
        }

        let text = xml::decode(&upload.bytes);
        let tree = xml::parse(&text)?;
        let raw = RawDeclarationDocument::from_tree(&tree);

        let form = match options.form {
            Some(form) => form,
            None => detect_form(&raw)?,
        };
        let statement = Statement::from_raw(&raw, form, options.expected_year)?;
        log::info!(
            "Loaded {} as {} with {} records",
            upload.name,
            form.id,
            statement.records.len()
        );
        Ok(statement)
    }

    /// Reconstruct and check a raw statement against `form`.
    pub fn from_raw(
        raw: &RawDeclarationDocument,
        form: &'static FormVariant,
        expected_year: Option<i32>,
    ) -> Result<Self, DocumentError> {
        let records = reconstruct(raw, form)?;
        let period = raw.period(form);

        let mut warnings = Vec::new();
        match period {
            None => warnings.push(Warning::PeriodMissing),
            Some(period) if !period.is_full_year(expected_year) => {
                warnings.push(Warning::PeriodMismatch {
                    period: period.to_string(),
                    expected_year,
                })
            }
            Some(_) => {}
        }
        if let Some(warning) = unclassified(&records, form) {
            warnings.push(warning);
        }
        for warning in &warnings {
            log::warn!("{}", warning);
        }

        Ok(Statement {
            form,
            period,
            records,
            warnings,
        })
    }

    /// Classify and total the records; recomputed on every call.
    pub fn aggregate(&self, filter: &CategoryFilter) -> Aggregation<'_> {
        aggregate(&self.records, self.form, filter)
    }
}

fn detect_form(raw: &RawDeclarationDocument) -> Result<&'static FormVariant, DocumentError> {
    let found = raw.schema_locator.as_deref();
    found
        .and_then(FormVariant::detect)
        .ok_or_else(|| DocumentError::SchemaMismatch {
            expected: super::form::FORMS
                .iter()
                .map(|f| f.schema_locator)
                .collect::<Vec<_>>()
                .join(" or "),
            found: found.map(str::to_string),
        })
}

fn unclassified(records: &[IncomeRecord], form: &FormVariant) -> Option<Warning> {
    let mut codes = Vec::new();
    let mut count = 0;
    let mut income_paid = Decimal::ZERO;
    for record in records
        .iter()
        .filter(|r| form.classify(r.tax_code) == Category::Other)
    {
        count += 1;
        income_paid += record.income_paid;
        if !codes.contains(&record.tax_code) {
            codes.push(record.tax_code);
        }
    }
    codes.sort_unstable();
    (count > 0).then_some(Warning::UnclassifiedIncome {
        count,
        codes,
        income_paid,
    })
}

/// Keeps the last statement that loaded successfully.
#[derive(Debug, Default)]
pub struct Session {
    options: LoadOptions,
    current: Option<Statement>,
}

impl Session {
    pub fn new(options: LoadOptions) -> Self {
        Session {
            options,
            current: None,
        }
    }

    /// Process a newly selected file. Selecting nothing changes nothing; a
    /// failed load leaves the previous statement in place.
    pub fn select(&mut self, upload: Option<Upload>) -> Result<Option<&Statement>, DocumentError> {
        match upload {
            Some(upload) => self.load(&upload).map(Some),
            None => Ok(self.current.as_ref()),
        }
    }

    /// Load `upload`, replacing the current statement only on success.
    pub fn load(&mut self, upload: &Upload) -> Result<&Statement, DocumentError> {
        let statement = Statement::load(upload, &self.options)?;
        Ok(&*self.current.insert(statement))
    }

    pub fn current(&self) -> Option<&Statement> {
        self.current.as_ref()
    }
}
