use super::form::{FormVariant, Layout};
use super::period::ReportingPeriod;
use super::xml::XmlElement;
use std::collections::HashMap;

/// A value of one column, tied to its row by `ROWNUM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub row_key: String,
    pub text: String,
}

impl Cell {
    pub fn new(row_key: impl Into<String>, text: impl Into<String>) -> Self {
        Cell {
            row_key: row_key.into(),
            text: text.into(),
        }
    }
}

/// The parts of a parsed statement the engine reads: the schema locator,
/// single-valued body fields and the row-keyed column fragments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawDeclarationDocument {
    pub schema_locator: Option<String>,
    scalars: HashMap<String, String>,
    columns: HashMap<String, Vec<Cell>>,
}

impl RawDeclarationDocument {
    /// Collect fields from a parsed `DECLAR` tree.
    ///
    /// Body elements carrying a `ROWNUM` attribute are column cells, the rest
    /// are scalars. A tree that is not a `DECLAR` document yields a document
    /// without a schema locator.
    pub fn from_tree(root: &XmlElement) -> Self {
        let mut document = RawDeclarationDocument::default();
        if root.local_name() != "DECLAR" {
            log::debug!("Root element is <{}>, not <DECLAR>", root.name);
            return document;
        }
        document.schema_locator = root
            .attribute("noNamespaceSchemaLocation")
            .map(str::to_string);

        let Some(body) = root.child("DECLARBODY") else {
            return document;
        };
        for element in &body.children {
            let tag = element.local_name().to_string();
            match element.attribute("ROWNUM") {
                Some(row) => document
                    .columns
                    .entry(tag)
                    .or_default()
                    .push(Cell::new(row.trim(), element.text.trim())),
                None => {
                    document.scalars.insert(tag, element.text.trim().to_string());
                }
            }
        }
        log::debug!(
            "Statement body has {} columns and {} scalar fields",
            document.columns.len(),
            document.scalars.len()
        );
        document
    }

    #[cfg(test)]
    pub fn with_schema_locator(mut self, locator: impl Into<String>) -> Self {
        self.schema_locator = Some(locator.into());
        self
    }

    #[cfg(test)]
    pub fn with_scalar(mut self, tag: impl Into<String>, value: impl Into<String>) -> Self {
        self.scalars.insert(tag.into(), value.into());
        self
    }

    #[cfg(test)]
    pub fn with_column(mut self, tag: impl Into<String>, cells: Vec<Cell>) -> Self {
        self.columns.insert(tag.into(), cells);
        self
    }

    pub fn scalar(&self, tag: &str) -> Option<&str> {
        self.scalars.get(tag).map(String::as_str)
    }

    /// Cells of a column in document order; empty when the column is absent.
    pub fn column(&self, tag: &str) -> &[Cell] {
        self.columns.get(tag).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Reporting period as declared in the body, if complete and valid.
    pub fn period(&self, form: &FormVariant) -> Option<ReportingPeriod> {
        let Layout {
            period_from_unit,
            period_from_year,
            period_to_unit,
            period_to_year,
            ..
        } = form.layout;
        ReportingPeriod::parse(
            form.period,
            self.scalar(period_from_unit),
            self.scalar(period_from_year),
            self.scalar(period_to_unit),
            self.scalar(period_to_year),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::form::F1401803;
    use crate::core::xml;

    const DOC: &str = r#"<?xml version="1.0" encoding="windows-1251"?>
<DECLAR xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="F1401803.XSD">
  <DECLARHEAD><TIN>1234567890</TIN></DECLARHEAD>
  <DECLARBODY>
    <R0101G1S>Січень</R0101G1S>
    <R0101G2>2022</R0101G2>
    <R0101G3S>Грудень</R0101G3S>
    <R0101G4>2022</R0101G4>
    <T1RXXXXG3S ROWNUM="1">15.03</T1RXXXXG3S>
    <T1RXXXXG3S ROWNUM="2"></T1RXXXXG3S>
    <T1RXXXXG4 ROWNUM="1"> 2022 </T1RXXXXG4>
  </DECLARBODY>
</DECLAR>"#;

    #[test]
    fn splits_columns_and_scalars() {
        let document = RawDeclarationDocument::from_tree(&xml::parse(DOC).unwrap());
        assert_eq!(document.schema_locator.as_deref(), Some("F1401803.XSD"));
        assert_eq!(
            document.column("T1RXXXXG3S"),
            &[Cell::new("1", "15.03"), Cell::new("2", "")]
        );
        assert_eq!(document.column("T1RXXXXG4"), &[Cell::new("1", "2022")]);
        assert!(document.column("T1RXXXXG11S").is_empty());
        assert_eq!(document.scalar("R0101G1S"), Some("Січень"));
    }

    #[test]
    fn reads_period() {
        let document = RawDeclarationDocument::from_tree(&xml::parse(DOC).unwrap());
        let period = document.period(&F1401803).unwrap();
        assert!(period.is_full_year(Some(2022)));
    }

    #[test]
    fn other_roots_have_no_locator() {
        let root = xml::parse(r#"<Invoice noNamespaceSchemaLocation="F1401803.XSD"/>"#).unwrap();
        assert_eq!(RawDeclarationDocument::from_tree(&root).schema_locator, None);
    }
}
