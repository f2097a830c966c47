//! Generic XML tree and the decoding of legacy-encoded statement bytes.

use encoding_rs::{Encoding, WINDOWS_1251};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::borrow::Cow;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum XmlError {
    #[error("invalid XML at byte {position}: {message}")]
    Syntax { position: u64, message: String },
    #[error("document has no root element")]
    NoRoot,
    #[error("unexpected content after the root element <{0}>")]
    TrailingContent(String),
    #[error("element <{0}> is never closed")]
    Unclosed(String),
}

/// One element of a parsed document: its qualified name, attributes in
/// document order, concatenated text and child elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Name without a namespace prefix.
    pub fn local_name(&self) -> &str {
        local(&self.name)
    }

    /// Attribute lookup by local name, so `xsi:noNamespaceSchemaLocation`
    /// is found as `noNamespaceSchemaLocation`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| local(key) == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.local_name() == name)
    }
}

fn local(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}

/// Decode raw statement bytes into text.
///
/// A byte order mark wins, then the encoding named in the XML prolog, then
/// windows-1251 which is what the tax service exports.
pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let declared = declared_encoding(bytes).unwrap_or(WINDOWS_1251);
    let (text, used, had_errors) = declared.decode(bytes);
    if had_errors {
        log::warn!("Statement contains bytes that are not valid {}", used.name());
    }
    log::debug!("Decoded statement as {}", used.name());
    text
}

fn declared_encoding(bytes: &[u8]) -> Option<&'static Encoding> {
    // The prolog is plain ASCII in every encoding we accept.
    let head = &bytes[..bytes.len().min(200)];
    let head = String::from_utf8_lossy(head);
    let prolog = head.strip_prefix('\u{feff}').unwrap_or(&head).trim_start();
    if !prolog.starts_with("<?xml") {
        return None;
    }
    let prolog = &prolog[..prolog.find("?>")?];
    let rest = &prolog[prolog.find("encoding")? + "encoding".len()..];
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();
    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let label = &rest[1..];
    let label = &label[..label.find(quote)?];
    Encoding::for_label(label.as_bytes())
}

/// Parse well-formed XML text into its root element.
pub fn parse(text: &str) -> Result<XmlElement, XmlError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        let event = reader.read_event().map_err(|e| XmlError::Syntax {
            position: reader.buffer_position() as u64,
            message: e.to_string(),
        })?;
        match event {
            Event::Start(ref start) => {
                let element = open(start, reader.buffer_position() as u64)?;
                if stack.is_empty() {
                    ensure_single_root(&root, &element)?;
                }
                stack.push(element);
            }
            Event::Empty(ref start) => {
                let element = open(start, reader.buffer_position() as u64)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => {
                        ensure_single_root(&root, &element)?;
                        root = Some(element);
                    }
                }
            }
            Event::Text(ref text) => {
                let unescaped = text.unescape().map_err(|e| XmlError::Syntax {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                })?;
                match stack.last_mut() {
                    Some(current) => current.text.push_str(&unescaped),
                    None => match &root {
                        Some(root) => return Err(XmlError::TrailingContent(root.name.clone())),
                        None => {
                            return Err(XmlError::Syntax {
                                position: reader.buffer_position() as u64,
                                message: "text before the root element".to_string(),
                            })
                        }
                    },
                }
            }
            Event::CData(ref data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(data));
                }
            }
            Event::End(_) => {
                // quick-xml rejects mismatched end tags itself.
                let Some(element) = stack.pop() else {
                    continue;
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(XmlError::Unclosed(open.name));
    }
    root.ok_or(XmlError::NoRoot)
}

fn ensure_single_root(root: &Option<XmlElement>, next: &XmlElement) -> Result<(), XmlError> {
    match root {
        Some(existing) => {
            log::debug!("Second root element <{}>", next.name);
            Err(XmlError::TrailingContent(existing.name.clone()))
        }
        None => Ok(()),
    }
}

fn open(start: &BytesStart, position: u64) -> Result<XmlElement, XmlError> {
    let syntax = |message: String| XmlError::Syntax { position, message };

    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| syntax(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| syntax(e.to_string()))?;
        attributes.push((key, value.into_owned()));
    }

    Ok(XmlElement {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}
