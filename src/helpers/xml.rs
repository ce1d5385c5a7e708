//! XML parsing utilities for Office Open XML package parts.
//! Provides an XML reader wrapper and helper traits for attribute and text processing.

use crate::error::RustySheetMergeError;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::BytesRef;
use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

/// Errors specific to XML parsing operations
#[derive(Error, Debug)]
pub enum XmlError {
    #[error("Parse entity '{0}' failed")]
    ParseEntityError(String),
}

/// XML reader wrapper configured for worksheet parsing
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    /// Creates a new XML reader. Empty elements are expanded so `<c/>` yields
    /// a start and an end event like any other cell.
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        let buffer = Vec::with_capacity(1024);
        XmlReader { reader, buffer }
    }

    /// Reads the next XML event, `None` at end of document
    pub(crate) fn next(&'_ mut self) -> Result<Option<Event<'_>>, RustySheetMergeError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer) {
            Ok(Event::Eof) => Ok(None),
            Ok(event) => Ok(Some(event)),
            Err(error) => Err(RustySheetMergeError::XmlError(error)),
        }
    }
}

/// Helper trait for XML nodes providing attribute access
pub(crate) trait XmlNodeHelper<'a> {
    /// Gets an unescaped attribute value by name
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, RustySheetMergeError>;
}

impl<'a> XmlNodeHelper<'a> for BytesStart<'a> {
    fn get_attribute_value(&'a self, name: &str) -> Result<Option<Cow<'a, str>>, RustySheetMergeError> {
        match self.try_get_attribute(name)? {
            Some(attribute) => Ok(Some(attribute.unescape_value()?)),
            None => Ok(None),
        }
    }
}

/// Helper trait for building text content from XML events
pub(crate) trait XmlTextContextHelper {
    /// Appends the text behind an entity or character reference
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RustySheetMergeError>;
}

impl XmlTextContextHelper for String {
    fn push_bytes_ref(&mut self, bytes: &BytesRef) -> Result<(), RustySheetMergeError> {
        let raw = bytes.xml_content()?;
        if let Some(number) = raw.strip_prefix('#') {
            let code = match number.strip_prefix('x') {
                Some(hex) => u32::from_str_radix(hex, 16)?,
                None => number.parse::<u32>()?,
            };
            if let Some(character) = char::from_u32(code) {
                self.push(character);
            }
        } else if let Some(entity) = resolve_xml_entity(&raw) {
            self.push_str(entity);
        } else {
            Err(XmlError::ParseEntityError(raw.to_string()))?;
        }
        Ok(())
    }
}

/// Drives an [`XmlReader`] to the end of the document, dispatching every
/// event to the given match arms. Unmatched events are ignored.
#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(result) = $reader.next()? {
            match result {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::match_xml_events;
    use quick_xml::name::QName;

    fn collect_text(xml: &str) -> Result<String, RustySheetMergeError> {
        let mut reader = XmlReader::new(xml.as_bytes());
        let mut text = String::new();
        match_xml_events!(reader => {
            Event::Text(event) => text.push_str(&event.xml_content()?),
            Event::GeneralRef(event) => text.push_bytes_ref(&event)?,
        });
        Ok(text)
    }

    #[test]
    fn resolves_entities_and_character_references() {
        let text = collect_text("<t>a &amp; b &#8470; &#x41;</t>").unwrap();
        assert_eq!(text, "a & b № A");
    }

    #[test]
    fn rejects_unknown_entity() {
        assert!(collect_text("<t>&bogus;</t>").is_err());
    }

    #[test]
    fn reads_attribute_values() -> Result<(), RustySheetMergeError> {
        let mut reader = XmlReader::new(r#"<c r="B3" t="s"/>"#.as_bytes());
        let mut found = None;
        match_xml_events!(reader => {
            Event::Start(event) if event.name() == QName(b"c") => {
                found = event.get_attribute_value("r")?.map(|value| value.to_string());
            }
        });
        assert_eq!(found.as_deref(), Some("B3"));
        Ok(())
    }
}
