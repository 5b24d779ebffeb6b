// src/parser/mod.rs

//! Forward-only XML record parser.
//!
//! Turns the start/end/text event stream of a feed into a lazy sequence of
//! records. What happens at each tag is decided by a [`FieldPolicy`]; how
//! captured values become a record is decided by a [`RecordAssembler`].
//!
//! The document is never materialized: each captured field is read with
//! "read to next end tag" semantics and the accumulator is handed back to the
//! assembler whenever a boundary tag closes.

pub mod alerts;
pub mod forecast;

use std::collections::HashMap;
use std::io::BufRead;

use chrono::NaiveDateTime;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{AppError, Result};

/// Timestamp layout used by every CWA datastore feed.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What to do when a tag opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldAction {
    /// Capture the element text as a string field
    Text,
    /// Capture the element text as a timestamp in the given `strftime` layout
    Timestamp(&'static str),
    /// Capture the element text as one more entry of a repeated list
    ListItem,
    /// Closing this tag finalizes the in-progress record
    Boundary,
}

/// A value read from one element, converted according to its [`FieldAction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Timestamp(NaiveDateTime),
    ListItem(String),
}

impl FieldAction {
    /// Convert the raw element text for `tag`.
    fn capture(self, tag: &str, text: String) -> Result<FieldValue> {
        match self {
            Self::Text => Ok(FieldValue::Text(text)),
            Self::ListItem => Ok(FieldValue::ListItem(text)),
            Self::Timestamp(format) => parse_timestamp(tag, &text, format).map(FieldValue::Timestamp),
            Self::Boundary => Err(AppError::parse(tag, text, "boundary tags carry no value")),
        }
    }
}

/// Mapping from tag name to the action taken for it.
///
/// Tags without an entry are skipped; feeds may grow new fields at any time.
#[derive(Debug, Clone, Default)]
pub struct FieldPolicy {
    actions: HashMap<&'static str, FieldAction>,
}

impl FieldPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(self, tag: &'static str) -> Self {
        self.with(tag, FieldAction::Text)
    }

    pub fn timestamp(self, tag: &'static str, format: &'static str) -> Self {
        self.with(tag, FieldAction::Timestamp(format))
    }

    pub fn list_item(self, tag: &'static str) -> Self {
        self.with(tag, FieldAction::ListItem)
    }

    pub fn boundary(self, tag: &'static str) -> Self {
        self.with(tag, FieldAction::Boundary)
    }

    fn with(mut self, tag: &'static str, action: FieldAction) -> Self {
        self.actions.insert(tag, action);
        self
    }

    pub fn action(&self, tag: &str) -> Option<FieldAction> {
        self.actions.get(tag).copied()
    }

    pub fn is_boundary(&self, tag: &str) -> bool {
        self.action(tag) == Some(FieldAction::Boundary)
    }
}

/// Per-feed accumulator that receives captured fields and emits records.
pub trait RecordAssembler {
    type Record;

    /// The tag actions this assembler expects.
    fn policy(&self) -> FieldPolicy;

    /// Whether `tag` should be captured in the current state.
    ///
    /// Returning `false` skips the tag like an unknown one.
    fn wants(&self, _tag: &str) -> bool {
        true
    }

    /// Store one captured value in the in-progress record.
    fn capture(&mut self, tag: &str, value: FieldValue) -> Result<()>;

    /// Finalize the in-progress record when `boundary` closes and start a fresh one.
    fn finish(&mut self, boundary: &str) -> Result<Option<Self::Record>>;
}

/// Owned view of the parser events we act on.
enum Step {
    Open(String),
    Close(String),
    End,
    Skip,
}

/// Lazy, single-pass iterator over the records of one feed document.
///
/// Stops for good after end-of-document or the first error.
pub struct RecordParser<R: BufRead, A: RecordAssembler> {
    reader: Reader<R>,
    policy: FieldPolicy,
    assembler: A,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead, A: RecordAssembler> RecordParser<R, A> {
    pub fn new(input: R, assembler: A) -> Self {
        let mut reader = Reader::from_reader(input);
        // `<contentText/>` behaves like `<contentText></contentText>`
        reader.config_mut().expand_empty_elements = true;

        Self {
            reader,
            policy: assembler.policy(),
            assembler,
            buf: Vec::new(),
            done: false,
        }
    }

    fn next_step(&mut self) -> Result<Step> {
        self.buf.clear();
        let step = match self.reader.read_event_into(&mut self.buf)? {
            Event::Start(start) => Step::Open(tag_name(start.local_name().as_ref())),
            Event::End(end) => Step::Close(tag_name(end.local_name().as_ref())),
            Event::Eof => Step::End,
            _ => Step::Skip,
        };
        Ok(step)
    }

    fn advance(&mut self) -> Result<Option<A::Record>> {
        loop {
            match self.next_step()? {
                Step::Open(tag) => {
                    let Some(action) = self.policy.action(&tag) else {
                        log::trace!("Skipping unmapped <{}>", tag);
                        continue;
                    };
                    if action == FieldAction::Boundary || !self.assembler.wants(&tag) {
                        continue;
                    }

                    let text = read_text(&mut self.reader, &mut self.buf, &tag)?;
                    let value = action.capture(&tag, text)?;
                    self.assembler.capture(&tag, value)?;
                }
                Step::Close(tag) => {
                    if self.policy.is_boundary(&tag) {
                        if let Some(record) = self.assembler.finish(&tag)? {
                            return Ok(Some(record));
                        }
                    }
                }
                Step::End => return Ok(None),
                Step::Skip => {}
            }
        }
    }
}

impl<R: BufRead, A: RecordAssembler> Iterator for RecordParser<R, A> {
    type Item = Result<A::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.advance() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Read the text of the element `tag` up to its end tag.
///
/// The element must hold text only; a child element is a contract violation.
fn read_text<R: BufRead>(reader: &mut Reader<R>, buf: &mut Vec<u8>, tag: &str) -> Result<String> {
    let mut text = String::new();

    loop {
        buf.clear();
        match reader.read_event_into(buf)? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::End(_) => return Ok(text),
            Event::Start(child) => {
                let child = tag_name(child.local_name().as_ref());
                return Err(AppError::parse(
                    tag,
                    text,
                    format!("expected text, found <{child}>"),
                ));
            }
            Event::Eof => {
                return Err(AppError::parse(tag, text, "document ended inside element"));
            }
            _ => {}
        }
    }
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Parse a feed timestamp; a mismatch means the feed contract changed.
pub fn parse_timestamp(field: &str, text: &str, format: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), format)
        .map_err(|e| AppError::parse(field, text, e))
}

/// Parse an integer element value.
pub fn parse_int(field: &str, text: &str) -> Result<i32> {
    text.trim()
        .parse::<i32>()
        .map_err(|e| AppError::parse(field, text, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collects `<name>` and `<tag>` values per `<item>`.
    #[derive(Default)]
    struct ItemAssembler {
        name: String,
        tags: Vec<String>,
    }

    impl RecordAssembler for ItemAssembler {
        type Record = (String, Vec<String>);

        fn policy(&self) -> FieldPolicy {
            FieldPolicy::new()
                .text("name")
                .list_item("tag")
                .boundary("item")
        }

        fn capture(&mut self, tag: &str, value: FieldValue) -> Result<()> {
            match value {
                FieldValue::Text(text) if tag == "name" => self.name = text,
                FieldValue::ListItem(text) => self.tags.push(text),
                _ => {}
            }
            Ok(())
        }

        fn finish(&mut self, _boundary: &str) -> Result<Option<Self::Record>> {
            let name = std::mem::take(&mut self.name);
            let tags = std::mem::take(&mut self.tags);
            Ok(Some((name, tags)))
        }
    }

    fn parse(xml: &str) -> Vec<Result<(String, Vec<String>)>> {
        RecordParser::new(xml.as_bytes(), ItemAssembler::default()).collect()
    }

    #[test]
    fn test_records_in_document_order() {
        let xml = r#"<root>
            <item><name>a</name><tag>x</tag><tag>y</tag></item>
            <item><name>b</name></item>
        </root>"#;

        let records: Vec<_> = parse(xml).into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(
            records,
            vec![
                ("a".to_string(), vec!["x".to_string(), "y".to_string()]),
                ("b".to_string(), vec![]),
            ]
        );
    }

    #[test]
    fn test_unknown_tags_are_skipped() {
        let xml = "<root><item><extra><deep>1</deep></extra><name>a</name></item></root>";
        let records = parse(xml);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].as_ref().unwrap().0, "a");
    }

    #[test]
    fn test_namespaced_feed() {
        let xml = r#"<cwa xmlns="urn:cwa:gov:tw:cwacommon:0.1"><item><name>a</name></item></cwa>"#;
        assert_eq!(parse(xml).len(), 1);
    }

    #[test]
    fn test_empty_element_and_entities() {
        let xml = "<root><item><name/></item><item><name>a &amp; b</name></item></root>";
        let records: Vec<_> = parse(xml).into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(records[0].0, "");
        assert_eq!(records[1].0, "a & b");
    }

    #[test]
    fn test_cdata_text() {
        let xml = "<root><item><name><![CDATA[<b>]]></name></item></root>";
        assert_eq!(parse(xml)[0].as_ref().unwrap().0, "<b>");
    }

    #[test]
    fn test_child_in_text_field_is_error() {
        let xml = "<root><item><name><b>a</b></name></item></root>";
        let records = parse(xml);
        assert_eq!(records.len(), 1);
        assert!(matches!(records[0], Err(AppError::Parse { .. })));
    }

    #[test]
    fn test_stops_after_error() {
        let xml = "<root><item><name>a</name></item><item><name>b</wrong></item></root>";
        let mut parser = RecordParser::new(xml.as_bytes(), ItemAssembler::default());
        assert!(parser.next().unwrap().is_ok());
        assert!(parser.next().unwrap().is_err());
        assert!(parser.next().is_none());
    }

    #[test]
    fn test_no_records() {
        assert!(parse("<root></root>").is_empty());
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("issueTime", " 2024-07-24 08:30:00 ", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(ts.to_string(), "2024-07-24 08:30:00");
        assert!(parse_timestamp("issueTime", "2024/07/24", TIMESTAMP_FORMAT).is_err());
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("value", " 27 ").unwrap(), 27);
        assert!(matches!(
            parse_int("value", "N/A"),
            Err(AppError::Parse { .. })
        ));
    }
}
