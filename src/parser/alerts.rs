//! Decoder for the weather alert datastore feed (W-C0033-002).
//!
//! One [`Alert`] per `<record>`, in feed order.

use std::io::BufRead;
use std::mem;

use chrono::NaiveDateTime;

use crate::error::{AppError, Result};
use crate::models::Alert;
use crate::parser::{FieldPolicy, FieldValue, RecordAssembler, RecordParser, TIMESTAMP_FORMAT};

/// Tag actions for the alert feed.
pub fn alert_policy() -> FieldPolicy {
    FieldPolicy::new()
        .text("datasetDescription")
        .timestamp("issueTime", TIMESTAMP_FORMAT)
        .timestamp("endTime", TIMESTAMP_FORMAT)
        .text("contentText")
        .boundary("record")
}

/// Fields seen so far inside the current `<record>`.
#[derive(Debug, Default)]
struct AlertBuilder {
    description: Option<String>,
    issue_time: Option<NaiveDateTime>,
    end_time: Option<NaiveDateTime>,
    content: Option<String>,
}

impl AlertBuilder {
    fn build(self) -> Result<Alert> {
        Ok(Alert {
            description: required("datasetDescription", self.description)?,
            issue_time: required("issueTime", self.issue_time)?,
            end_time: required("endTime", self.end_time)?,
            content: required("contentText", self.content)?,
        })
    }
}

fn required<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| AppError::parse(field, "", "missing from <record>"))
}

/// Assembles one [`Alert`] per `<record>` element.
#[derive(Debug, Default)]
pub struct AlertAssembler {
    current: AlertBuilder,
}

impl RecordAssembler for AlertAssembler {
    type Record = Alert;

    fn policy(&self) -> FieldPolicy {
        alert_policy()
    }

    fn capture(&mut self, tag: &str, value: FieldValue) -> Result<()> {
        match (tag, value) {
            ("datasetDescription", FieldValue::Text(text)) => self.current.description = Some(text),
            ("issueTime", FieldValue::Timestamp(ts)) => self.current.issue_time = Some(ts),
            ("endTime", FieldValue::Timestamp(ts)) => self.current.end_time = Some(ts),
            ("contentText", FieldValue::Text(text)) => {
                self.current.content = Some(text.trim().to_string())
            }
            (tag, value) => log::trace!("Ignoring <{}> = {:?}", tag, value),
        }
        Ok(())
    }

    fn finish(&mut self, _boundary: &str) -> Result<Option<Alert>> {
        mem::take(&mut self.current).build().map(Some)
    }
}

/// Lazily iterate the alerts of a feed document.
pub fn alert_records<R: BufRead>(input: R) -> RecordParser<R, AlertAssembler> {
    RecordParser::new(input, AlertAssembler::default())
}

/// Decode every alert of a feed document. An empty feed yields an empty list.
pub fn decode_alerts<R: BufRead>(input: R) -> Result<Vec<Alert>> {
    alert_records(input).collect()
}

/// Decode alerts from feed text already in memory.
pub fn parse_alerts(xml: &str) -> Result<Vec<Alert>> {
    decode_alerts(xml.as_bytes())
}
