//! Decoder for the township 3-hourly forecast feeds (F-D0047-xxx).
//!
//! Each `<weatherElement>` carries one element name and a run of `<value>`s.
//! The parser yields one [`ElementBlock`] per element; the blocks are then
//! folded into a single [`ShortForecast`].

use std::io::BufRead;
use std::mem;

use chrono::NaiveDateTime;

use crate::error::Result;
use crate::models::{ShortForecast, Weather};
use crate::parser::{
    FieldPolicy, FieldValue, RecordAssembler, RecordParser, TIMESTAMP_FORMAT, parse_int,
};

/// Element whose `<dataTime>` entries define the forecast time axis.
const TIME_AXIS_ELEMENT: &str = "T";

/// Tag actions for the forecast feed.
pub fn forecast_policy() -> FieldPolicy {
    FieldPolicy::new()
        .text("elementName")
        .timestamp("dataTime", TIMESTAMP_FORMAT)
        .list_item("value")
        .boundary("weatherElement")
}

/// Raw contents of one `<weatherElement>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementBlock {
    pub name: String,
    /// `<dataTime>` entries, only collected for the time-axis element
    pub times: Vec<NaiveDateTime>,
    pub values: Vec<String>,
}

/// Assembles one [`ElementBlock`] per `<weatherElement>`.
#[derive(Debug, Default)]
pub struct ForecastAssembler {
    current: ElementBlock,
}

impl RecordAssembler for ForecastAssembler {
    type Record = ElementBlock;

    fn policy(&self) -> FieldPolicy {
        forecast_policy()
    }

    fn wants(&self, tag: &str) -> bool {
        // Every element repeats the time axis; keep only one copy of it.
        tag != "dataTime" || self.current.name == TIME_AXIS_ELEMENT
    }

    fn capture(&mut self, tag: &str, value: FieldValue) -> Result<()> {
        match value {
            FieldValue::Text(name) => self.current.name = name.trim().to_string(),
            FieldValue::Timestamp(time) => self.current.times.push(time),
            FieldValue::ListItem(value) => self.current.values.push(value),
        }
        log::trace!("Captured <{}> in element {}", tag, self.current.name);
        Ok(())
    }

    fn finish(&mut self, _boundary: &str) -> Result<Option<ElementBlock>> {
        Ok(Some(mem::take(&mut self.current)))
    }
}

impl ShortForecast {
    /// Apply one element's values to the aggregate.
    ///
    /// Unknown element names are dropped.
    pub fn apply_block(&mut self, block: ElementBlock) -> Result<()> {
        let ElementBlock {
            name,
            times,
            values,
        } = block;

        match name.as_str() {
            "T" => {
                self.temperature = parse_ints(&name, &values)?;
                self.times = times;
            }
            // Values arrive as (description, code) pairs. A lone trailing
            // value serves as both.
            "Wx" => {
                self.weather = values
                    .chunks(2)
                    .map(|pair| {
                        let (description, code) = (&pair[0], &pair[pair.len() - 1]);
                        Weather::new(code.trim(), description.trim())
                    })
                    .collect();
            }
            "AT" => self.apparent_temperature = parse_ints(&name, &values)?,
            // One value per 6 hours covers two 3-hour slots.
            "PoP6h" => {
                self.precipitation_probability = parse_ints(&name, &values)?
                    .into_iter()
                    .flat_map(|p| [p, p])
                    .collect();
            }
            "RH" => self.relative_humidity = parse_ints(&name, &values)?,
            other => log::debug!("Ignoring weather element {} ({} values)", other, values.len()),
        }
        Ok(())
    }
}

fn parse_ints(element: &str, values: &[String]) -> Result<Vec<i32>> {
    values.iter().map(|v| parse_int(element, v)).collect()
}

/// Lazily iterate the weather elements of a forecast document.
pub fn element_blocks<R: BufRead>(input: R) -> RecordParser<R, ForecastAssembler> {
    RecordParser::new(input, ForecastAssembler::default())
}

/// Decode a forecast document into one aggregate.
///
/// The result may be incomplete (see [`ShortForecast::is_complete`]) when the
/// feed lacks one of the expected elements.
pub fn decode_short_forecast<R: BufRead>(input: R) -> Result<ShortForecast> {
    let mut forecast = ShortForecast::default();
    for block in element_blocks(input) {
        forecast.apply_block(block?)?;
    }
    Ok(forecast)
}

/// Decode a forecast from feed text already in memory.
pub fn parse_short_forecast(xml: &str) -> Result<ShortForecast> {
    decode_short_forecast(xml.as_bytes())
}
