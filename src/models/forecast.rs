//! Short-term (3-hourly) forecast aggregate.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Weather phenomenon for one forecast slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weather {
    /// Two-digit phenomenon code, e.g. "04"
    pub code: String,

    /// Human-readable phenomenon, e.g. "多雲"
    pub description: String,
}

impl Weather {
    pub fn new(code: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            description: description.into(),
        }
    }

    /// Name of the daytime icon asset for this phenomenon code.
    pub fn icon_name(&self) -> String {
        format!("weather_day_{}", self.code)
    }
}

/// Forecast for one location as parallel sequences keyed by `times`.
///
/// Once fully assembled every sequence has `times.len()` entries.
/// Anything else counts as incomplete and callers treat it as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortForecast {
    pub times: Vec<NaiveDateTime>,
    /// Temperature in °C
    pub temperature: Vec<i32>,
    pub weather: Vec<Weather>,
    /// Apparent temperature in °C
    pub apparent_temperature: Vec<i32>,
    /// Probability of precipitation in percent, expanded to 3-hour slots
    pub precipitation_probability: Vec<i32>,
    /// Relative humidity in percent
    pub relative_humidity: Vec<i32>,
}

/// One row of a complete forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastSlot<'a> {
    pub time: NaiveDateTime,
    pub temperature: i32,
    pub weather: &'a Weather,
    pub apparent_temperature: i32,
    pub precipitation_probability: i32,
    pub relative_humidity: i32,
}

impl ShortForecast {
    /// Number of observation times.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Whether every sequence lines up with `times`.
    pub fn is_complete(&self) -> bool {
        let n = self.times.len();
        n > 0
            && self.temperature.len() == n
            && self.weather.len() == n
            && self.apparent_temperature.len() == n
            && self.precipitation_probability.len() == n
            && self.relative_humidity.len() == n
    }

    /// Zip the parallel sequences into rows. Empty for an incomplete forecast.
    pub fn slots(&self) -> Vec<ForecastSlot<'_>> {
        if !self.is_complete() {
            return Vec::new();
        }

        (0..self.len())
            .map(|i| ForecastSlot {
                time: self.times[i],
                temperature: self.temperature[i],
                weather: &self.weather[i],
                apparent_temperature: self.apparent_temperature[i],
                precipitation_probability: self.precipitation_probability[i],
                relative_humidity: self.relative_humidity[i],
            })
            .collect()
    }

    /// Group slots by calendar date, keeping feed order.
    pub fn days(&self) -> Vec<(NaiveDate, Vec<ForecastSlot<'_>>)> {
        let mut days: Vec<(NaiveDate, Vec<ForecastSlot<'_>>)> = Vec::new();

        for slot in self.slots() {
            let date = slot.time.date();
            match days.last_mut() {
                Some((day, slots)) if *day == date => slots.push(slot),
                _ => days.push((date, vec![slot])),
            }
        }
        days
    }
}
