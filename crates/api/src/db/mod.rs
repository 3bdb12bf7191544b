mod snapshot;
mod sqlite;

pub use snapshot::*;
pub use sqlite::*;

use async_trait::async_trait;
use serde::{
    ser::{SerializeMap, SerializeSeq},
    Serialize, Serializer,
};
use time::{macros::format_description, Date, Duration};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to query sqlite: {0}")]
    Query(#[from] sqlx::Error),
    #[error("Failed to parse date string: {0}")]
    DateParse(#[from] time::error::Parse),
    #[error("Date is not YYYY-MM-DD: {0:?}")]
    MalformedDate(String),
    #[error("Dataset has no measurements")]
    EmptyDataset,
    #[error("Dataset is missing table: {0}")]
    MissingTable(String),
    #[error("Date window falls outside the supported calendar range")]
    DateOutOfRange,
}

/// Parse a `YYYY-MM-DD` calendar date with a year from 0001 to 9999.
pub fn parse_date(value: &str) -> Result<Date, Error> {
    if !is_iso_date_shape(value) {
        return Err(Error::MalformedDate(value.to_string()));
    }
    let date = Date::parse(value, format_description!("[year]-[month]-[day]"))?;
    if date.year() < 1 {
        return Err(Error::MalformedDate(value.to_string()));
    }
    Ok(date)
}

// `[year]` alone would also take a leading sign
fn is_iso_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// Format a date the way the `measurement.date` column stores it.
pub fn format_date(date: Date) -> String {
    // Display is zero-padded YYYY-MM-DD for years 0-9999
    date.to_string()
}

/// Inclusive range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Date,
    pub end: Date,
}

impl DateWindow {
    /// Window of `days` days ending at `end`.
    pub fn trailing(end: Date, days: i64) -> Result<Self, Error> {
        let start = end
            .checked_sub(Duration::days(days))
            .ok_or(Error::DateOutOfRange)?;
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Bounds of a temperature aggregate; `end` of `None` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateBounds {
    pub start: Date,
    pub end: Option<Date>,
}

/// A single precipitation reading, serialized as `{ "<date>": <prcp> }`.
#[derive(Debug, Clone, PartialEq)]
pub struct PrecipitationReading {
    pub date: String,
    pub prcp: Option<f64>,
}

impl Serialize for PrecipitationReading {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.date, &self.prcp)?;
        map.end()
    }
}

/// Min/avg/max temperature over a date range, serialized as `[min, avg, max]`.
///
/// Each value is `None` when no rows matched.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TemperatureSummary {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

impl TemperatureSummary {
    /// Build a summary with every value rounded to 2 decimal places.
    pub fn rounded(min: Option<f64>, avg: Option<f64>, max: Option<f64>) -> Self {
        Self {
            min: min.map(round_hundredths),
            avg: avg.map(round_hundredths),
            max: max.map(round_hundredths),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.avg.is_none() && self.max.is_none()
    }
}

impl Serialize for TemperatureSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(3))?;
        seq.serialize_element(&self.min)?;
        seq.serialize_element(&self.avg)?;
        seq.serialize_element(&self.max)?;
        seq.end()
    }
}

// Halves go to the even neighbour
fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round_ties_even() / 100.0
}

#[async_trait]
pub trait ClimateData: Sync + Send {
    /// Most recent observation date; `None` for an empty dataset.
    async fn latest_date(&self) -> Result<Option<Date>, Error>;
    /// Station with the most non-null precipitation readings.
    async fn most_active_station(&self) -> Result<Option<String>, Error>;
    async fn precipitation(&self, window: &DateWindow) -> Result<Vec<PrecipitationReading>, Error>;
    async fn stations(&self) -> Result<Vec<String>, Error>;
    async fn temperature_observations(
        &self,
        station: &str,
        window: &DateWindow,
    ) -> Result<Vec<f64>, Error>;
    async fn temperature_summary(&self, bounds: &DateBounds) -> Result<TemperatureSummary, Error>;
}
