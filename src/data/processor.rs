//! Data Processor Module
//! Parses the report timestamp and derives the Day / Month / Hour columns.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use polars::prelude::*;
use rayon::prelude::*;
use thiserror::Error;

use super::columns;

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Timestamp column `{0}` not found")]
    MissingTimestampColumn(String),
    #[error("Row {row}: cannot parse timestamp {value:?}")]
    InvalidTimestamp { row: usize, value: Option<String> },
}

/// Timestamp layouts that carry a UTC offset.
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%#z",
    "%Y/%m/%d %H:%M:%S%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
    "%Y/%m/%d %H:%M:%S%.f%#z",
];

/// Timestamp layouts without an offset.
const NAIVE_FORMATS: [&str; 8] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %I:%M:%S %p",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Calendar parts extracted from one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts {
    pub day: i32,
    pub month: i32,
    pub hour: i32,
}

impl From<NaiveDateTime> for DateParts {
    fn from(ts: NaiveDateTime) -> Self {
        Self {
            day: ts.day() as i32,
            month: ts.month() as i32,
            hour: ts.hour() as i32,
        }
    }
}

/// Handles timestamp parsing and derived column creation.
pub struct DataProcessor;

impl DataProcessor {
    /// Parse a report timestamp. Offset-bearing values are normalised to UTC.
    pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
        let s = raw.trim();
        if s.is_empty() {
            return None;
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_utc());
        }
        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
                return Some(dt.naive_utc());
            }
        }
        for fmt in NAIVE_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
        }
        DATE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    /// Parse every value of the timestamp column in parallel.
    ///
    /// Fails on the first (lowest index) null or unparseable row.
    pub fn parse_column(df: &DataFrame, column: &str) -> Result<Vec<DateParts>, ProcessorError> {
        let Ok(raw) = df.column(column) else {
            return Err(ProcessorError::MissingTimestampColumn(column.to_string()));
        };
        let as_text = raw.cast(&DataType::String)?;
        let values: Vec<Option<&str>> = as_text.str()?.into_iter().collect();

        let parsed: Vec<Option<DateParts>> = values
            .par_iter()
            .map(|v| v.and_then(Self::parse_timestamp).map(DateParts::from))
            .collect();

        parsed
            .into_iter()
            .enumerate()
            .map(|(row, parts)| {
                parts.ok_or_else(|| ProcessorError::InvalidTimestamp {
                    row,
                    value: values[row].map(str::to_string),
                })
            })
            .collect()
    }

    /// Append the derived Day, Month and Hour columns to the table.
    pub fn derive_date_parts(df: &mut DataFrame) -> Result<(), ProcessorError> {
        let parts = Self::parse_column(df, columns::REPORTED_DATE)?;

        let days: Vec<i32> = parts.iter().map(|p| p.day).collect();
        let months: Vec<i32> = parts.iter().map(|p| p.month).collect();
        let hours: Vec<i32> = parts.iter().map(|p| p.hour).collect();

        df.with_column(Column::new(columns::DAY.into(), days))?;
        df.with_column(Column::new(columns::MONTH.into(), months))?;
        df.with_column(Column::new(columns::HOUR.into(), hours))?;

        tracing::debug!(rows = df.height(), "derived Day/Month/Hour columns");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rfc3339_with_millis() {
        let ts = DataProcessor::parse_timestamp("2014-06-20T10:55:00.000Z").unwrap();
        assert_eq!(DateParts::from(ts), DateParts { day: 20, month: 6, hour: 10 });
    }

    #[test]
    fn test_parse_slash_date_with_short_offset() {
        let ts = DataProcessor::parse_timestamp("2016/01/03 05:00:00+00").unwrap();
        assert_eq!(DateParts::from(ts), DateParts { day: 3, month: 1, hour: 5 });
    }

    #[test]
    fn test_offset_is_normalised_to_utc() {
        let ts = DataProcessor::parse_timestamp("2017-03-31T22:30:00-05:00").unwrap();
        assert_eq!(DateParts::from(ts), DateParts { day: 1, month: 4, hour: 3 });
    }

    #[test]
    fn test_parse_naive_and_date_only() {
        let ts = DataProcessor::parse_timestamp("2018-12-01 23:15:00").unwrap();
        assert_eq!(DateParts::from(ts), DateParts { day: 1, month: 12, hour: 23 });

        let ts = DataProcessor::parse_timestamp("2015-02-28").unwrap();
        assert_eq!(DateParts::from(ts), DateParts { day: 28, month: 2, hour: 0 });

        let ts = DataProcessor::parse_timestamp("7/4/2015 1:05:00 PM").unwrap();
        assert_eq!(DateParts::from(ts), DateParts { day: 4, month: 7, hour: 13 });
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(DataProcessor::parse_timestamp("").is_none());
        assert!(DataProcessor::parse_timestamp("yesterday").is_none());
        assert!(DataProcessor::parse_timestamp("2014-13-40").is_none());
    }

    #[test]
    fn test_derive_appends_columns() {
        let mut df = DataFrame::new(vec![Column::new(
            columns::REPORTED_DATE.into(),
            vec!["2014-01-02T03:00:00.000Z", "2015-11-30T23:59:59.000Z"],
        )])
        .unwrap();

        DataProcessor::derive_date_parts(&mut df).unwrap();

        let day: Vec<Option<i32>> = df.column(columns::DAY).unwrap().i32().unwrap().into_iter().collect();
        let month: Vec<Option<i32>> = df.column(columns::MONTH).unwrap().i32().unwrap().into_iter().collect();
        let hour: Vec<Option<i32>> = df.column(columns::HOUR).unwrap().i32().unwrap().into_iter().collect();
        assert_eq!(day, vec![Some(2), Some(30)]);
        assert_eq!(month, vec![Some(1), Some(11)]);
        assert_eq!(hour, vec![Some(3), Some(23)]);
    }

    #[test]
    fn test_first_bad_row_is_reported() {
        let mut df = DataFrame::new(vec![Column::new(
            columns::REPORTED_DATE.into(),
            vec![Some("2014-01-02"), None, Some("not a date")],
        )])
        .unwrap();

        match DataProcessor::derive_date_parts(&mut df) {
            Err(ProcessorError::InvalidTimestamp { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, None);
            }
            other => panic!("expected InvalidTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_timestamp_column() {
        let mut df = DataFrame::new(vec![Column::new("MCI".into(), vec!["Assault"])]).unwrap();
        assert!(matches!(
            DataProcessor::derive_date_parts(&mut df),
            Err(ProcessorError::MissingTimestampColumn(_))
        ));
    }
}
