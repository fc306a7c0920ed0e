//! The assembled weather table and its canonical schema.

use crate::transform::WeatherRecord;
use chrono::{DateTime, NaiveDateTime, Utc};
use polars::prelude::*;
use std::collections::HashMap;
use thiserror::Error;

/// The fixed column set of every weather table, in contract order. This order
/// is external: both the parquet snapshot and the SQL insert list follow it.
pub const CANONICAL_COLUMNS: [&str; 5] = [
    "snapshot_time",
    "latitude",
    "longitude",
    "temperature",
    "wind_speed",
];

/// The natural key of a weather row, in the order the loader matches on.
pub const KEY_COLUMNS: [&str; 3] = ["latitude", "longitude", "snapshot_time"];

#[derive(Debug, Error)]
pub enum TableError {
    #[error("invalid snapshot_time '{value}'")]
    TimestampParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("failed to build the weather table")]
    Build(#[from] PolarsError),

    #[error("null value in column '{column}' at row {row}")]
    NullValue { column: &'static str, row: usize },

    #[error("snapshot_time at row {row} is outside the representable range")]
    TimestampRange { row: usize },
}

/// One fully typed row, as handed to the upsert loader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRow {
    pub snapshot_time: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub wind_speed: f64,
}

/// A wrapper around a Polars `DataFrame` holding assembled weather rows.
///
/// The frame always carries exactly the [`CANONICAL_COLUMNS`] in canonical
/// order — `snapshot_time` as a millisecond Datetime, everything else as
/// Float64 — even when empty. Rows are unique on [`KEY_COLUMNS`].
#[derive(Debug, Clone)]
pub struct WeatherTable {
    /// The underlying Polars DataFrame.
    pub frame: DataFrame,
}

impl WeatherTable {
    /// Collects transformed records into a typed table.
    ///
    /// Timestamps are parsed as RFC 3339 and normalized to UTC; a record whose
    /// `snapshot_time` does not parse fails the whole build. Records sharing a
    /// natural key collapse to one row: the last record wins, keeping the
    /// first occurrence's position.
    pub fn from_records(records: Vec<WeatherRecord>) -> Result<Self, TableError> {
        let mut rows: Vec<(i64, WeatherRecord)> = Vec::with_capacity(records.len());
        let mut seen: HashMap<(i64, u64, u64), usize> = HashMap::with_capacity(records.len());

        for record in records {
            let parsed = DateTime::parse_from_rfc3339(&record.snapshot_time).map_err(|e| {
                TableError::TimestampParse {
                    value: record.snapshot_time.clone(),
                    source: e,
                }
            })?;
            let millis = parsed.with_timezone(&Utc).timestamp_millis();
            let key = (
                millis,
                record.latitude.to_bits(),
                record.longitude.to_bits(),
            );
            match seen.get(&key) {
                Some(&index) => rows[index] = (millis, record),
                None => {
                    seen.insert(key, rows.len());
                    rows.push((millis, record));
                }
            }
        }

        let mut snapshot_times = Vec::with_capacity(rows.len());
        let mut latitudes = Vec::with_capacity(rows.len());
        let mut longitudes = Vec::with_capacity(rows.len());
        let mut temperatures = Vec::with_capacity(rows.len());
        let mut wind_speeds = Vec::with_capacity(rows.len());
        for (millis, record) in rows {
            snapshot_times.push(millis);
            latitudes.push(record.latitude);
            longitudes.push(record.longitude);
            temperatures.push(record.temperature);
            wind_speeds.push(record.wind_speed);
        }

        let snapshot_time = Column::new("snapshot_time".into(), snapshot_times)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;
        let frame = DataFrame::new(vec![
            snapshot_time,
            Column::new("latitude".into(), latitudes),
            Column::new("longitude".into(), longitudes),
            Column::new("temperature".into(), temperatures),
            Column::new("wind_speed".into(), wind_speeds),
        ])?;

        Ok(Self { frame })
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Extracts the frame's rows as typed values for the loader.
    ///
    /// Null key or measurement values violate the table invariant and fail the
    /// extraction.
    pub fn rows(&self) -> Result<Vec<TableRow>, TableError> {
        let snapshot_time = self.frame.column("snapshot_time")?.datetime()?;
        let latitude = self.frame.column("latitude")?.f64()?;
        let longitude = self.frame.column("longitude")?.f64()?;
        let temperature = self.frame.column("temperature")?.f64()?;
        let wind_speed = self.frame.column("wind_speed")?.f64()?;

        let get = |column: &ChunkedArray<Float64Type>,
                   name: &'static str,
                   row: usize|
         -> Result<f64, TableError> {
            column
                .get(row)
                .ok_or(TableError::NullValue { column: name, row })
        };

        let mut rows = Vec::with_capacity(self.frame.height());
        for row in 0..self.frame.height() {
            let millis = snapshot_time.get(row).ok_or(TableError::NullValue {
                column: "snapshot_time",
                row,
            })?;
            let snapshot_time = DateTime::from_timestamp_millis(millis)
                .ok_or(TableError::TimestampRange { row })?
                .naive_utc();
            rows.push(TableRow {
                snapshot_time,
                latitude: get(latitude, "latitude", row)?,
                longitude: get(longitude, "longitude", row)?,
                temperature: get(temperature, "temperature", row)?,
                wind_speed: get(wind_speed, "wind_speed", row)?,
            });
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(ts: &str, lat: f64, lon: f64, temp: f64, wind: f64) -> WeatherRecord {
        WeatherRecord {
            snapshot_time: ts.to_string(),
            latitude: lat,
            longitude: lon,
            temperature: temp,
            wind_speed: wind,
        }
    }

    #[test]
    fn empty_table_still_has_canonical_schema() {
        let table = WeatherTable::from_records(vec![]).unwrap();
        assert_eq!(table.height(), 0);
        assert!(table.is_empty());
        assert_eq!(table.frame.get_column_names(), CANONICAL_COLUMNS);
        let dtype = table.frame.column("snapshot_time").unwrap().dtype().clone();
        assert!(matches!(
            dtype,
            DataType::Datetime(TimeUnit::Milliseconds, None)
        ));
        for name in &CANONICAL_COLUMNS[1..] {
            assert_eq!(
                table.frame.column(name).unwrap().dtype(),
                &DataType::Float64
            );
        }
    }

    #[test]
    fn normalizes_timestamps_to_datetime() {
        let table = WeatherTable::from_records(vec![record(
            "2024-11-22T10:00:00Z",
            40.7128,
            -74.006,
            21.5,
            5.2,
        )])
        .unwrap();
        assert_eq!(table.height(), 1);

        let rows = table.rows().unwrap();
        assert_eq!(
            rows[0].snapshot_time,
            DateTime::parse_from_rfc3339("2024-11-22T10:00:00Z")
                .unwrap()
                .naive_utc()
        );
        assert_eq!(rows[0].latitude, 40.7128);
        assert_eq!(rows[0].wind_speed, 5.2);
    }

    #[test]
    fn offset_timestamps_normalize_to_utc() {
        let table = WeatherTable::from_records(vec![record(
            "2024-11-22T12:00:00+02:00",
            1.0,
            2.0,
            3.0,
            4.0,
        )])
        .unwrap();
        let rows = table.rows().unwrap();
        assert_eq!(
            rows[0].snapshot_time,
            DateTime::parse_from_rfc3339("2024-11-22T10:00:00Z")
                .unwrap()
                .naive_utc()
        );
    }

    #[test]
    fn unparseable_timestamp_fails_the_whole_build() {
        let err = WeatherTable::from_records(vec![
            record("2024-11-22T10:00:00Z", 1.0, 2.0, 3.0, 4.0),
            record("not-a-timestamp", 1.0, 2.0, 3.0, 4.0),
        ])
        .unwrap_err();
        assert!(matches!(err, TableError::TimestampParse { .. }));
    }

    #[test]
    fn duplicate_keys_collapse_to_last_record() {
        let table = WeatherTable::from_records(vec![
            record("2024-11-22T10:00:00Z", 40.7128, -74.006, 21.5, 5.2),
            record("2024-11-22T11:00:00Z", 40.7128, -74.006, 20.9, 4.8),
            record("2024-11-22T10:00:00Z", 40.7128, -74.006, 22.0, 6.0),
        ])
        .unwrap();

        assert_eq!(table.height(), 2);
        let rows = table.rows().unwrap();
        // The duplicate kept its original position, with the later values.
        assert_eq!(rows[0].temperature, 22.0);
        assert_eq!(rows[0].wind_speed, 6.0);
        assert_eq!(rows[1].temperature, 20.9);
    }

    #[test]
    fn same_hour_for_different_locations_is_not_a_duplicate() {
        let table = WeatherTable::from_records(vec![
            record("2024-11-22T10:00:00Z", 40.7128, -74.006, 21.5, 5.2),
            record("2024-11-22T10:00:00Z", 52.52, 13.405, 9.1, 7.3),
        ])
        .unwrap();
        assert_eq!(table.height(), 2);
    }
}
