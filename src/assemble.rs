//! Computes the query window and drives fetch → transform → table.

use crate::error::EtlError;
use crate::fetch::TimelinesClient;
use crate::locations::Location;
use crate::table::WeatherTable;
use crate::transform::transform;
use chrono::{DateTime, Duration, SecondsFormat, Utc};
use log::info;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssembleError {
    #[error("invalid snapshot time '{value}'")]
    SnapshotTimeParse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

/// The history/forecast query window sent to the provider.
///
/// Deliberately asymmetric: a short look-back and a long look-forward around
/// the snapshot instant. Without a snapshot time the provider's relative
/// tokens are used so "now" is resolved server-side.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeWindow {
    start: String,
    end: String,
}

pub const DEFAULT_START: &str = "nowMinus1h";
pub const DEFAULT_END: &str = "nowPlus5d";

impl TimeWindow {
    /// The default window, expressed in the provider's relative-time tokens.
    pub fn relative_default() -> Self {
        Self {
            start: DEFAULT_START.to_string(),
            end: DEFAULT_END.to_string(),
        }
    }

    /// The absolute window `[snapshot − 1h, snapshot + 5d]`, rendered as
    /// ISO 8601 UTC timestamps.
    pub fn around(snapshot: DateTime<Utc>) -> Self {
        Self {
            start: (snapshot - Duration::hours(1)).to_rfc3339_opts(SecondsFormat::Secs, true),
            end: (snapshot + Duration::days(5)).to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Resolves an optional snapshot-time string into a window: absent means
    /// the relative default, present means parse-and-center.
    pub fn from_snapshot_time(snapshot_time: Option<&str>) -> Result<Self, AssembleError> {
        match snapshot_time {
            None => Ok(Self::relative_default()),
            Some(value) => {
                let parsed = DateTime::parse_from_rfc3339(value).map_err(|e| {
                    AssembleError::SnapshotTimeParse {
                        value: value.to_string(),
                        source: e,
                    }
                })?;
                Ok(Self::around(parsed.with_timezone(&Utc)))
            }
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }
}

/// Fetches every location over the window derived from `snapshot_time` and
/// assembles the transformed rows into a [`WeatherTable`].
///
/// All-or-nothing: the first fetch, decode or normalization failure aborts the
/// run with no table produced.
pub async fn assemble(
    client: &TimelinesClient,
    locations: &[Location],
    snapshot_time: Option<&str>,
) -> Result<WeatherTable, EtlError> {
    let window = TimeWindow::from_snapshot_time(snapshot_time)?;
    info!(
        "assembling weather table for {} locations over [{}, {}]",
        locations.len(),
        window.start(),
        window.end()
    );

    let intervals = client
        .fetch()
        .locations(locations)
        .start_time(window.start())
        .end_time(window.end())
        .call()
        .await?;

    let records = intervals
        .iter()
        .map(|(interval, location)| transform(interval, location))
        .collect();
    let table = WeatherTable::from_records(records)?;
    info!("assembled {} rows", table.height());
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_around_snapshot_is_one_hour_back_five_days_forward() {
        let window = TimeWindow::from_snapshot_time(Some("2024-01-10T00:00:00Z")).unwrap();
        assert_eq!(window.start(), "2024-01-09T23:00:00Z");
        assert_eq!(window.end(), "2024-01-15T00:00:00Z");
    }

    #[test]
    fn missing_snapshot_time_uses_relative_tokens() {
        let window = TimeWindow::from_snapshot_time(None).unwrap();
        assert_eq!(window.start(), "nowMinus1h");
        assert_eq!(window.end(), "nowPlus5d");
    }

    #[test]
    fn offset_snapshot_time_renders_utc() {
        let window = TimeWindow::from_snapshot_time(Some("2024-01-10T02:00:00+02:00")).unwrap();
        assert_eq!(window.start(), "2024-01-09T23:00:00Z");
        assert_eq!(window.end(), "2024-01-15T00:00:00Z");
    }

    #[test]
    fn garbage_snapshot_time_is_rejected() {
        let err = TimeWindow::from_snapshot_time(Some("yesterday")).unwrap_err();
        assert!(matches!(err, AssembleError::SnapshotTimeParse { .. }));
    }
}
