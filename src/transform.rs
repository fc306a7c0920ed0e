//! Reshapes one provider interval into the canonical flat record.

use crate::fetch::RawInterval;
use crate::locations::Location;

/// The canonical row shape every record leaving the assembler has.
///
/// `snapshot_time` is still the provider's timestamp string here; it becomes a
/// real datetime when the records are collected into a [`crate::WeatherTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub snapshot_time: String,
    pub latitude: f64,
    pub longitude: f64,
    pub temperature: f64,
    pub wind_speed: f64,
}

/// Maps one raw interval plus its originating location into a [`WeatherRecord`].
///
/// Pure; field absence is already a decode error at the fetch boundary, so
/// this cannot fail.
pub fn transform(interval: &RawInterval, location: &Location) -> WeatherRecord {
    WeatherRecord {
        snapshot_time: interval.start_time.clone(),
        latitude: location.lat,
        longitude: location.lon,
        temperature: interval.values.temperature,
        wind_speed: interval.values.wind_speed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::IntervalValues;

    #[test]
    fn transforms_interval_and_location_field_for_field() {
        let interval = RawInterval {
            start_time: "2024-11-22T10:00:00Z".to_string(),
            values: IntervalValues {
                temperature: 21.5,
                wind_speed: 5.2,
            },
        };
        let location = Location {
            lat: 40.7128,
            lon: -74.0060,
        };

        let record = transform(&interval, &location);

        assert_eq!(
            record,
            WeatherRecord {
                snapshot_time: "2024-11-22T10:00:00Z".to_string(),
                latitude: 40.7128,
                longitude: -74.006,
                temperature: 21.5,
                wind_speed: 5.2,
            }
        );
    }

    #[test]
    fn timestamp_string_passes_through_unmodified() {
        let interval = RawInterval {
            start_time: "2024-01-01T00:00:00+00:00".to_string(),
            values: IntervalValues {
                temperature: -3.0,
                wind_speed: 0.0,
            },
        };
        let location = Location { lat: 0.0, lon: 0.0 };
        assert_eq!(
            transform(&interval, &location).snapshot_time,
            "2024-01-01T00:00:00+00:00"
        );
    }
}
