//! Loads the static set of query locations from a `locations.json` file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LocationError {
    #[error("failed to read locations file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("failed to parse locations file '{0}'")]
    Parse(PathBuf, #[source] serde_json::Error),
}

/// A geographic point the ETL fetches weather data for.
///
/// Deserialized from the `locations` array of the config file; the order of
/// the file is the order requests go out in.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    /// Renders the coordinate pair the way the timelines API expects its
    /// `location` query parameter.
    pub fn query_value(&self) -> String {
        format!("{}, {}", self.lat, self.lon)
    }
}

#[derive(Debug, Deserialize)]
struct LocationsFile {
    locations: Vec<Location>,
}

/// Reads the location list from `path`.
///
/// A missing file, a missing `locations` key, or a non-numeric coordinate all
/// fail the run; there is no fallback location set.
pub fn load_locations(path: &Path) -> Result<Vec<Location>, LocationError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| LocationError::Read(path.to_path_buf(), e))?;
    let file: LocationsFile = serde_json::from_str(&contents)
        .map_err(|e| LocationError::Parse(path.to_path_buf(), e))?;
    Ok(file.locations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_locations_in_file_order() {
        let file = write_temp(
            r#"{"locations": [{"lat": 40.7128, "lon": -74.0060}, {"lat": 52.52, "lon": 13.405}]}"#,
        );
        let locations = load_locations(file.path()).unwrap();
        assert_eq!(
            locations,
            vec![
                Location { lat: 40.7128, lon: -74.0060 },
                Location { lat: 52.52, lon: 13.405 },
            ]
        );
    }

    #[test]
    fn renders_query_value_with_separator() {
        let location = Location { lat: 40.7128, lon: -74.006 };
        assert_eq!(location.query_value(), "40.7128, -74.006");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_locations(Path::new("/nonexistent/locations.json")).unwrap_err();
        assert!(matches!(err, LocationError::Read(_, _)));
    }

    #[test]
    fn missing_locations_key_is_a_parse_error() {
        let file = write_temp(r#"{"points": []}"#);
        let err = load_locations(file.path()).unwrap_err();
        assert!(matches!(err, LocationError::Parse(_, _)));
    }

    #[test]
    fn non_numeric_coordinate_is_a_parse_error() {
        let file = write_temp(r#"{"locations": [{"lat": "north", "lon": -74.0}]}"#);
        let err = load_locations(file.path()).unwrap_err();
        assert!(matches!(err, LocationError::Parse(_, _)));
    }
}
