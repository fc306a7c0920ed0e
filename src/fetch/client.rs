//! HTTP client for the Tomorrow.io timelines endpoint.

use crate::fetch::error::FetchError;
use crate::fetch::response::{parse_intervals, ParseFailure, RawInterval};
use crate::locations::Location;
use bon::bon;
use log::{info, warn};
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;

const TIMELINES_URL: &str = "https://api.tomorrow.io/v4/timelines";

/// The fields requested from the provider, in the provider's naming.
pub const QUERY_FIELDS: [&str; 2] = ["temperature", "windSpeed"];

/// A configured client for the timelines API.
///
/// Holds the API key and a `reqwest::Client` with an explicit request timeout;
/// one instance is built per run and used for every location.
pub struct TimelinesClient {
    http: Client,
    api_key: String,
}

#[bon]
impl TimelinesClient {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self {
            http,
            api_key: api_key.into(),
        })
    }

    /// Fetches hourly intervals for every location, one request per location,
    /// in list order.
    ///
    /// `start_time` and `end_time` are passed through verbatim: either
    /// absolute ISO 8601 timestamps or the provider's relative tokens
    /// (`nowMinus1h`, `nowPlus5d`). A failure on any location aborts the whole
    /// fetch; there is no retry and no partial result.
    #[builder]
    pub async fn fetch(
        &self,
        locations: &[Location],
        start_time: &str,
        end_time: &str,
        extra_params: Option<&[(&str, &str)]>,
    ) -> Result<Vec<(RawInterval, Location)>, FetchError> {
        let fields = QUERY_FIELDS.join(",");
        let mut rows = Vec::new();

        for location in locations {
            let location_value = location.query_value();
            let mut request = self
                .http
                .get(TIMELINES_URL)
                .header(ACCEPT, "application/json")
                .query(&[
                    ("apikey", self.api_key.as_str()),
                    ("fields", fields.as_str()),
                    ("units", "metric"),
                    ("timesteps", "1h"),
                    ("location", location_value.as_str()),
                    ("startTime", start_time),
                    ("endTime", end_time),
                ]);
            if let Some(extra) = extra_params {
                request = request.query(extra);
            }

            // The request URL carries the API key; reqwest errors keep it out.
            let response = request.send().await.map_err(|e| FetchError::Network {
                location: location_value.clone(),
                source: e.without_url(),
            })?;

            let response = match response.error_for_status() {
                Ok(resp) => resp,
                Err(e) => {
                    warn!("timelines request failed for '{location_value}'");
                    return Err(if let Some(status) = e.status() {
                        FetchError::HttpStatus {
                            location: location_value,
                            status,
                            source: e.without_url(),
                        }
                    } else {
                        FetchError::Network {
                            location: location_value,
                            source: e.without_url(),
                        }
                    });
                }
            };

            let body = response.text().await.map_err(|e| FetchError::Body {
                location: location_value.clone(),
                source: e.without_url(),
            })?;

            let intervals = parse_intervals(&body).map_err(|failure| match failure {
                ParseFailure::Decode(source) => FetchError::Schema {
                    location: location_value.clone(),
                    source,
                },
                ParseFailure::NoTimelines => FetchError::NoTimelines {
                    location: location_value.clone(),
                },
            })?;

            info!(
                "fetched {} intervals for location '{}'",
                intervals.len(),
                location_value
            );
            rows.extend(intervals.into_iter().map(|interval| (interval, *location)));
        }

        Ok(rows)
    }
}
