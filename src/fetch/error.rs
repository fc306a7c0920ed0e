use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build the HTTP client")]
    ClientBuild(#[source] reqwest::Error),

    #[error("network request failed for location '{location}'")]
    Network {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("timelines request for location '{location}' failed with status {status}")]
    HttpStatus {
        location: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read the response body for location '{location}'")]
    Body {
        location: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected response shape for location '{location}'")]
    Schema {
        location: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response for location '{location}' contains no timelines")]
    NoTimelines { location: String },
}
