//! Typed view of the Tomorrow.io `v4/timelines` response.
//!
//! The provider nests the interesting rows under `data.timelines[0].intervals`;
//! everything on that path is modelled explicitly so a malformed response fails
//! at the decode boundary instead of somewhere deep in the reshape.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct TimelinesResponse {
    pub data: TimelinesData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimelinesData {
    pub timelines: Vec<Timeline>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Timeline {
    pub intervals: Vec<RawInterval>,
}

/// One time interval of the provider response, before reshaping.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInterval {
    pub start_time: String,
    pub values: IntervalValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntervalValues {
    pub temperature: f64,
    pub wind_speed: f64,
}

pub(crate) enum ParseFailure {
    Decode(serde_json::Error),
    NoTimelines,
}

/// Decodes a timelines response body and pulls out the first timeline's
/// intervals. Responses with an empty `timelines` array are rejected.
pub(crate) fn parse_intervals(body: &str) -> Result<Vec<RawInterval>, ParseFailure> {
    let response: TimelinesResponse =
        serde_json::from_str(body).map_err(ParseFailure::Decode)?;
    let timeline = response
        .data
        .timelines
        .into_iter()
        .next()
        .ok_or(ParseFailure::NoTimelines)?;
    Ok(timeline.intervals)
}
