mod client;
mod error;
mod response;

pub use client::{TimelinesClient, QUERY_FIELDS};
pub use error::FetchError;
pub use response::{IntervalValues, RawInterval};
