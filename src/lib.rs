mod assemble;
mod config;
mod error;
mod fetch;
mod locations;
mod pipeline;
mod snapshot;
mod table;
mod transform;
mod upsert;

pub use error::EtlError;

pub use assemble::{assemble, AssembleError, TimeWindow, DEFAULT_END, DEFAULT_START};
pub use config::{ConfigError, ExtractConfig, LoadConfig};
pub use fetch::{FetchError, IntervalValues, RawInterval, TimelinesClient, QUERY_FIELDS};
pub use locations::{load_locations, Location, LocationError};
pub use pipeline::{run_extract, run_load};
pub use snapshot::{write_snapshot, SnapshotError, SNAPSHOT_FILENAME};
pub use table::{TableError, TableRow, WeatherTable, CANONICAL_COLUMNS, KEY_COLUMNS};
pub use transform::{transform, WeatherRecord};
pub use upsert::{upsert, UpsertError};
