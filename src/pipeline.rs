//! The two-step ETL pipeline: extract (fetch + snapshot), then load (merge).
//!
//! The steps run strictly in sequence. A failed extract short-circuits the
//! load; nothing is swallowed on the way up.

use crate::assemble::assemble;
use crate::config::{ExtractConfig, LoadConfig};
use crate::error::EtlError;
use crate::fetch::TimelinesClient;
use crate::locations::load_locations;
use crate::snapshot::{write_snapshot, SNAPSHOT_FILENAME};
use crate::table::{WeatherTable, KEY_COLUMNS};
use crate::upsert::{upsert, UpsertError};
use log::info;
use sqlx::PgPool;

/// Extract step: load locations, fetch and assemble the table, write the
/// parquet snapshot. Returns the table for the load step.
pub async fn run_extract(config: &ExtractConfig) -> Result<WeatherTable, EtlError> {
    let locations = load_locations(&config.locations_path)?;
    info!("loaded {} locations", locations.len());

    let client = TimelinesClient::new(config.api_key.clone(), config.http_timeout)?;
    let table = assemble(&client, &locations, config.snapshot_time.as_deref()).await?;

    let snapshot_path = config.snapshot_dir.join(SNAPSHOT_FILENAME);
    write_snapshot(&table, &snapshot_path).await?;
    Ok(table)
}

/// Load step: merge the assembled table into the destination table, keyed on
/// [`KEY_COLUMNS`]. Returns the number of rows merged.
pub async fn run_load(config: &LoadConfig, table: &WeatherTable) -> Result<u64, EtlError> {
    let pool = PgPool::connect(&config.postgres_uri)
        .await
        .map_err(UpsertError::Connect)?;
    let merged = upsert(table, &config.table, &config.schema, &pool, &KEY_COLUMNS).await?;
    Ok(merged)
}
