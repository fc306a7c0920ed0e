use crate::assemble::AssembleError;
use crate::config::ConfigError;
use crate::fetch::FetchError;
use crate::locations::LocationError;
use crate::snapshot::SnapshotError;
use crate::table::TableError;
use crate::upsert::UpsertError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Locations(#[from] LocationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error(transparent)]
    Upsert(#[from] UpsertError),
}
