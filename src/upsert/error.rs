use crate::table::TableError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UpsertError {
    #[error("failed to connect to the target database")]
    Connect(#[source] sqlx::Error),

    #[error("failed to open a transaction on the target database")]
    Begin(#[source] sqlx::Error),

    #[error("failed to read column types for {schema}.{table}")]
    ReadSchema {
        schema: String,
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("destination table {schema}.{table} does not exist")]
    MissingDestination { schema: String, table: String },

    #[error("destination table {schema}.{table} has no column '{column}'")]
    MissingColumn {
        schema: String,
        table: String,
        column: String,
    },

    #[error("failed to create staging table '{staging}'")]
    Staging {
        staging: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to write rows into staging table '{staging}'")]
    StagingWrite {
        staging: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("merge into {schema}.{table} failed")]
    Merge {
        schema: String,
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to commit the merge transaction")]
    Commit(#[source] sqlx::Error),

    #[error("failed to drop staging table '{staging}'")]
    DropStaging {
        staging: String,
        #[source]
        source: sqlx::Error,
    },

    #[error(transparent)]
    Table(#[from] TableError),
}
