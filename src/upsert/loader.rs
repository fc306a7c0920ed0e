//! Merges an assembled table into the destination Postgres table via a
//! staging copy.

use crate::table::{WeatherTable, CANONICAL_COLUMNS};
use crate::upsert::error::UpsertError;
use log::info;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use std::collections::HashMap;

// Postgres caps bind parameters per statement at 65535; five per row leaves
// plenty of headroom at this chunk size.
const INSERT_CHUNK_ROWS: usize = 1000;

/// Merges `table` into `<schema>.<table_name>`, which must already exist.
///
/// The rows are written to a staging table typed after the destination, then
/// a single `MERGE` updates rows matching `key_columns` and inserts the rest.
/// The staging write and the merge share one transaction; the staging table is
/// dropped after commit. Returns the number of rows the merge touched.
pub async fn upsert(
    table: &WeatherTable,
    table_name: &str,
    schema: &str,
    pool: &PgPool,
    key_columns: &[&str],
) -> Result<u64, UpsertError> {
    let rows = table.rows()?;

    let mut tx = pool.begin().await.map_err(UpsertError::Begin)?;

    let destination_types = destination_column_types(&mut tx, schema, table_name).await?;
    if destination_types.is_empty() {
        return Err(UpsertError::MissingDestination {
            schema: schema.to_string(),
            table: table_name.to_string(),
        });
    }

    let staging = format!("{table_name}_staging");
    let staging_qualified = qualified(schema, &staging);

    sqlx::query(&format!("DROP TABLE IF EXISTS {staging_qualified}"))
        .execute(&mut *tx)
        .await
        .map_err(|e| UpsertError::Staging {
            staging: staging.clone(),
            source: e,
        })?;
    let ddl = staging_ddl(schema, table_name, &staging, &destination_types)?;
    sqlx::query(&ddl)
        .execute(&mut *tx)
        .await
        .map_err(|e| UpsertError::Staging {
            staging: staging.clone(),
            source: e,
        })?;

    let column_list = quoted_list(&CANONICAL_COLUMNS);
    for chunk in rows.chunks(INSERT_CHUNK_ROWS) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
            "INSERT INTO {staging_qualified} ({column_list}) "
        ));
        builder.push_values(chunk, |mut b, row| {
            b.push_bind(row.snapshot_time)
                .push_bind(row.latitude)
                .push_bind(row.longitude)
                .push_bind(row.temperature)
                .push_bind(row.wind_speed);
        });
        builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(|e| UpsertError::StagingWrite {
                staging: staging.clone(),
                source: e,
            })?;
    }

    let merge = merge_statement(schema, table_name, &staging, key_columns);
    let result = sqlx::query(&merge)
        .execute(&mut *tx)
        .await
        .map_err(|e| UpsertError::Merge {
            schema: schema.to_string(),
            table: table_name.to_string(),
            source: e,
        })?;

    tx.commit().await.map_err(UpsertError::Commit)?;

    sqlx::query(&format!("DROP TABLE IF EXISTS {staging_qualified}"))
        .execute(pool)
        .await
        .map_err(|e| UpsertError::DropStaging {
            staging: staging.clone(),
            source: e,
        })?;

    info!(
        "merged {} rows into {}.{}",
        result.rows_affected(),
        schema,
        table_name
    );
    Ok(result.rows_affected())
}

/// Reads the destination's live `column name → declared type` mapping. An
/// empty map means the table does not exist.
async fn destination_column_types(
    tx: &mut Transaction<'_, Postgres>,
    schema: &str,
    table: &str,
) -> Result<HashMap<String, String>, UpsertError> {
    let columns: Vec<(String, String)> = sqlx::query_as(
        "SELECT column_name, data_type FROM information_schema.columns \
         WHERE table_schema = $1 AND table_name = $2",
    )
    .bind(schema)
    .bind(table)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| UpsertError::ReadSchema {
        schema: schema.to_string(),
        table: table.to_string(),
        source: e,
    })?;
    Ok(columns.into_iter().collect())
}

/// Double-quotes an SQL identifier, doubling any embedded quote. Identifiers
/// cannot be bound as statement parameters, so every identifier in the
/// generated SQL goes through here.
fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

fn quoted_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ")
}

/// DDL for the staging table, with each canonical column carrying the
/// destination's declared type so the merge never trips over a coercion.
fn staging_ddl(
    schema: &str,
    table: &str,
    staging: &str,
    destination_types: &HashMap<String, String>,
) -> Result<String, UpsertError> {
    let mut columns = Vec::with_capacity(CANONICAL_COLUMNS.len());
    for name in CANONICAL_COLUMNS {
        let data_type =
            destination_types
                .get(name)
                .ok_or_else(|| UpsertError::MissingColumn {
                    schema: schema.to_string(),
                    table: table.to_string(),
                    column: name.to_string(),
                })?;
        columns.push(format!("{} {}", quote_ident(name), data_type));
    }
    Ok(format!(
        "CREATE TABLE {} ({})",
        qualified(schema, staging),
        columns.join(", ")
    ))
}

/// The merge: match on the AND-conjunction of `key_columns`, update every
/// non-key canonical column on match, insert the full row otherwise. When
/// every column is a key there is nothing to update and matches are left
/// alone.
fn merge_statement(schema: &str, table: &str, staging: &str, key_columns: &[&str]) -> String {
    let on = key_columns
        .iter()
        .map(|k| format!("dst.{0} = src.{0}", quote_ident(k)))
        .collect::<Vec<_>>()
        .join(" AND ");

    let non_key: Vec<&str> = CANONICAL_COLUMNS
        .iter()
        .filter(|c| !key_columns.contains(c))
        .copied()
        .collect();
    let when_matched = if non_key.is_empty() {
        "DO NOTHING".to_string()
    } else {
        let assignments = non_key
            .iter()
            .map(|c| format!("{0} = src.{0}", quote_ident(c)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("UPDATE SET {assignments}")
    };

    let insert_values = CANONICAL_COLUMNS
        .iter()
        .map(|c| format!("src.{}", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "MERGE INTO {dst} AS dst USING {src} AS src ON {on} \
         WHEN MATCHED THEN {when_matched} \
         WHEN NOT MATCHED THEN INSERT ({columns}) VALUES ({insert_values})",
        dst = qualified(schema, table),
        src = qualified(schema, staging),
        columns = quoted_list(&CANONICAL_COLUMNS),
    )
}
