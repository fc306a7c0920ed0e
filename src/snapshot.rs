//! Persists the assembled table as a parquet snapshot.

use crate::table::WeatherTable;
use log::info;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::{fs, task};

/// The snapshot filename inside the configured output directory.
pub const SNAPSHOT_FILENAME: &str = "weather_data.parquet";

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to create snapshot directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("I/O error writing snapshot file '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("encoding error writing snapshot file '{0}'")]
    Write(PathBuf, #[source] PolarsError),

    #[error("background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Writes `table` to `path` as Snappy-compressed parquet, overwriting any
/// existing file. The parent directory is created if missing.
pub async fn write_snapshot(table: &WeatherTable, path: &Path) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| SnapshotError::DirCreation(parent.to_path_buf(), e))?;
        }
    }

    let mut frame = table.frame.clone();
    let path_buf = path.to_path_buf();
    let rows = table.height();
    task::spawn_blocking(move || {
        let file = std::fs::File::create(&path_buf)
            .map_err(|e| SnapshotError::Io(path_buf.clone(), e))?;
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .finish(&mut frame)
            .map_err(|e| SnapshotError::Write(path_buf, e))?;
        Ok::<(), SnapshotError>(())
    })
    .await??;

    info!("wrote {} rows to snapshot '{}'", rows, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::WeatherRecord;

    fn sample_table() -> WeatherTable {
        WeatherTable::from_records(vec![
            WeatherRecord {
                snapshot_time: "2024-11-22T10:00:00Z".to_string(),
                latitude: 40.7128,
                longitude: -74.006,
                temperature: 21.5,
                wind_speed: 5.2,
            },
            WeatherRecord {
                snapshot_time: "2024-11-22T11:00:00Z".to_string(),
                latitude: 40.7128,
                longitude: -74.006,
                temperature: 20.9,
                wind_speed: 4.8,
            },
        ])
        .unwrap()
    }

    #[tokio::test]
    async fn writes_readable_parquet_and_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshots").join(SNAPSHOT_FILENAME);
        let table = sample_table();

        write_snapshot(&table, &path).await.unwrap();

        let read_back = LazyFrame::scan_parquet(&path, Default::default())
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(read_back.height(), 2);
        assert_eq!(
            read_back.get_column_names(),
            table.frame.get_column_names()
        );
    }

    #[tokio::test]
    async fn overwrites_an_existing_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SNAPSHOT_FILENAME);

        write_snapshot(&sample_table(), &path).await.unwrap();
        let empty = WeatherTable::from_records(vec![]).unwrap();
        write_snapshot(&empty, &path).await.unwrap();

        let read_back = LazyFrame::scan_parquet(&path, Default::default())
            .unwrap()
            .collect()
            .unwrap();
        assert_eq!(read_back.height(), 0);
    }
}
