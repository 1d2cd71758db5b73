//! Partitioned dataset writer
//!
//! Writes one star-schema table as a Parquet dataset under the output root:
//! `<table>/<col>=<value>/.../part-00000.parquet`. Partition columns are
//! encoded in the directory path and stripped from file contents. Every
//! write is a full overwrite: the table prefix is cleared first, so a run
//! never appends to or merges with prior output.

use crate::context::StorageLocation;
use crate::error::{Error, Result};
use crate::output::writer::{encode_batch, ParquetWriterConfig};
use crate::tables::StarTable;
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use std::collections::BTreeMap;

/// Outcome of one table write, for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSummary {
    /// Rows written across all partitions
    pub rows: usize,
    /// Parquet files written
    pub files: usize,
}

/// Writer for star-schema tables under one output root
pub struct DatasetWriter<'a> {
    location: &'a StorageLocation,
    config: &'a ParquetWriterConfig,
}

impl<'a> DatasetWriter<'a> {
    /// Create a writer over an output root
    pub fn new(location: &'a StorageLocation, config: &'a ParquetWriterConfig) -> Self {
        Self { location, config }
    }

    /// Overwrite a table with the given rows
    ///
    /// Rows are grouped by their partition values; each group becomes one
    /// Parquet file. An empty table still clears prior output and leaves a
    /// single empty file carrying the schema.
    pub async fn overwrite<T: StarTable + Clone>(&self, rows: &[T]) -> Result<WriteSummary> {
        self.clear_table(T::NAME).await?;

        let mut groups: BTreeMap<Vec<String>, Vec<T>> = BTreeMap::new();
        for row in rows {
            groups
                .entry(row.partition_values())
                .or_default()
                .push(row.clone());
        }

        if groups.is_empty() {
            let batch = strip_partitions::<T>(&T::to_batch(&[])?)?;
            self.put_file(&file_path::<T>(&[]), &batch).await?;
            return Ok(WriteSummary { rows: 0, files: 1 });
        }

        let mut files = 0;
        for (partition, group) in &groups {
            let batch = strip_partitions::<T>(&T::to_batch(group)?)?;
            self.put_file(&file_path::<T>(partition), &batch).await?;
            files += 1;
        }

        Ok(WriteSummary {
            rows: rows.len(),
            files,
        })
    }

    /// Delete every object under the table's prefix
    async fn clear_table(&self, table: &str) -> Result<()> {
        let prefix = self.location.key(table);
        let objects: Vec<_> = self
            .location
            .store()
            .list(Some(&prefix))
            .try_collect()
            .await
            .map_err(|e| Error::output(format!("failed to list {table} output: {e}")))?;

        for meta in objects {
            self.location
                .store()
                .delete(&meta.location)
                .await
                .map_err(|e| Error::output(format!("failed to clear {}: {e}", meta.location)))?;
        }

        Ok(())
    }

    async fn put_file(&self, sub_path: &str, batch: &RecordBatch) -> Result<()> {
        let data = encode_batch(batch, self.config)?;
        let path: ObjectPath = self.location.key(sub_path);

        self.location
            .store()
            .put(&path, data.into())
            .await
            .map_err(|e| Error::output(format!("failed to write {path}: {e}")))?;

        tracing::debug!(path = %path, rows = batch.num_rows(), "wrote parquet file");
        Ok(())
    }
}

/// Build the file sub-path for one partition of a table
fn file_path<T: StarTable>(partition: &[String]) -> String {
    let mut path = T::NAME.to_string();
    for (column, value) in T::PARTITION_COLUMNS.iter().zip(partition) {
        path.push('/');
        path.push_str(column);
        path.push('=');
        path.push_str(&sanitize_partition_value(value));
    }
    path.push_str("/part-00000.parquet");
    path
}

/// Make a partition value safe to use as a directory name
fn sanitize_partition_value(value: &str) -> String {
    value.replace('/', "%2F")
}

/// Drop partition columns from a batch; they live in the directory path
fn strip_partitions<T: StarTable>(batch: &RecordBatch) -> Result<RecordBatch> {
    if T::PARTITION_COLUMNS.is_empty() {
        return Ok(batch.clone());
    }

    let indices: Vec<usize> = batch
        .schema()
        .fields()
        .iter()
        .enumerate()
        .filter(|(_, field)| !T::PARTITION_COLUMNS.contains(&field.name().as_str()))
        .map(|(i, _)| i)
        .collect();

    Ok(batch.project(&indices)?)
}
