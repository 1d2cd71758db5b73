//! Catalog pipeline
//!
//! Transforms raw song-catalog records into the songs and artists
//! dimension tables.

use crate::context::{ExecutionContext, StorageLocation};
use crate::error::Result;
use crate::input::JsonDatasetReader;
use crate::output::DatasetWriter;
use crate::pipeline::dedup_by;
use crate::tables::{ArtistRow, SongRecord, SongRow};

/// Wildcard sub-path of the song-catalog dataset under the input root
pub const SONG_DATA_PATTERN: &str = "song-data/A/A/A/*.json";

/// Run the catalog pipeline
///
/// Reads every catalog record matching [`SONG_DATA_PATTERN`], then writes
/// the `songs` dimension (deduplicated by `song_id`, partitioned by year
/// and artist) and the `artists` dimension (deduplicated by `artist_id`,
/// unpartitioned). Any read or write failure aborts the pipeline.
pub async fn process_catalog(
    ctx: &ExecutionContext,
    input: &StorageLocation,
    output: &StorageLocation,
) -> Result<()> {
    let reader = JsonDatasetReader::new(input);
    let catalog: Vec<SongRecord> = reader.read_dataset(SONG_DATA_PATTERN).await?;

    let writer = DatasetWriter::new(output, ctx.parquet());

    let songs = dedup_by(catalog.iter().map(SongRow::from), |row| row.song_id.clone());
    let summary = writer.overwrite(&songs).await?;
    tracing::info!(rows = summary.rows, files = summary.files, "wrote songs dimension");

    let artists = dedup_by(catalog.iter().map(ArtistRow::from), |row| {
        row.artist_id.clone()
    });
    let summary = writer.overwrite(&artists).await?;
    tracing::info!(rows = summary.rows, files = summary.files, "wrote artists dimension");

    Ok(())
}
