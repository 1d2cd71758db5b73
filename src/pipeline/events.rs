//! Event pipeline
//!
//! Transforms raw event-log records into the users and time dimensions and
//! the songplays fact table. Only `NextSong` actions feed the star schema;
//! everything else is filtered out up front.

use crate::context::{ExecutionContext, StorageLocation};
use crate::error::Result;
use crate::input::JsonDatasetReader;
use crate::output::DatasetWriter;
use crate::pipeline::{catalog::SONG_DATA_PATTERN, dedup_by};
use crate::tables::{EventRecord, SongRecord, SongplayRow, TimeRow, UserRow};
use std::collections::HashMap;

/// Wildcard sub-path of the event-log dataset under the input root
pub const LOG_DATA_PATTERN: &str = "log_data/*/*/*.json";

/// Run the event pipeline
///
/// Reads every event matching [`LOG_DATA_PATTERN`], filters to song plays,
/// then writes the `users` dimension (no dedup, inherited behavior), the
/// `time` dimension (one row per distinct timestamp, partitioned by year
/// and month), and the `songplays` fact table built by joining the filtered
/// events against the re-read catalog on literal title/artist-name
/// equality. Events without a catalog match are dropped, which is expected
/// inner-join behavior, not an error.
pub async fn process_events(
    ctx: &ExecutionContext,
    input: &StorageLocation,
    output: &StorageLocation,
) -> Result<()> {
    let reader = JsonDatasetReader::new(input);
    let events: Vec<EventRecord> = reader.read_dataset(LOG_DATA_PATTERN).await?;

    let plays: Vec<&EventRecord> = events.iter().filter(|e| e.is_songplay()).collect();
    tracing::info!(total = events.len(), plays = plays.len(), "filtered events to song plays");

    let writer = DatasetWriter::new(output, ctx.parquet());

    let users: Vec<UserRow> = plays.iter().map(|e| UserRow::from(*e)).collect();
    let summary = writer.overwrite(&users).await?;
    tracing::info!(rows = summary.rows, files = summary.files, "wrote users dimension");

    let timestamps = plays
        .iter()
        .map(|e| TimeRow::from_epoch_ms(e.ts))
        .collect::<Result<Vec<_>>>()?;
    let time = dedup_by(timestamps, |row| row.start_time);
    let summary = writer.overwrite(&time).await?;
    tracing::info!(rows = summary.rows, files = summary.files, "wrote time dimension");

    let catalog: Vec<SongRecord> = reader.read_dataset(SONG_DATA_PATTERN).await?;
    let songplays = build_songplays(&plays, &catalog);
    let summary = writer.overwrite(&songplays).await?;
    tracing::info!(
        rows = summary.rows,
        files = summary.files,
        matched = songplays.len(),
        unmatched = plays.len().saturating_sub(songplays.len()),
        "wrote songplays fact table"
    );

    Ok(())
}

/// Inner-join song plays against the catalog and assign surrogate keys
///
/// The join key is exact string equality of `(event.song, event.artist)`
/// with `(catalog.title, catalog.artist_name)`: no normalization, no
/// case-folding. Duplicate catalog keys preserve join multiplicity.
/// Surrogate ids increase monotonically within the run and carry no
/// cross-run meaning.
pub(crate) fn build_songplays(
    events: &[&EventRecord],
    catalog: &[SongRecord],
) -> Vec<SongplayRow> {
    let mut index: HashMap<(&str, &str), Vec<&SongRecord>> = HashMap::new();
    for song in catalog {
        index
            .entry((song.title.as_str(), song.artist_name.as_str()))
            .or_default()
            .push(song);
    }

    let mut rows = Vec::new();
    let mut next_id = 0i64;
    for event in events {
        let (Some(song), Some(artist)) = (event.song.as_deref(), event.artist.as_deref()) else {
            continue;
        };
        let Some(matches) = index.get(&(song, artist)) else {
            continue;
        };
        for record in matches {
            rows.push(SongplayRow::from_match(next_id, event, record));
            next_id += 1;
        }
    }

    rows
}
