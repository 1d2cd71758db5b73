//! Star-schema tables
//!
//! One row type per output table, each with its Arrow schema and batch
//! builder. The [`StarTable`] trait is the seam the dataset writer works
//! through: table name, partition columns, schema, and row-to-batch
//! conversion. Partition columns are part of the logical schema; the writer
//! strips them from file contents and encodes them in the directory path.

use crate::error::{Error, Result};
use crate::tables::source::{EventRecord, SongRecord};
use arrow::array::{
    ArrayRef, Float64Array, Int32Array, Int64Array, StringArray, TimestampMillisecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use std::sync::Arc;

/// A star-schema table that can be written as a partitioned Parquet dataset
pub trait StarTable: Sized {
    /// Output directory name under the output root
    const NAME: &'static str;

    /// Columns encoded into the directory path instead of the file
    const PARTITION_COLUMNS: &'static [&'static str];

    /// Full logical schema, including partition columns
    fn schema() -> SchemaRef;

    /// Partition values for this row, aligned with `PARTITION_COLUMNS`
    fn partition_values(&self) -> Vec<String> {
        Vec::new()
    }

    /// Build a record batch over the full logical schema
    fn to_batch(rows: &[Self]) -> Result<RecordBatch>;
}

fn utf8_column<'a, I: Iterator<Item = &'a str>>(values: I) -> ArrayRef {
    Arc::new(StringArray::from(values.collect::<Vec<_>>()))
}

fn opt_utf8_column<'a, I: Iterator<Item = Option<&'a str>>>(values: I) -> ArrayRef {
    Arc::new(StringArray::from(values.collect::<Vec<_>>()))
}

// ============================================================================
// Songs Dimension
// ============================================================================

/// One row of the songs dimension, keyed by `song_id`
#[derive(Debug, Clone, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
}

impl From<&SongRecord> for SongRow {
    fn from(record: &SongRecord) -> Self {
        Self {
            song_id: record.song_id.clone(),
            title: record.title.clone(),
            artist_id: record.artist_id.clone(),
            year: record.year,
            duration: record.duration,
        }
    }
}

impl StarTable for SongRow {
    const NAME: &'static str = "songs";
    const PARTITION_COLUMNS: &'static [&'static str] = &["year", "artist_id"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("song_id", DataType::Utf8, false),
            Field::new("title", DataType::Utf8, false),
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("year", DataType::Int32, false),
            Field::new("duration", DataType::Float64, false),
        ]))
    }

    fn partition_values(&self) -> Vec<String> {
        vec![self.year.to_string(), self.artist_id.clone()]
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            utf8_column(rows.iter().map(|r| r.song_id.as_str())),
            utf8_column(rows.iter().map(|r| r.title.as_str())),
            utf8_column(rows.iter().map(|r| r.artist_id.as_str())),
            Arc::new(Int32Array::from(
                rows.iter().map(|r| r.year).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.duration).collect::<Vec<_>>(),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

// ============================================================================
// Artists Dimension
// ============================================================================

/// One row of the artists dimension, keyed by `artist_id`
#[derive(Debug, Clone, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<&SongRecord> for ArtistRow {
    fn from(record: &SongRecord) -> Self {
        Self {
            artist_id: record.artist_id.clone(),
            name: record.artist_name.clone(),
            location: record.artist_location.clone(),
            latitude: record.artist_latitude,
            longitude: record.artist_longitude,
        }
    }
}

impl StarTable for ArtistRow {
    const NAME: &'static str = "artists";
    const PARTITION_COLUMNS: &'static [&'static str] = &[];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("name", DataType::Utf8, false),
            Field::new("location", DataType::Utf8, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("longitude", DataType::Float64, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            utf8_column(rows.iter().map(|r| r.artist_id.as_str())),
            utf8_column(rows.iter().map(|r| r.name.as_str())),
            opt_utf8_column(rows.iter().map(|r| r.location.as_deref())),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.latitude).collect::<Vec<_>>(),
            )),
            Arc::new(Float64Array::from(
                rows.iter().map(|r| r.longitude).collect::<Vec<_>>(),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

// ============================================================================
// Users Dimension
// ============================================================================

/// One row of the users dimension
///
/// No deduplication is applied: a user whose level or name changes across
/// events yields multiple rows. Inherited behavior, flagged in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct UserRow {
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
}

impl From<&EventRecord> for UserRow {
    fn from(event: &EventRecord) -> Self {
        Self {
            user_id: event.user_id.clone(),
            first_name: event.first_name.clone(),
            last_name: event.last_name.clone(),
            gender: event.gender.clone(),
            level: event.level.clone(),
        }
    }
}

impl StarTable for UserRow {
    const NAME: &'static str = "users";
    const PARTITION_COLUMNS: &'static [&'static str] = &[];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("user_id", DataType::Utf8, true),
            Field::new("first_name", DataType::Utf8, true),
            Field::new("last_name", DataType::Utf8, true),
            Field::new("gender", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
        ]))
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            opt_utf8_column(rows.iter().map(|r| r.user_id.as_deref())),
            opt_utf8_column(rows.iter().map(|r| r.first_name.as_deref())),
            opt_utf8_column(rows.iter().map(|r| r.last_name.as_deref())),
            opt_utf8_column(rows.iter().map(|r| r.gender.as_deref())),
            opt_utf8_column(rows.iter().map(|r| r.level.as_deref())),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

// ============================================================================
// Time Dimension
// ============================================================================

/// One row of the time dimension, keyed by the event timestamp
///
/// Every calendar component is derived from `start_time` in UTC, so the
/// row is internally consistent by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeRow {
    /// Event time, epoch milliseconds
    pub start_time: i64,
    pub hour: i32,
    pub day: i32,
    pub week: i32,
    pub month: i32,
    pub year: i32,
    /// Day of week, 1 = Sunday through 7 = Saturday
    pub weekday: i32,
}

impl TimeRow {
    /// Decompose an epoch-millisecond timestamp into calendar components
    pub fn from_epoch_ms(ts: i64) -> Result<Self> {
        let dt: DateTime<Utc> = Utc
            .timestamp_millis_opt(ts)
            .single()
            .ok_or_else(|| Error::Other(format!("event timestamp {ts} out of range")))?;

        Ok(Self {
            start_time: ts,
            hour: dt.hour() as i32,
            day: dt.day() as i32,
            week: dt.iso_week().week() as i32,
            month: dt.month() as i32,
            year: dt.year(),
            weekday: dt.weekday().num_days_from_sunday() as i32 + 1,
        })
    }
}

impl StarTable for TimeRow {
    const NAME: &'static str = "time";
    const PARTITION_COLUMNS: &'static [&'static str] = &["year", "month"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new(
                "start_time",
                DataType::Timestamp(TimeUnit::Millisecond, None),
                false,
            ),
            Field::new("hour", DataType::Int32, false),
            Field::new("day", DataType::Int32, false),
            Field::new("week", DataType::Int32, false),
            Field::new("month", DataType::Int32, false),
            Field::new("year", DataType::Int32, false),
            Field::new("weekday", DataType::Int32, false),
        ]))
    }

    fn partition_values(&self) -> Vec<String> {
        vec![self.year.to_string(), self.month.to_string()]
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(TimestampMillisecondArray::from(
                rows.iter().map(|r| r.start_time).collect::<Vec<_>>(),
            )),
            Arc::new(Int32Array::from(
                rows.iter().map(|r| r.hour).collect::<Vec<_>>(),
            )),
            Arc::new(Int32Array::from(
                rows.iter().map(|r| r.day).collect::<Vec<_>>(),
            )),
            Arc::new(Int32Array::from(
                rows.iter().map(|r| r.week).collect::<Vec<_>>(),
            )),
            Arc::new(Int32Array::from(
                rows.iter().map(|r| r.month).collect::<Vec<_>>(),
            )),
            Arc::new(Int32Array::from(
                rows.iter().map(|r| r.year).collect::<Vec<_>>(),
            )),
            Arc::new(Int32Array::from(
                rows.iter().map(|r| r.weekday).collect::<Vec<_>>(),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}

// ============================================================================
// Songplays Fact
// ============================================================================

/// One row of the songplays fact table
///
/// `start_time` keeps the raw epoch-millisecond `ts` rather than the
/// derived calendar timestamp, and `year` comes from the matched catalog
/// entry (events carry no year of their own). Both quirks are inherited
/// from the matching policy and reproduced as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct SongplayRow {
    /// Surrogate key, unique within one run
    pub songplay_id: i64,
    pub start_time: i64,
    pub user_id: Option<String>,
    pub level: Option<String>,
    pub song_id: String,
    pub artist_id: String,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
    /// Release year of the matched song
    pub year: i32,
}

impl SongplayRow {
    /// Build a fact row from a matched (event, catalog entry) pair
    pub fn from_match(songplay_id: i64, event: &EventRecord, song: &SongRecord) -> Self {
        Self {
            songplay_id,
            start_time: event.ts,
            user_id: event.user_id.clone(),
            level: event.level.clone(),
            song_id: song.song_id.clone(),
            artist_id: song.artist_id.clone(),
            session_id: event.session_id,
            location: event.location.clone(),
            user_agent: event.user_agent.clone(),
            year: song.year,
        }
    }
}

impl StarTable for SongplayRow {
    const NAME: &'static str = "songplays";
    const PARTITION_COLUMNS: &'static [&'static str] = &["year"];

    fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new("songplay_id", DataType::Int64, false),
            Field::new("start_time", DataType::Int64, false),
            Field::new("user_id", DataType::Utf8, true),
            Field::new("level", DataType::Utf8, true),
            Field::new("song_id", DataType::Utf8, false),
            Field::new("artist_id", DataType::Utf8, false),
            Field::new("session_id", DataType::Int64, true),
            Field::new("location", DataType::Utf8, true),
            Field::new("user_agent", DataType::Utf8, true),
            Field::new("year", DataType::Int32, false),
        ]))
    }

    fn partition_values(&self) -> Vec<String> {
        vec![self.year.to_string()]
    }

    fn to_batch(rows: &[Self]) -> Result<RecordBatch> {
        let columns: Vec<ArrayRef> = vec![
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.songplay_id).collect::<Vec<_>>(),
            )),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.start_time).collect::<Vec<_>>(),
            )),
            opt_utf8_column(rows.iter().map(|r| r.user_id.as_deref())),
            opt_utf8_column(rows.iter().map(|r| r.level.as_deref())),
            utf8_column(rows.iter().map(|r| r.song_id.as_str())),
            utf8_column(rows.iter().map(|r| r.artist_id.as_str())),
            Arc::new(Int64Array::from(
                rows.iter().map(|r| r.session_id).collect::<Vec<_>>(),
            )),
            opt_utf8_column(rows.iter().map(|r| r.location.as_deref())),
            opt_utf8_column(rows.iter().map(|r| r.user_agent.as_deref())),
            Arc::new(Int32Array::from(
                rows.iter().map(|r| r.year).collect::<Vec<_>>(),
            )),
        ];
        Ok(RecordBatch::try_new(Self::schema(), columns)?)
    }
}
