//! Data model
//!
//! Source record types for the two raw JSON datasets, the five star-schema
//! tables derived from them, and the [`StarTable`] seam the dataset writer
//! works through.

mod source;
mod star;

pub use source::{EventRecord, SongRecord, NEXT_SONG_PAGE};
pub use star::{ArtistRow, SongRow, SongplayRow, StarTable, TimeRow, UserRow};
