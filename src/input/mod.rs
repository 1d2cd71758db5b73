//! Raw dataset input
//!
//! Loads semi-structured JSON records from object storage. Files are
//! selected with a fixed wildcard sub-path pattern (`*` matches one path
//! segment), never by enumerating file names, so the job works unchanged
//! against any partition layout that fits the pattern.

mod reader;

pub use reader::{compile_pattern, literal_prefix, parse_records, JsonDatasetReader};

#[cfg(test)]
mod tests;
