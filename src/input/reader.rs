//! JSON dataset reader
//!
//! Lists the objects under a root that match a wildcard sub-path pattern
//! and parses each one into JSON records. A file may hold a single JSON
//! object, a JSON array, or newline-delimited JSON. Any unreadable or
//! malformed file aborts the enclosing pipeline; there is no partial retry.

use crate::context::StorageLocation;
use crate::error::{Error, Result};
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Reader for wildcard-selected JSON datasets under one storage root
pub struct JsonDatasetReader<'a> {
    location: &'a StorageLocation,
}

impl<'a> JsonDatasetReader<'a> {
    /// Create a reader over a storage root
    pub fn new(location: &'a StorageLocation) -> Self {
        Self { location }
    }

    /// Read every record from the files matching `pattern`
    ///
    /// Matching files are read in lexicographic path order, which makes the
    /// record order (and therefore any keep-first dedup downstream) stable
    /// for a single-process run. Zero matching files is a fatal input error.
    pub async fn read_pattern(&self, pattern: &str) -> Result<Vec<Value>> {
        let full_pattern = self.location.full_key(pattern);
        let regex = compile_pattern(&full_pattern)?;
        let prefix = ObjectPath::from(literal_prefix(&full_pattern));

        let store = self.location.store();
        let objects: Vec<_> = store
            .list(Some(&prefix))
            .try_collect()
            .await
            .map_err(|e| Error::input(pattern, format!("failed to list input files: {e}")))?;

        let mut paths: Vec<ObjectPath> = objects
            .into_iter()
            .map(|meta| meta.location)
            .filter(|path| regex.is_match(path.as_ref()))
            .collect();
        paths.sort_unstable_by(|a, b| a.as_ref().cmp(b.as_ref()));

        if paths.is_empty() {
            return Err(Error::input(pattern, "no files match pattern"));
        }

        let mut records = Vec::new();
        for path in &paths {
            let data = store
                .get(path)
                .await
                .map_err(|e| Error::input(path.as_ref(), format!("failed to read: {e}")))?
                .bytes()
                .await
                .map_err(|e| Error::input(path.as_ref(), format!("failed to read: {e}")))?;

            let mut file_records = parse_records(&data, path.as_ref())?;
            tracing::debug!(path = %path, records = file_records.len(), "read input file");
            records.append(&mut file_records);
        }

        tracing::info!(pattern, files = paths.len(), records = records.len(), "loaded dataset");
        Ok(records)
    }

    /// Read a dataset and deserialize every record into `T`
    pub async fn read_dataset<T: DeserializeOwned>(&self, pattern: &str) -> Result<Vec<T>> {
        let values = self.read_pattern(pattern).await?;
        values
            .into_iter()
            .map(|value| {
                serde_json::from_value(value)
                    .map_err(|e| Error::input(pattern, format!("malformed record: {e}")))
            })
            .collect()
    }
}

/// The literal path segments of a pattern, up to the first wildcard segment
///
/// Used as the listing prefix so only a fraction of the store is scanned.
pub fn literal_prefix(pattern: &str) -> String {
    pattern
        .split('/')
        .take_while(|segment| !segment.contains('*'))
        .collect::<Vec<_>>()
        .join("/")
}

/// Compile a wildcard sub-path pattern into an anchored regex
///
/// `*` matches any run of characters within one path segment; every other
/// character matches literally.
pub fn compile_pattern(pattern: &str) -> Result<Regex> {
    let mut expr = String::from("^");
    for (i, chunk) in pattern.split('*').enumerate() {
        if i > 0 {
            expr.push_str("[^/]*");
        }
        expr.push_str(&regex::escape(chunk));
    }
    expr.push('$');

    Regex::new(&expr)
        .map_err(|e| Error::input(pattern, format!("invalid wildcard pattern: {e}")))
}

/// Parse the contents of one input file into JSON records
///
/// Accepts a single JSON object, a JSON array of objects, or
/// newline-delimited JSON. Anything else is a fatal input error.
pub fn parse_records(data: &[u8], path: &str) -> Result<Vec<Value>> {
    if let Ok(value) = serde_json::from_slice::<Value>(data) {
        return match value {
            Value::Object(_) => Ok(vec![value]),
            Value::Array(items) => Ok(items),
            _ => Err(Error::input(path, "expected JSON object or array")),
        };
    }

    // Newline-delimited JSON: one object per non-empty line
    let text = std::str::from_utf8(data)
        .map_err(|_| Error::input(path, "file is not valid UTF-8"))?;

    let mut records = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).map_err(|e| {
            Error::input(path, format!("malformed record on line {}: {e}", line_no + 1))
        })?;
        records.push(value);
    }

    if records.is_empty() {
        return Err(Error::input(path, "file contains no JSON records"));
    }

    Ok(records)
}
