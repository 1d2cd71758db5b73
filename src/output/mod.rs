//! Output module
//!
//! Handles Parquet encoding and partitioned dataset writes.
//!
//! # Overview
//!
//! This module provides:
//! - Parquet writer settings and RecordBatch-to-bytes encoding
//! - [`DatasetWriter`]: Hive-style partitioned, full-overwrite table writes

mod dataset;
mod writer;

pub use dataset::{DatasetWriter, WriteSummary};
pub use writer::{encode_batch, ParquetWriterConfig};
