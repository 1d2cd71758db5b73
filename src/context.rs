//! Execution context
//!
//! One [`ExecutionContext`] is created at startup and shared by both
//! pipelines. It owns the parsed input/output storage locations and the
//! Parquet writer settings; if a store cannot be built the job fails before
//! any pipeline runs.

use crate::config::{AppConfig, AwsCredentials};
use crate::error::{Error, Result};
use crate::output::ParquetWriterConfig;
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;

/// A storage root parsed from a URL
///
/// Wraps the object store for the root's bucket (or local directory) plus
/// the key prefix inside it. All dataset paths are built relative to the
/// prefix via [`StorageLocation::key`].
#[derive(Debug, Clone)]
pub struct StorageLocation {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Key prefix within the bucket (empty for local roots)
    prefix: String,
    /// Original URL scheme for logging
    scheme: String,
    /// Original URL
    url: String,
}

impl StorageLocation {
    /// Parse a root URL and create the appropriate object store
    ///
    /// Supported formats:
    /// - `s3://bucket/prefix/` or `s3a://bucket/prefix/` - AWS S3
    /// - `/local/path/` or `file:///local/path/` - local filesystem
    ///
    /// S3 roots require credentials; they are passed to the builder
    /// explicitly rather than read from the environment.
    pub fn parse(url: &str, aws: Option<&AwsCredentials>) -> Result<Self> {
        if let Some(rest) = url.strip_prefix("s3://") {
            Self::parse_s3(url, rest, aws)
        } else if let Some(rest) = url.strip_prefix("s3a://") {
            Self::parse_s3(url, rest, aws)
        } else {
            Self::parse_local(url)
        }
    }

    fn parse_s3(url: &str, without_scheme: &str, aws: Option<&AwsCredentials>) -> Result<Self> {
        let aws = aws.ok_or_else(|| {
            Error::config(format!("S3 root '{url}' configured without credentials"))
        })?;

        let (bucket, prefix) = match without_scheme.find('/') {
            Some(idx) => (
                &without_scheme[..idx],
                without_scheme[idx + 1..].trim_end_matches('/').to_string(),
            ),
            None => (without_scheme, String::new()),
        };

        if bucket.is_empty() {
            return Err(Error::config(format!("Invalid S3 URL: {url}")));
        }

        let store = AmazonS3Builder::new()
            .with_bucket_name(bucket)
            .with_region(aws.region.clone())
            .with_access_key_id(aws.access_key_id.clone())
            .with_secret_access_key(aws.secret_access_key.clone())
            .build()
            .map_err(|e| Error::config(format!("Failed to create S3 client: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix,
            scheme: "s3".to_string(),
            url: url.to_string(),
        })
    }

    fn parse_local(path: &str) -> Result<Self> {
        let path = path.strip_prefix("file://").unwrap_or(path);

        // LocalFileSystem refuses a missing root directory
        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;

        Ok(Self {
            store: Arc::new(store),
            prefix: String::new(),
            scheme: "file".to_string(),
            url: path.to_string(),
        })
    }

    /// The object store for this root
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// Build an object path under this root
    pub fn key(&self, sub: &str) -> ObjectPath {
        if self.prefix.is_empty() {
            ObjectPath::from(sub)
        } else {
            ObjectPath::from(format!("{}/{sub}", self.prefix))
        }
    }

    /// Join a sub-path onto this root's prefix without sanitizing it
    ///
    /// Unlike [`StorageLocation::key`] the result is a plain string, so
    /// wildcard patterns pass through untouched.
    pub fn full_key(&self, sub: &str) -> String {
        if self.prefix.is_empty() {
            sub.to_string()
        } else {
            format!("{}/{sub}", self.prefix)
        }
    }

    /// The original root URL, for logging
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The URL scheme (s3 or file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

/// Shared processing session for one ETL run
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    input: StorageLocation,
    output: StorageLocation,
    parquet: ParquetWriterConfig,
}

impl ExecutionContext {
    /// Create the execution context from a validated configuration
    ///
    /// Idempotent per process; a failure to build either store is fatal and
    /// is propagated without retry.
    pub fn create(config: &AppConfig) -> Result<Self> {
        config.validate()?;

        let input = StorageLocation::parse(&config.input_root, config.aws.as_ref())?;
        let output = StorageLocation::parse(&config.output_root, config.aws.as_ref())?;

        tracing::info!(
            input = %input.url(),
            output = %output.url(),
            "created execution context"
        );

        Ok(Self {
            input,
            output,
            parquet: ParquetWriterConfig::default(),
        })
    }

    /// The root the raw JSON datasets are read from
    pub fn input(&self) -> &StorageLocation {
        &self.input
    }

    /// The root the star-schema tables are written under
    pub fn output(&self) -> &StorageLocation {
        &self.output
    }

    /// Parquet writer settings shared by all table writes
    pub fn parquet(&self) -> &ParquetWriterConfig {
        &self.parquet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> AwsCredentials {
        AwsCredentials {
            access_key_id: "AKIATEST".to_string(),
            secret_access_key: "secret".to_string(),
            region: "us-west-2".to_string(),
        }
    }

    #[test]
    fn test_parse_s3_url() {
        let loc = StorageLocation::parse("s3://my-bucket/lake/star/", Some(&creds())).unwrap();
        assert_eq!(loc.scheme(), "s3");
        assert_eq!(loc.key("songs/part-00000.parquet").as_ref(), "lake/star/songs/part-00000.parquet");
    }

    #[test]
    fn test_parse_s3a_url() {
        let loc = StorageLocation::parse("s3a://my-bucket", Some(&creds())).unwrap();
        assert_eq!(loc.scheme(), "s3");
        assert_eq!(loc.key("artists").as_ref(), "artists");
    }

    #[test]
    fn test_s3_without_credentials_fails() {
        let err = StorageLocation::parse("s3://my-bucket/", None).unwrap_err();
        assert!(err.to_string().contains("without credentials"));
    }

    #[test]
    fn test_parse_local_path() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().to_str().unwrap();
        let loc = StorageLocation::parse(path, None).unwrap();
        assert_eq!(loc.scheme(), "file");
        assert_eq!(loc.key("time/year=2018").as_ref(), "time/year=2018");
    }

    #[test]
    fn test_create_context_with_local_roots() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            input_root: temp_dir.path().join("raw").display().to_string(),
            output_root: temp_dir.path().join("star").display().to_string(),
            aws: None,
        };
        let ctx = ExecutionContext::create(&config).unwrap();
        assert_eq!(ctx.input().scheme(), "file");
        assert_eq!(ctx.output().scheme(), "file");
    }
}
