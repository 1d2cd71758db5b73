//! Run configuration
//!
//! The job is configured from a single YAML file: where to read raw records
//! from, where to write the star schema to, and the storage credentials for
//! any `s3://` root. Credentials are carried in the config struct and handed
//! to the store builder explicitly; nothing is injected into the process
//! environment.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete run configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Root location of the raw JSON datasets (`s3://bucket/prefix/` or a local path)
    pub input_root: String,

    /// Root location the Parquet tables are written under
    pub output_root: String,

    /// AWS credentials, required when either root is an `s3://` URL
    #[serde(default)]
    pub aws: Option<AwsCredentials>,
}

/// Storage credentials for S3 roots
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsCredentials {
    /// Access key id
    pub access_key_id: String,

    /// Secret access key
    pub secret_access_key: String,

    /// Bucket region
    #[serde(default = "default_region")]
    pub region: String,
}

fn default_region() -> String {
    "us-west-2".to_string()
}

impl AppConfig {
    /// Load and validate a config file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_str(&content)
    }

    /// Load and validate a config from a YAML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("Failed to parse config YAML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Missing credentials with an `s3://` root are a fatal startup error;
    /// local roots need none.
    pub fn validate(&self) -> Result<()> {
        if self.input_root.is_empty() {
            return Err(Error::missing_field("input_root"));
        }
        if self.output_root.is_empty() {
            return Err(Error::missing_field("output_root"));
        }

        if self.needs_credentials() {
            match &self.aws {
                None => return Err(Error::missing_field("aws")),
                Some(aws) => {
                    if aws.access_key_id.is_empty() {
                        return Err(Error::missing_field("aws.access_key_id"));
                    }
                    if aws.secret_access_key.is_empty() {
                        return Err(Error::missing_field("aws.secret_access_key"));
                    }
                }
            }
        }

        Ok(())
    }

    /// Whether any configured root points at S3
    pub fn needs_credentials(&self) -> bool {
        is_s3_url(&self.input_root) || is_s3_url(&self.output_root)
    }
}

/// Check whether a root location is an S3 URL
pub fn is_s3_url(url: &str) -> bool {
    url.starts_with("s3://") || url.starts_with("s3a://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_full_config() {
        let yaml = r"
input_root: s3://raw-events/
output_root: s3://lake/star/
aws:
  access_key_id: AKIATEST
  secret_access_key: secret
";
        let config = AppConfig::from_str(yaml).unwrap();
        assert_eq!(config.input_root, "s3://raw-events/");
        assert_eq!(config.output_root, "s3://lake/star/");

        let aws = config.aws.unwrap();
        assert_eq!(aws.access_key_id, "AKIATEST");
        assert_eq!(aws.region, "us-west-2");
    }

    #[test]
    fn test_local_roots_need_no_credentials() {
        let yaml = r"
input_root: /data/raw
output_root: /data/star
";
        let config = AppConfig::from_str(yaml).unwrap();
        assert!(!config.needs_credentials());
        assert!(config.aws.is_none());
    }

    #[test]
    fn test_s3_root_without_credentials_is_fatal() {
        let yaml = r"
input_root: s3://raw-events/
output_root: /data/star
";
        let err = AppConfig::from_str(yaml).unwrap_err();
        assert_eq!(err.to_string(), "Missing required config field: aws");
    }

    #[test]
    fn test_empty_secret_is_fatal() {
        let yaml = r"
input_root: s3://raw-events/
output_root: s3://lake/
aws:
  access_key_id: AKIATEST
  secret_access_key: ''
";
        let err = AppConfig::from_str(yaml).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required config field: aws.secret_access_key"
        );
    }

    #[test]
    fn test_missing_root_is_fatal() {
        let err = AppConfig::from_str("output_root: /data/star").unwrap_err();
        assert!(err.to_string().contains("Failed to parse config YAML"));

        let yaml = r"
input_root: ''
output_root: /data/star
";
        let err = AppConfig::from_str(yaml).unwrap_err();
        assert_eq!(err.to_string(), "Missing required config field: input_root");
    }

    #[test]
    fn test_s3a_scheme_counts_as_s3() {
        assert!(is_s3_url("s3a://bucket/prefix/"));
        assert!(is_s3_url("s3://bucket"));
        assert!(!is_s3_url("/tmp/data"));
        assert!(!is_s3_url("file:///tmp/data"));
    }
}
