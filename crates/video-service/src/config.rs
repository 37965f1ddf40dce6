use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Local,
    S3,
}

#[derive(Parser, Debug, Clone, Serialize, Deserialize)]
#[command(name = "video-service")]
#[command(about = "Video upload and streaming server")]
#[command(version)]
pub struct Config {
    /// Server listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: String,

    /// Content store backend: "memory", "local" or "s3"
    #[arg(long, env = "STORAGE_BACKEND", default_value = "memory")]
    pub storage_backend: StorageBackend,

    /// Local storage path (when using local backend)
    #[arg(long, env = "LOCAL_PATH", default_value = "./data")]
    pub local_path: String,

    /// S3 bucket name (when using s3 backend)
    #[arg(long, env = "S3_BUCKET", default_value = "")]
    pub s3_bucket: String,

    /// S3 region (when using s3 backend)
    #[arg(long, env = "S3_REGION", default_value = "us-east-1")]
    pub s3_region: String,

    /// S3 endpoint URL (for MinIO or custom S3)
    #[arg(long, env = "S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// S3 access key (for MinIO or explicit credentials)
    #[arg(long, env = "S3_ACCESS_KEY", default_value = "minioadmin")]
    pub s3_access_key: String,

    /// S3 secret key (for MinIO or explicit credentials)
    #[arg(long, env = "S3_SECRET_KEY", default_value = "minioadmin")]
    pub s3_secret_key: String,

    /// Base URL used when building data URLs. Derived from the Host header when unset,
    /// falling back to the listen address; set it when listening on 0.0.0.0.
    #[arg(long, env = "PUBLIC_BASE_URL")]
    pub public_base_url: Option<String>,

    /// Maximum accepted request body size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "536870912")]
    pub max_upload_bytes: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,
}

impl Config {
    /// Parse from CLI args and environment
    pub fn parse_args() -> Self {
        Config::parse()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.storage_backend {
            StorageBackend::S3 if self.s3_bucket.is_empty() => {
                return Err(ConfigError::MissingS3Bucket);
            }
            StorageBackend::Local if self.local_path.trim().is_empty() => {
                return Err(ConfigError::MissingLocalPath);
            }
            _ => {}
        }

        if let Some(base) = &self.public_base_url {
            if !(base.starts_with("http://") || base.starts_with("https://")) {
                return Err(ConfigError::InvalidBaseUrl(base.clone()));
            }
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::ZeroUploadLimit);
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".to_string(),
            storage_backend: StorageBackend::Memory,
            local_path: "./data".to_string(),
            s3_bucket: "".to_string(),
            s3_region: "us-east-1".to_string(),
            s3_endpoint: None,
            s3_access_key: "minioadmin".to_string(),
            s3_secret_key: "minioadmin".to_string(),
            public_base_url: None,
            max_upload_bytes: 512 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("S3 bucket name required when using s3 backend")]
    MissingS3Bucket,

    #[error("local path required when using local backend")]
    MissingLocalPath,

    #[error("public base URL must start with http:// or https://, got {0}")]
    InvalidBaseUrl(String),

    #[error("max upload size must be greater than zero")]
    ZeroUploadLimit,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.storage_backend, StorageBackend::Memory);
    }

    #[test]
    fn test_s3_requires_bucket() {
        let mut config = Config::default();
        config.storage_backend = StorageBackend::S3;
        config.s3_bucket = "".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingS3Bucket)
        ));
    }

    #[test]
    fn test_s3_with_bucket_valid() {
        let mut config = Config::default();
        config.storage_backend = StorageBackend::S3;
        config.s3_bucket = "my-bucket".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_local_requires_path() {
        let mut config = Config::default();
        config.storage_backend = StorageBackend::Local;
        config.local_path = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingLocalPath)
        ));
    }

    #[test]
    fn test_base_url_scheme() {
        let mut config = Config::default();
        config.public_base_url = Some("videos.example.com".to_string());
        assert!(config.validate().is_err());

        config.public_base_url = Some("https://videos.example.com".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_upload_limit_rejected() {
        let config = Config {
            max_upload_bytes: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ZeroUploadLimit)
        ));
    }

    #[test]
    fn test_parse_from_args() {
        let config = Config::try_parse_from([
            "video-service",
            "--storage-backend",
            "local",
            "--local-path",
            "/tmp/videos",
            "--public-base-url",
            "http://media.local:9000",
        ])
        .unwrap();
        assert_eq!(config.storage_backend, StorageBackend::Local);
        assert_eq!(config.local_path, "/tmp/videos");
        assert_eq!(
            config.public_base_url.as_deref(),
            Some("http://media.local:9000")
        );
    }
}
