use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::io::writers::DEFAULT_JPEG_QUALITY;
use crate::service::error::ServiceError;

/// Largest accepted request body; base64 image payloads count against it.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024; // 64 MiB

/// Runtime settings for the HTTP wrapper. Every field has a default, so a config
/// file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    /// Transforms allowed to run at once on the blocking pool.
    pub max_concurrency: usize,
    /// Wall-clock limit for download + transform of one request.
    pub request_timeout_secs: u64,
    /// Connect/read limit for URL sources; the request timeout still applies.
    pub download_timeout_secs: u64,
    pub max_body_bytes: usize,
    pub max_download_bytes: u64,
    /// Where downloaded sources are spooled. Files are removed when the request ends.
    pub temp_dir: PathBuf,
    pub jpeg_quality: u8,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            max_concurrency: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            request_timeout_secs: 30,
            download_timeout_secs: 15,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            max_download_bytes: DEFAULT_MAX_BODY_BYTES as u64,
            temp_dir: std::env::temp_dir(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ServiceConfig {
    /// Read a JSON config file. Missing keys keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ServiceError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Config(format!("{}: {e}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|e| ServiceError::Config(format!("{}: {e}", path.display())))
    }

    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.max_concurrency == 0 {
            return Err(ServiceError::Config("max_concurrency must be at least 1".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ServiceError::Config(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ServiceError::Config(format!(
                "jpeg_quality must be within [1, 100], got {}",
                self.jpeg_quality
            )));
        }
        if !self.temp_dir.is_dir() {
            return Err(ServiceError::Config(format!(
                "temp_dir {} is not a directory",
                self.temp_dir.display()
            )));
        }
        Ok(())
    }
}
