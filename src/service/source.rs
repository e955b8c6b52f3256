//! Image sources accepted by the service: inline base64 (optionally a `data:` URL)
//! or an http(s) URL spooled to a scoped temporary file.
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::Result;
use crate::io::raster::Raster;
use crate::service::config::ServiceConfig;
use crate::service::error::ServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    Url(String),
    Base64(String),
}

/// A fetched source. A spooled download is deleted when this value is dropped.
#[derive(Debug)]
pub enum FetchedImage {
    Memory(Vec<u8>),
    Spooled(NamedTempFile),
}

impl FetchedImage {
    pub fn decode(&self) -> Result<Raster> {
        match self {
            FetchedImage::Memory(bytes) => Raster::decode(bytes),
            FetchedImage::Spooled(file) => Raster::open(file.path()),
        }
    }
}

pub fn build_client(config: &ServiceConfig) -> std::result::Result<reqwest::Client, ServiceError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.download_timeout_secs))
        .build()
        .map_err(|e| ServiceError::Config(format!("HTTP client: {e}")))
}

/// Decode an inline payload, stripping a `data:<mime>;base64,` prefix if present.
pub fn decode_base64_payload(payload: &str) -> std::result::Result<Vec<u8>, ServiceError> {
    let encoded = match payload.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((meta, data)) if meta.ends_with(";base64") => data,
            _ => {
                return Err(ServiceError::BadRequest(
                    "imageBytes data URL must be base64 encoded".into(),
                ));
            }
        },
        None => payload,
    };
    general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| ServiceError::BadRequest(format!("imageBytes is not valid base64: {e}")))
}

pub async fn fetch(
    source: ImageSource,
    client: &reqwest::Client,
    config: &ServiceConfig,
) -> std::result::Result<FetchedImage, ServiceError> {
    match source {
        ImageSource::Base64(payload) => Ok(FetchedImage::Memory(decode_base64_payload(&payload)?)),
        ImageSource::Url(url) => download(&url, client, config).await.map(FetchedImage::Spooled),
    }
}

async fn download(
    url: &str,
    client: &reqwest::Client,
    config: &ServiceConfig,
) -> std::result::Result<NamedTempFile, ServiceError> {
    let url = reqwest::Url::parse(url)
        .map_err(|e| ServiceError::BadRequest(format!("imageUrl {url:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ServiceError::BadRequest(format!(
            "imageUrl scheme {:?} is not supported",
            url.scheme()
        )));
    }

    let mut response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| ServiceError::Download(format!("{url}: {e}")))?;
    if !response.status().is_success() {
        return Err(ServiceError::Download(format!(
            "{url}: HTTP {}",
            response.status().as_u16()
        )));
    }
    let limit = config.max_download_bytes;
    if response.content_length().is_some_and(|len| len > limit) {
        return Err(ServiceError::Download(format!(
            "{url}: larger than {limit} bytes"
        )));
    }

    let spool = tempfile::Builder::new()
        .prefix("extend_canvas-src-")
        .tempfile_in(&config.temp_dir)?;
    let mut file = tokio::fs::File::from_std(spool.reopen()?);
    let mut total: u64 = 0;
    while let Some(chunk) = response
        .chunk()
        .await
        .map_err(|e| ServiceError::Download(format!("{url}: {e}")))?
    {
        total = total.saturating_add(chunk.len() as u64);
        if total > limit {
            return Err(ServiceError::Download(format!(
                "{url}: larger than {limit} bytes"
            )));
        }
        file.write_all(&chunk).await?;
    }
    file.flush().await?;
    debug!(%url, bytes = total, path = ?spool.path(), "Downloaded source image");
    Ok(spool)
}
