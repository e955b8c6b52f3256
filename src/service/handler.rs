use std::sync::Arc;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::extend_and_encode;
use crate::core::params::{AUTO_THRESHOLD, CanvasParams, DEFAULT_PADDING_PCT, ValidatedParams};
use crate::error::Error;
use crate::service::AppState;
use crate::service::error::ServiceError;
use crate::service::source::{ImageSource, fetch};
use crate::types::OutputFormat;

/// Body of `POST /extend-canvas`. Exactly one of `imageUrl` / `imageBytes` is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendCanvasRequest {
    pub image_url: Option<String>,
    /// Base64, optionally as a `data:<mime>;base64,` URL
    pub image_bytes: Option<String>,
    pub desired_height: Option<i64>,
    pub padding_pct: Option<f64>,
    pub white_thresh: Option<i32>,
    pub output_format: Option<OutputFormat>,
}

impl ExtendCanvasRequest {
    pub fn params(&self) -> Result<CanvasParams, Error> {
        let desired_height = self
            .desired_height
            .ok_or_else(|| Error::invalid("desired_height", "missing", "is required"))?;
        Ok(CanvasParams {
            desired_height,
            padding_pct: self.padding_pct.unwrap_or(DEFAULT_PADDING_PCT),
            white_thresh: self.white_thresh.unwrap_or(AUTO_THRESHOLD),
        })
    }

    pub fn source(&self) -> Result<ImageSource, ServiceError> {
        match (&self.image_url, &self.image_bytes) {
            (Some(url), None) => Ok(ImageSource::Url(url.clone())),
            (None, Some(bytes)) => Ok(ImageSource::Base64(bytes.clone())),
            (Some(_), Some(_)) => Err(ServiceError::BadRequest(
                "send either imageUrl or imageBytes, not both".into(),
            )),
            (None, None) => Err(ServiceError::BadRequest(
                "one of imageUrl or imageBytes is required".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendCanvasResponse {
    pub success: bool,
    /// Base64 of the encoded output image
    pub processed_image: String,
    pub width: usize,
    pub height: usize,
    pub threshold: u8,
    pub auto_threshold: bool,
    pub format: OutputFormat,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorDetail {
    pub kind: &'static str,
    pub message: String,
}

impl From<&ServiceError> for ErrorBody {
    fn from(err: &ServiceError) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

/// Validate, fetch, transform once and encode, all under the request timeout.
pub async fn handle_extend_canvas(
    state: &Arc<AppState>,
    body: &[u8],
) -> Result<ExtendCanvasResponse, ServiceError> {
    let request: ExtendCanvasRequest = serde_json::from_slice(body)
        .map_err(|e| ServiceError::BadRequest(format!("invalid JSON body: {e}")))?;
    // Parameters are checked before any download starts.
    let params = request.params()?.validate()?;
    let source = request.source()?;
    let format = request.output_format.unwrap_or_default();

    let secs = state.config.request_timeout_secs;
    match tokio::time::timeout(
        Duration::from_secs(secs),
        run_job(Arc::clone(state), source, params, format),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout_secs = secs, "Request timed out");
            Err(ServiceError::Timeout(secs))
        }
    }
}

async fn run_job(
    state: Arc<AppState>,
    source: ImageSource,
    params: ValidatedParams,
    format: OutputFormat,
) -> Result<ExtendCanvasResponse, ServiceError> {
    let fetched = fetch(source, &state.client, &state.config).await?;
    let permit = Arc::clone(&state.permits)
        .acquire_owned()
        .await
        .map_err(|e| ServiceError::Pipeline(Error::resource(e)))?;
    let jpeg_quality = state.config.jpeg_quality;

    // The permit and the spooled source move into the blocking job, so an abandoned
    // request keeps its slot until the transform really ends.
    let processed = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        let raster = fetched.decode()?;
        drop(fetched);
        extend_and_encode(&raster, &params, format, jpeg_quality)
    })
    .await
    .map_err(|e| ServiceError::Pipeline(Error::resource(e)))??;

    info!(
        width = processed.width,
        height = processed.height,
        threshold = processed.report.threshold.value,
        %format,
        bytes = processed.bytes.len(),
        "Extended canvas"
    );
    Ok(ExtendCanvasResponse {
        success: true,
        processed_image: general_purpose::STANDARD.encode(&processed.bytes),
        width: processed.width,
        height: processed.height,
        threshold: processed.report.threshold.value,
        auto_threshold: processed.report.threshold.auto,
        format,
        mime_type: format.mime_type().to_string(),
    })
}
