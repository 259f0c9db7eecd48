#![warn(missing_docs)]
//! # promptcut-service-contract
//!
//! ## Purpose
//! Defines the remote editing service HTTP schema and client-side mapping
//! helpers.
//!
//! ## Responsibilities
//! - Mirror the service request/response JSON bodies bit-exactly.
//! - Validate the service base origin policy (http/https URL).
//! - Resolve relative output paths into fetchable absolute URIs.
//!
//! ## Data flow
//! Raw JSON response -> typed DTO -> component clients (transfer, catalog,
//! generation) -> project store events.
//!
//! ## Ownership and lifetimes
//! Parsed values are owned structs to avoid borrowing from transient network
//! buffers.
//!
//! ## Error model
//! Invalid origins, malformed paths, and decode failures return
//! [`ContractError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Upload endpoint path (multipart form field `file`, single binary).
pub const UPLOAD_PATH: &str = "/upload-video";
/// Catalog listing endpoint path.
pub const LIST_PATH: &str = "/list-videos";
/// Analyze endpoint path prefix; the asset id is appended as a path segment.
pub const ANALYZE_PATH_PREFIX: &str = "/analyze-video";
/// Edit/generate endpoint path.
pub const EDIT_PATH: &str = "/edit-video";

/// Fixed suggested filename for output downloads.
pub const DOWNLOAD_NAME: &str = "output.mp4";

/// Response body of `POST /upload-video`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadVideoResponse {
    /// Server-assigned opaque identifier.
    pub video_id: String,
    /// Canonical filename as stored server-side.
    pub filename: String,
    /// Server-side storage path; informational only.
    #[serde(default)]
    pub path: String,
}

/// One entry of the `GET /list-videos` response array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoSummary {
    /// Server-assigned opaque identifier.
    pub video_id: String,
    /// Canonical filename.
    pub filename: String,
}

/// Request body of `POST /analyze-video/{video_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Natural-language editing prompt.
    pub prompt: String,
}

/// One cut instruction produced by server-side analysis.
///
/// The client treats instructions as opaque display data; the server persists
/// them and replays them at edit time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CutInstruction {
    /// Cut start in seconds.
    pub start: f64,
    /// Cut end in seconds.
    pub end: f64,
    /// Optional caption burned in when captions are requested.
    #[serde(default)]
    pub caption: Option<String>,
}

/// Response body of `POST /analyze-video/{video_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    /// Cut instructions derived from the prompt.
    #[serde(default)]
    pub instructions: Vec<CutInstruction>,
}

/// Request body of `POST /edit-video`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditRequest {
    /// Asset ids to splice, in catalog order.
    pub video_ids: Vec<String>,
    /// Natural-language editing prompt.
    pub prompt: String,
    /// Whether captions should be burned into the output.
    pub add_captions: bool,
}

/// Response body of `POST /edit-video`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditResponse {
    /// Output path relative to the service base origin.
    pub output_video: String,
}

/// Validates the remote service base origin.
///
/// # Errors
/// Returns [`ContractError::InvalidOrigin`] when the value is not an absolute
/// http/https URL.
pub fn validate_base_origin(base_origin: &str) -> Result<Url, ContractError> {
    let parsed = Url::parse(base_origin)
        .map_err(|error| ContractError::InvalidOrigin(format!("invalid service url: {error}")))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ContractError::InvalidOrigin(
            "service origin must use http or https".to_string(),
        ));
    }

    Ok(parsed)
}

/// Builds the analyze endpoint path for one asset id.
pub fn analyze_path(video_id: &str) -> String {
    format!("{ANALYZE_PATH_PREFIX}/{video_id}")
}

/// Resolves a relative `output_video` path against the service base origin.
///
/// # Errors
/// Returns [`ContractError::InvalidOrigin`] for bad origins and
/// [`ContractError::InvalidOutputPath`] when the relative path does not join
/// cleanly.
pub fn resolve_output_uri(base_origin: &str, output_video: &str) -> Result<String, ContractError> {
    let base = validate_base_origin(base_origin)?;

    if output_video.trim().is_empty() {
        return Err(ContractError::InvalidOutputPath(
            "output path is empty".to_string(),
        ));
    }

    let joined = base.join(output_video).map_err(|error| {
        ContractError::InvalidOutputPath(format!("output path does not resolve: {error}"))
    })?;

    Ok(joined.to_string())
}

/// Decodes a typed response body from raw JSON.
///
/// # Errors
/// Returns [`ContractError::Decode`] for invalid JSON.
pub fn decode_response<T: for<'de> Deserialize<'de>>(raw: &str) -> Result<T, ContractError> {
    serde_json::from_str(raw).map_err(ContractError::Decode)
}

/// Service contract errors.
#[derive(Debug, Error)]
pub enum ContractError {
    /// Base origin violates contract requirements.
    #[error("invalid service origin: {0}")]
    InvalidOrigin(String),
    /// Output path cannot be resolved against the origin.
    #[error("invalid output path: {0}")]
    InvalidOutputPath(String),
    /// JSON decode failure.
    #[error("contract decode failure: {0}")]
    Decode(#[from] serde_json::Error),
}
