#![warn(missing_docs)]
//! # promptcut-transfer
//!
//! ## Purpose
//! Implements the single-file upload client for the remote editing service.
//!
//! ## Responsibilities
//! - Execute one multipart transfer per selected file through an injectable
//!   transport abstraction.
//! - Drive upload task lifecycle transitions exactly once per file.
//! - Report per-file results so a failure never short-circuits the batch.
//!
//! ## Data flow
//! UI file selection -> [`UploadTask`] -> [`TransferClient::upload_file`]
//! through [`TransferTransport`] -> server-assigned [`VideoAsset`] -> project
//! store event.
//!
//! ## Ownership and lifetimes
//! Response values are owned so transport buffers never outlive a call.
//!
//! ## Error model
//! Endpoint policy violations, HTTP rejections, and transport failures are
//! surfaced as [`TransferError`] per file; callers treat HTTP-level and
//! transport-level failures identically.
//!
//! ## Example
//! ```rust,ignore
//! let client = TransferClient::new("http://localhost:8000", transport)?;
//! let results = client.upload_batch(&mut tasks);
//! ```

use std::sync::Arc;

use promptcut_core::{CoreError, UploadTask, VideoAsset};
use promptcut_service_contract::{UPLOAD_PATH, UploadVideoResponse, validate_base_origin};
use thiserror::Error;

/// Abstract transport used by the transfer client.
///
/// The single method models `POST /upload-video` with multipart form field
/// `file`; implementations own the actual wire mechanics.
pub trait TransferTransport: Send + Sync {
    /// Sends one file to the upload endpoint.
    ///
    /// # Errors
    /// Returns [`TransferError::Http`] for non-success statuses and
    /// [`TransferError::Transport`] for network-level failures.
    fn upload(
        &self,
        endpoint: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<UploadVideoResponse, TransferError>;
}

/// Upload client that validates the service origin and executes transfers.
#[derive(Clone)]
pub struct TransferClient {
    endpoint: String,
    transport: Arc<dyn TransferTransport>,
}

impl TransferClient {
    /// Creates a validated transfer client.
    ///
    /// # Errors
    /// Returns [`TransferError::InvalidEndpoint`] when the base origin is not
    /// an absolute http/https URL.
    pub fn new(
        base_origin: impl Into<String>,
        transport: Arc<dyn TransferTransport>,
    ) -> Result<Self, TransferError> {
        let base_origin = base_origin.into();
        let base = validate_base_origin(&base_origin)
            .map_err(|error| TransferError::InvalidEndpoint(error.to_string()))?;
        let endpoint = base
            .join(UPLOAD_PATH)
            .map_err(|error| TransferError::InvalidEndpoint(error.to_string()))?
            .to_string();

        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Uploads one file, driving the task through its lifecycle.
    ///
    /// The server-assigned identifier and canonical filename overwrite any
    /// client-guessed metadata. Nothing is retried automatically.
    ///
    /// # Errors
    /// Returns [`TransferError`] on rejection or transport failure; the task
    /// ends `Failed` with the reason recorded.
    pub fn upload_file(&self, task: &mut UploadTask) -> Result<VideoAsset, TransferError> {
        task.start().map_err(TransferError::Task)?;

        match self
            .transport
            .upload(&self.endpoint, &task.file_name, &task.bytes)
        {
            Ok(response) => match asset_from_response(response) {
                Ok(asset) => {
                    task.finish(None).map_err(TransferError::Task)?;
                    Ok(asset)
                }
                Err(error) => {
                    task.finish(Some(error.to_string()))
                        .map_err(TransferError::Task)?;
                    Err(error)
                }
            },
            Err(error) => {
                task.finish(Some(error.to_string()))
                    .map_err(TransferError::Task)?;
                Err(error)
            }
        }
    }

    /// Uploads selected files as independent sequential transfers.
    ///
    /// A failure at position `k` never prevents files `k+1..n` from being
    /// attempted; results are reported per file, never aggregated.
    pub fn upload_batch(
        &self,
        tasks: &mut [UploadTask],
    ) -> Vec<Result<VideoAsset, TransferError>> {
        tasks.iter_mut().map(|task| self.upload_file(task)).collect()
    }

    /// Returns the resolved upload endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn asset_from_response(response: UploadVideoResponse) -> Result<VideoAsset, TransferError> {
    if response.video_id.trim().is_empty() {
        return Err(TransferError::InvalidResponse(
            "response missing video id".to_string(),
        ));
    }

    Ok(VideoAsset {
        id: response.video_id,
        filename: response.filename,
        source_path: response.path,
    })
}

/// Coarse failure classification for user-facing messaging.
///
/// Classification never drives automatic retry; failed uploads stay failed
/// until the user selects the file again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Transient server/network condition; reselecting may succeed.
    Retriable,
    /// The service rejected the file; reselecting the same file will not help.
    Permanent,
}

/// Classifies a transfer error for messaging purposes.
pub fn classify_transfer_error(error: &TransferError) -> FailureClass {
    match error {
        TransferError::Http { status } if *status >= 500 => FailureClass::Retriable,
        TransferError::Transport(_) => FailureClass::Retriable,
        _ => FailureClass::Permanent,
    }
}

/// Errors produced by the transfer client.
#[derive(Debug, Error)]
pub enum TransferError {
    /// Service origin violates contract requirements.
    #[error("invalid upload endpoint: {0}")]
    InvalidEndpoint(String),
    /// Server rejected the transfer with a non-success status.
    #[error("upload rejected with http status {status}")]
    Http {
        /// HTTP status code returned by the service.
        status: u16,
    },
    /// Network-level failure before any HTTP status was observed.
    #[error("upload transport failure: {0}")]
    Transport(String),
    /// Response payload violated the upload contract.
    #[error("invalid upload response: {0}")]
    InvalidResponse(String),
    /// Upload task was not in a dispatchable state.
    #[error("upload task lifecycle error: {0}")]
    Task(CoreError),
}
