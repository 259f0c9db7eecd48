#![warn(missing_docs)]
//! # promptcut-catalog
//!
//! ## Purpose
//! Keeps the client catalog consistent with the remote service's ground truth.
//!
//! ## Responsibilities
//! - Fetch the authoritative video listing through an injectable transport.
//! - Deliver each listing as a full replacement, never an incremental merge.
//!
//! ## Data flow
//! Controller init / upload resolution -> [`CatalogClient::refresh`] through
//! [`CatalogTransport`] -> full asset sequence -> `apply_catalog` store event.
//!
//! ## Error model
//! Refresh failures return [`CatalogError`]; callers retain the prior catalog
//! and surface the failure as a non-fatal notice.

use std::sync::Arc;

use promptcut_core::VideoAsset;
use promptcut_service_contract::{LIST_PATH, VideoSummary, validate_base_origin};
use thiserror::Error;

/// Abstract transport used by the catalog client.
pub trait CatalogTransport: Send + Sync {
    /// Fetches the complete video listing from `GET /list-videos`.
    ///
    /// # Errors
    /// Returns [`CatalogError::Http`] for non-success statuses and
    /// [`CatalogError::Transport`] for network-level failures.
    fn list(&self, endpoint: &str) -> Result<Vec<VideoSummary>, CatalogError>;
}

/// Catalog client performing full-replace reconciliation fetches.
#[derive(Clone)]
pub struct CatalogClient {
    endpoint: String,
    transport: Arc<dyn CatalogTransport>,
}

impl CatalogClient {
    /// Creates a validated catalog client.
    ///
    /// # Errors
    /// Returns [`CatalogError::InvalidEndpoint`] when the base origin is not
    /// an absolute http/https URL.
    pub fn new(
        base_origin: impl Into<String>,
        transport: Arc<dyn CatalogTransport>,
    ) -> Result<Self, CatalogError> {
        let base_origin = base_origin.into();
        let base = validate_base_origin(&base_origin)
            .map_err(|error| CatalogError::InvalidEndpoint(error.to_string()))?;
        let endpoint = base
            .join(LIST_PATH)
            .map_err(|error| CatalogError::InvalidEndpoint(error.to_string()))?
            .to_string();

        Ok(Self {
            endpoint,
            transport,
        })
    }

    /// Fetches the authoritative catalog.
    ///
    /// The returned sequence replaces the store catalog wholesale, which makes
    /// refresh arrival order irrelevant: interleaved refreshes triggered by
    /// concurrent uploads all converge on server state.
    ///
    /// # Errors
    /// Returns [`CatalogError`] on failure; the caller keeps the prior
    /// catalog unchanged.
    pub fn refresh(&self) -> Result<Vec<VideoAsset>, CatalogError> {
        let summaries = self.transport.list(&self.endpoint)?;
        Ok(summaries.into_iter().map(asset_from_summary).collect())
    }

    /// Returns the resolved listing endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

fn asset_from_summary(summary: VideoSummary) -> VideoAsset {
    VideoAsset {
        id: summary.video_id,
        filename: summary.filename,
        source_path: String::new(),
    }
}

/// Errors produced by catalog refresh.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Service origin violates contract requirements.
    #[error("invalid listing endpoint: {0}")]
    InvalidEndpoint(String),
    /// Server rejected the listing request.
    #[error("listing rejected with http status {status}")]
    Http {
        /// HTTP status code returned by the service.
        status: u16,
    },
    /// Network-level failure before any HTTP status was observed.
    #[error("listing transport failure: {0}")]
    Transport(String),
}
