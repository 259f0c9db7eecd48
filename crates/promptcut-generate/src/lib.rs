#![warn(missing_docs)]
//! # promptcut-generate
//!
//! ## Purpose
//! Owns the analyze/edit request lifecycle against the remote editing service.
//!
//! ## Responsibilities
//! - Validate submission preconditions (non-empty catalog, known asset id,
//!   no running request, project not locked).
//! - Execute analyze and edit calls through an injectable transport.
//! - Synthesize deterministic, monotone progress without any UI timer.
//!
//! ## Data flow
//! User submit -> [`GenerationController::plan_generate`] /
//! [`GenerationController::plan_analyze`] against a state snapshot ->
//! `Submitted` store event -> transport call -> `Succeeded`/`Failed` store
//! event.
//!
//! ## Ownership and lifetimes
//! The controller holds no request state of its own; the project store's
//! generation slot is the single source of truth, so precondition checks take
//! a state snapshot instead of consulting a duplicate flag.
//!
//! ## Error model
//! Precondition violations and remote failures are surfaced as
//! [`GenerationError`]; every failure path leaves the slot resubmittable.

use std::sync::Arc;

use promptcut_core::{GenerationRequest, OutputArtifact, ProjectState};
use promptcut_service_contract::{
    AnalyzeRequest, AnalyzeResponse, DOWNLOAD_NAME, EDIT_PATH, EditRequest, EditResponse,
    analyze_path, resolve_output_uri, validate_base_origin,
};
use thiserror::Error;

/// Abstract transport for analyze/edit calls.
pub trait GenerationTransport: Send + Sync {
    /// Sends `POST /analyze-video/{video_id}`.
    ///
    /// # Errors
    /// Returns [`GenerationError::Remote`] or [`GenerationError::Transport`].
    fn analyze(
        &self,
        endpoint: &str,
        request: &AnalyzeRequest,
    ) -> Result<AnalyzeResponse, GenerationError>;

    /// Sends `POST /edit-video`.
    ///
    /// # Errors
    /// Returns [`GenerationError::Remote`] or [`GenerationError::Transport`].
    fn edit(&self, endpoint: &str, request: &EditRequest) -> Result<EditResponse, GenerationError>;
}

/// Result of a successful analyze call.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// Asset the analysis belongs to.
    pub asset_id: String,
    /// Parsed response with cut instructions.
    pub response: AnalyzeResponse,
}

/// Controller owning analyze/edit execution and submission policy.
///
/// Precondition checks run against a [`ProjectState`] snapshot; the store
/// reducer re-enforces single-flight, so a stale snapshot can never let two
/// running requests coexist.
#[derive(Clone)]
pub struct GenerationController {
    base_origin: String,
    transport: Arc<dyn GenerationTransport>,
}

impl GenerationController {
    /// Creates a validated generation controller.
    ///
    /// # Errors
    /// Returns [`GenerationError::InvalidEndpoint`] when the base origin is
    /// not an absolute http/https URL.
    pub fn new(
        base_origin: impl Into<String>,
        transport: Arc<dyn GenerationTransport>,
    ) -> Result<Self, GenerationError> {
        let base_origin = base_origin.into();
        validate_base_origin(&base_origin)
            .map_err(|error| GenerationError::InvalidEndpoint(error.to_string()))?;

        Ok(Self {
            base_origin,
            transport,
        })
    }

    /// Validates an edit submission and plans the request pair.
    ///
    /// The UI disables the submit affordance while a request runs, but the
    /// check here holds regardless of UI state; a second submission is
    /// rejected immediately, never queued.
    ///
    /// # Errors
    /// - [`GenerationError::AlreadyRunning`] while a request is in flight.
    /// - [`GenerationError::NoAssets`] for an empty catalog.
    /// - [`GenerationError::ProjectLocked`] once the lock-after-first-use
    ///   policy has frozen the project.
    pub fn plan_generate(
        &self,
        state: &ProjectState,
        prompt: &str,
        captions_requested: bool,
    ) -> Result<(GenerationRequest, EditRequest), GenerationError> {
        if state.generation_running() {
            return Err(GenerationError::AlreadyRunning);
        }
        if state.locked {
            return Err(GenerationError::ProjectLocked);
        }
        if state.catalog.is_empty() {
            return Err(GenerationError::NoAssets);
        }

        let video_ids: Vec<String> = state.catalog.iter().map(|asset| asset.id.clone()).collect();
        let slot = GenerationRequest::running_edit(video_ids.clone(), prompt, captions_requested);
        let wire = EditRequest {
            video_ids,
            prompt: prompt.to_string(),
            add_captions: captions_requested,
        };
        Ok((slot, wire))
    }

    /// Validates an analyze submission for one catalog asset.
    ///
    /// # Errors
    /// - [`GenerationError::AlreadyRunning`] while a request is in flight.
    /// - [`GenerationError::UnknownAsset`] when the id is not in the catalog.
    pub fn plan_analyze(
        &self,
        state: &ProjectState,
        asset_id: &str,
        prompt: &str,
    ) -> Result<(GenerationRequest, AnalyzeRequest), GenerationError> {
        if state.generation_running() {
            return Err(GenerationError::AlreadyRunning);
        }
        if !state.catalog.iter().any(|asset| asset.id == asset_id) {
            return Err(GenerationError::UnknownAsset(asset_id.to_string()));
        }

        let slot = GenerationRequest::running_analysis(asset_id, prompt);
        let wire = AnalyzeRequest {
            prompt: prompt.to_string(),
        };
        Ok((slot, wire))
    }

    /// Executes a planned edit request and resolves the output artifact.
    ///
    /// # Errors
    /// Propagates transport/remote failures; rejects blank output paths as
    /// [`GenerationError::Remote`].
    pub fn execute_edit(&self, request: &EditRequest) -> Result<OutputArtifact, GenerationError> {
        let endpoint = self.endpoint(EDIT_PATH);
        let response = self.transport.edit(&endpoint, request)?;
        let uri = resolve_output_uri(&self.base_origin, &response.output_video)
            .map_err(|error| GenerationError::Remote(error.to_string()))?;

        Ok(OutputArtifact {
            uri,
            download_name: DOWNLOAD_NAME.to_string(),
        })
    }

    /// Executes a planned analyze request for one asset.
    ///
    /// # Errors
    /// Propagates transport/remote failures.
    pub fn execute_analyze(
        &self,
        asset_id: &str,
        request: &AnalyzeRequest,
    ) -> Result<AnalysisResult, GenerationError> {
        let endpoint = self.endpoint(&analyze_path(asset_id));
        let response = self.transport.analyze(&endpoint, request)?;

        Ok(AnalysisResult {
            asset_id: asset_id.to_string(),
            response,
        })
    }

    /// Returns the configured service base origin.
    pub fn base_origin(&self) -> &str {
        &self.base_origin
    }

    fn endpoint(&self, path: &str) -> String {
        // Origin was validated at construction; joining a known path suffix
        // cannot fail.
        format!("{}{path}", self.base_origin.trim_end_matches('/'))
    }
}

/// Deterministic progress synthesis for a running request.
///
/// The remote service reports no incremental progress, so the controller
/// approximates it as a pure function of elapsed ticks. Values are monotone,
/// capped below 100 while running; exactly 100 is reserved for the store's
/// `Succeeded` transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressPolicy {
    /// Progress points added per tick.
    pub step_per_tick: u8,
}

impl ProgressPolicy {
    /// Default cadence: roughly five points per tick.
    pub fn new() -> Self {
        Self { step_per_tick: 5 }
    }

    /// Returns the synthesized progress after `tick` elapsed ticks.
    pub fn progress_at_tick(&self, tick: u64) -> u8 {
        let raw = tick.saturating_mul(self.step_per_tick as u64);
        raw.min(99) as u8
    }
}

impl Default for ProgressPolicy {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors produced by generation planning and execution.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// Service origin violates contract requirements.
    #[error("invalid generation endpoint: {0}")]
    InvalidEndpoint(String),
    /// A request is already running; submission rejected, never queued.
    #[error("a generation request is already running")]
    AlreadyRunning,
    /// Generate requires at least one catalog asset.
    #[error("no video assets available to generate from")]
    NoAssets,
    /// Analyze target is not present in the catalog.
    #[error("unknown video asset: {0}")]
    UnknownAsset(String),
    /// Lock-after-first-use policy has frozen the project.
    #[error("project is locked after a successful generation")]
    ProjectLocked,
    /// Remote service reported a failure during analyze/generate.
    #[error("generation remote failure: {0}")]
    Remote(String),
    /// Network-level failure; treated identically to a remote failure.
    #[error("generation transport failure: {0}")]
    Transport(String),
}
