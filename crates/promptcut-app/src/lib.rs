#![warn(missing_docs)]
//! # promptcut-app
//!
//! ## Purpose
//! Orchestrates upload, catalog synchronization, generation, and presentation
//! state for `promptcut`.
//!
//! ## Responsibilities
//! - Sequence the upload -> catalog -> analyze -> generate flow against the
//!   remote editing service.
//! - Funnel every result through the project store reducers.
//! - Discard completions that belong to a torn-down controller epoch.
//! - Project store snapshots into renderable view state.
//!
//! ## Data flow
//! User action -> transfer/generation client call -> completion applied
//! through [`ProjectController`] with an epoch token -> store reducer ->
//! view projection.
//!
//! ## Ownership and lifetimes
//! The controller exclusively owns the [`promptcut_core::ProjectStore`];
//! collaborators receive snapshots and submit events, never direct field
//! access.
//!
//! ## Error model
//! Subsystem failures are wrapped in [`AppError`]; nothing here is fatal, and
//! every error path returns the store to a previously valid state.

use std::sync::Arc;

use promptcut_catalog::{CatalogClient, CatalogError};
use promptcut_core::{
    CoreError, GenerationTransition, LockPolicy, OutputArtifact, ProjectState, ProjectStore,
    UploadOutcome, UploadState, UploadTask, VideoAsset,
};
use promptcut_generate::{
    AnalysisResult, GenerationController, GenerationError, ProgressPolicy,
};
use promptcut_service_contract::{AnalyzeRequest, EditRequest};
use promptcut_transfer::{TransferClient, TransferError};
use promptcut_ui::{ShellCapabilities, StageStatus, ViewState, generation_stage, project_view};
use thiserror::Error;

/// Build-time application version loaded from root `VERSION` file.
pub const APP_VERSION: &str = env!("PROMPTCUT_VERSION");

/// Returns the app version sourced from root `VERSION`.
pub fn app_version() -> &'static str {
    APP_VERSION
}

/// Opaque token tying an in-flight operation to a controller epoch.
///
/// Completions carrying a stale token are discarded rather than applied to a
/// store the operation no longer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionToken {
    epoch: u64,
}

/// A planned generation the shell still has to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    /// Token guarding the eventual completion.
    pub token: CompletionToken,
    /// Wire request ready for the transport.
    pub request: EditRequest,
}

/// A planned analysis the shell still has to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAnalysis {
    /// Token guarding the eventual completion.
    pub token: CompletionToken,
    /// Asset the analysis targets.
    pub asset_id: String,
    /// Wire request ready for the transport.
    pub request: AnalyzeRequest,
}

/// Consolidated runtime status snapshot for simple UI projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeStatus {
    /// Upload stage status as human-readable string.
    pub upload: String,
    /// Catalog stage status.
    pub catalog: String,
    /// Generation stage status.
    pub generation: String,
    /// Whether the project accepts further generate submissions.
    pub generate_allowed: bool,
}

/// Orchestration controller; the only writer of project state.
pub struct ProjectController {
    store: ProjectStore,
    transfer: TransferClient,
    catalog: CatalogClient,
    generation: GenerationController,
    progress_policy: ProgressPolicy,
    capabilities: Option<Arc<dyn ShellCapabilities>>,
    epoch: u64,
    progress_tick: u64,
    tasks: Vec<UploadTask>,
    upload_stage: StageStatus,
    catalog_stage: StageStatus,
    notices: Vec<String>,
}

impl ProjectController {
    /// Creates a controller from pre-built component clients.
    pub fn new(
        transfer: TransferClient,
        catalog: CatalogClient,
        generation: GenerationController,
        lock_policy: LockPolicy,
    ) -> Self {
        Self {
            store: ProjectStore::new(lock_policy),
            transfer,
            catalog,
            generation,
            progress_policy: ProgressPolicy::new(),
            capabilities: None,
            epoch: 0,
            progress_tick: 0,
            tasks: Vec::new(),
            upload_stage: StageStatus::Idle,
            catalog_stage: StageStatus::Idle,
            notices: Vec::new(),
        }
    }

    /// Attaches the imperative shell capabilities.
    pub fn with_capabilities(mut self, capabilities: Arc<dyn ShellCapabilities>) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    /// Returns an immutable snapshot of project state.
    pub fn snapshot(&self) -> ProjectState {
        self.store.snapshot()
    }

    /// Returns the token guarding completions for the current epoch.
    pub fn current_token(&self) -> CompletionToken {
        CompletionToken { epoch: self.epoch }
    }

    /// Invalidates every pending completion, as on shell teardown/remount.
    ///
    /// A running generation slot is failed so it becomes resubmittable; the
    /// stale result, if it ever arrives, carries an old token and is
    /// discarded.
    pub fn reset_pending(&mut self) {
        self.epoch += 1;
        if self.store.snapshot().generation_running() {
            // Slot owner went away; nobody will complete it.
            let _ = self
                .store
                .apply_generation_transition(GenerationTransition::Failed(
                    "operation abandoned by shell teardown".to_string(),
                ));
        }
    }

    /// Performs the initial catalog refresh.
    pub fn initialize(&mut self) {
        self.refresh_catalog();
    }

    /// Asks the shell to open the hidden file picker.
    pub fn open_import_picker(&self) {
        if let Some(capabilities) = &self.capabilities {
            capabilities.open_file_picker();
        }
    }

    /// Asks the shell to enter fullscreen playback.
    pub fn preview_fullscreen(&self) {
        if let Some(capabilities) = &self.capabilities {
            capabilities.request_fullscreen();
        }
    }

    /// Imports selected files as independent sequential uploads.
    ///
    /// Each upload resolution, success or failure, is followed by a catalog
    /// refresh so any asset that did land server-side is picked up. A failure
    /// at position `k` never prevents files `k+1..n` from being attempted.
    pub fn import_files(
        &mut self,
        files: Vec<(String, Vec<u8>)>,
    ) -> Vec<Result<VideoAsset, AppError>> {
        let token = self.current_token();
        let mut results = Vec::with_capacity(files.len());
        self.upload_stage = StageStatus::Running;

        for (file_name, bytes) in files {
            let mut task = UploadTask::new(file_name, bytes);
            let outcome = self.transfer.upload_file(&mut task);

            if token == self.current_token() {
                match &outcome {
                    Ok(asset) => {
                        self.store
                            .apply_upload_result(UploadOutcome::Succeeded(asset.clone()));
                    }
                    Err(error) => {
                        self.store.apply_upload_result(UploadOutcome::Failed {
                            file_name: task.file_name.clone(),
                            reason: error.to_string(),
                        });
                        self.notices
                            .push(format!("upload of {} failed: {error}", task.file_name));
                    }
                }
                self.refresh_catalog();
            }

            self.tasks.push(task);
            results.push(outcome.map_err(AppError::Transfer));
        }

        self.upload_stage = if self
            .tasks
            .iter()
            .any(|task| task.state == UploadState::Failed)
        {
            StageStatus::Degraded
        } else {
            StageStatus::Healthy
        };
        results
    }

    /// Refreshes the catalog with full-replace reconciliation.
    ///
    /// On failure the prior catalog is retained and a non-fatal notice is
    /// recorded.
    pub fn refresh_catalog(&mut self) {
        match self.catalog.refresh() {
            Ok(assets) => {
                self.store.apply_catalog(assets);
                self.catalog_stage = StageStatus::Healthy;
            }
            Err(error) => {
                self.catalog_stage = StageStatus::Degraded;
                self.notices.push(format!("catalog refresh failed: {error}"));
            }
        }
    }

    /// Submits an edit/generate request; the slot transitions to running.
    ///
    /// # Errors
    /// Rejects with [`GenerationError::AlreadyRunning`] while a request is in
    /// flight, [`GenerationError::NoAssets`] on an empty catalog, and
    /// [`GenerationError::ProjectLocked`] once the project is frozen. The
    /// rejected submission leaves state untouched.
    pub fn begin_generate(
        &mut self,
        prompt: &str,
        captions_requested: bool,
    ) -> Result<PendingEdit, AppError> {
        let snapshot = self.store.snapshot();
        let (slot, request) = self
            .generation
            .plan_generate(&snapshot, prompt, captions_requested)
            .map_err(AppError::Generation)?;

        self.store
            .apply_generation_transition(GenerationTransition::Submitted(slot))
            .map_err(AppError::Core)?;
        self.progress_tick = 0;

        Ok(PendingEdit {
            token: self.current_token(),
            request,
        })
    }

    /// Applies the terminal result of a pending edit.
    ///
    /// Stale-epoch completions are discarded: the store is left exactly as it
    /// was, and the artifact is dropped.
    ///
    /// # Errors
    /// Propagates reducer errors for current-epoch completions.
    pub fn complete_generate(
        &mut self,
        token: CompletionToken,
        result: &Result<OutputArtifact, GenerationError>,
    ) -> Result<(), AppError> {
        if token != self.current_token() {
            return Ok(());
        }

        let transition = match result {
            Ok(artifact) => GenerationTransition::Succeeded(artifact.clone()),
            Err(error) => {
                self.notices.push(format!("generation failed: {error}"));
                GenerationTransition::Failed(error.to_string())
            }
        };
        self.store
            .apply_generation_transition(transition)
            .map_err(AppError::Core)
    }

    /// Convenience wrapper: submit, execute, and complete one edit request.
    ///
    /// # Errors
    /// Returns the submission or remote error; the store ends in a valid
    /// state either way.
    pub fn generate_blocking(
        &mut self,
        prompt: &str,
        captions_requested: bool,
    ) -> Result<OutputArtifact, AppError> {
        let pending = self.begin_generate(prompt, captions_requested)?;
        let result = self.generation.execute_edit(&pending.request);
        self.complete_generate(pending.token, &result)?;
        result.map_err(AppError::Generation)
    }

    /// Submits an analyze request for one catalog asset.
    ///
    /// # Errors
    /// Rejects with [`GenerationError::UnknownAsset`] for ids missing from
    /// the catalog and [`GenerationError::AlreadyRunning`] while any request
    /// is in flight.
    pub fn begin_analyze(
        &mut self,
        asset_id: &str,
        prompt: &str,
    ) -> Result<PendingAnalysis, AppError> {
        let snapshot = self.store.snapshot();
        let (slot, request) = self
            .generation
            .plan_analyze(&snapshot, asset_id, prompt)
            .map_err(AppError::Generation)?;

        self.store
            .apply_generation_transition(GenerationTransition::Submitted(slot))
            .map_err(AppError::Core)?;
        self.progress_tick = 0;

        Ok(PendingAnalysis {
            token: self.current_token(),
            asset_id: asset_id.to_string(),
            request,
        })
    }

    /// Applies the terminal result of a pending analysis.
    ///
    /// # Errors
    /// Propagates reducer errors for current-epoch completions.
    pub fn complete_analyze(
        &mut self,
        token: CompletionToken,
        result: &Result<AnalysisResult, GenerationError>,
    ) -> Result<(), AppError> {
        if token != self.current_token() {
            return Ok(());
        }

        let transition = match result {
            Ok(_) => GenerationTransition::AnalysisSucceeded,
            Err(error) => {
                self.notices.push(format!("analysis failed: {error}"));
                GenerationTransition::Failed(error.to_string())
            }
        };
        self.store
            .apply_generation_transition(transition)
            .map_err(AppError::Core)
    }

    /// Convenience wrapper: submit, execute, and complete one analysis.
    ///
    /// # Errors
    /// Returns the submission or remote error.
    pub fn analyze_blocking(
        &mut self,
        asset_id: &str,
        prompt: &str,
    ) -> Result<AnalysisResult, AppError> {
        let pending = self.begin_analyze(asset_id, prompt)?;
        let result = self
            .generation
            .execute_analyze(&pending.asset_id, &pending.request);
        self.complete_analyze(pending.token, &result)?;
        result.map_err(AppError::Generation)
    }

    /// Advances synthesized progress by one tick while a request runs.
    ///
    /// Safe to call at any time; ticks outside a running phase are ignored.
    pub fn tick(&mut self) {
        if !self.store.snapshot().generation_running() {
            return;
        }
        self.progress_tick += 1;
        let progress = self.progress_policy.progress_at_tick(self.progress_tick);
        // Running phase was just checked; the reducer clamps regressions.
        let _ = self
            .store
            .apply_generation_transition(GenerationTransition::Progress(progress));
    }

    /// Projects the current snapshot into renderable view state.
    pub fn view(&self) -> ViewState {
        let import_busy = self
            .tasks
            .iter()
            .any(|task| task.state == UploadState::InFlight);
        project_view(&self.store.snapshot(), import_busy)
    }

    /// Returns the flat runtime status snapshot.
    pub fn runtime_status(&self) -> RuntimeStatus {
        let snapshot = self.store.snapshot();
        RuntimeStatus {
            upload: format!("{:?}", self.upload_stage),
            catalog: format!("{:?}", self.catalog_stage),
            generation: format!("{:?}", generation_stage(&snapshot)),
            generate_allowed: !snapshot.generation_running() && !snapshot.locked,
        }
    }

    /// Drains accumulated non-fatal notices for user-visible reporting.
    pub fn take_notices(&mut self) -> Vec<String> {
        std::mem::take(&mut self.notices)
    }

    /// Returns the upload task history, newest last.
    pub fn upload_tasks(&self) -> &[UploadTask] {
        &self.tasks
    }
}

/// App integration error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Transfer client error for one file.
    #[error("transfer error: {0}")]
    Transfer(TransferError),
    /// Catalog refresh error; non-fatal, prior catalog retained.
    #[error("catalog error: {0}")]
    Catalog(CatalogError),
    /// Generation planning or remote error.
    #[error("generation error: {0}")]
    Generation(GenerationError),
    /// Reducer rejected a transition.
    #[error("state error: {0}")]
    Core(CoreError),
}
