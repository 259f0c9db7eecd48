#![warn(missing_docs)]
//! # promptcut-core
//!
//! ## Purpose
//! Defines the pure project data model and the reducer-owned state store used
//! across the `promptcut` workspace.
//!
//! ## Responsibilities
//! - Represent video assets, upload tasks, generation requests, and output
//!   artifacts.
//! - Own the single `ProjectState` aggregate behind named reducer functions.
//! - Enforce the cross-cutting invariants: at most one running generation,
//!   irreversible lock-after-first-use, full-replace catalog reconciliation.
//!
//! ## Data flow
//! Transfer/catalog/generation components produce events; the app orchestrator
//! funnels every event through [`ProjectStore`] reducers; presentation code
//! reads immutable [`ProjectState`] snapshots.
//!
//! ## Ownership and lifetimes
//! State values are owned (`String`/`Vec`) so snapshots can be handed to
//! presentation code without borrowing from the live store.
//!
//! ## Error model
//! Illegal transitions (double-running generation, progress without an active
//! request, out-of-order upload task transitions) return [`CoreError`]
//! variants; no reducer ever leaves the store in a partially applied state.
//!
//! ## Example
//! ```rust
//! use promptcut_core::{LockPolicy, ProjectStore};
//!
//! let store = ProjectStore::new(LockPolicy::AllowResubmission);
//! assert!(store.snapshot().catalog.is_empty());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A video file known to the remote editing service.
///
/// The `id` is opaque and server-assigned; it is the only identity used for
/// catalog membership and generation targeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAsset {
    /// Opaque server-assigned identifier, unique within the catalog.
    pub id: String,
    /// Canonical filename as reported by the server.
    pub filename: String,
    /// Server-side storage path for the raw clip.
    pub source_path: String,
}

/// Lifecycle state of one upload task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadState {
    /// Created at selection time, not yet dispatched.
    Pending,
    /// Network transfer in progress.
    InFlight,
    /// Server accepted the file.
    Succeeded,
    /// Transfer or server rejection; never retried automatically.
    Failed,
}

/// One upload task per file the user selected.
///
/// Tasks transition exactly once `Pending -> InFlight -> {Succeeded|Failed}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    /// Client-side filename at selection time.
    pub file_name: String,
    /// Raw file bytes handed to the transfer client.
    pub bytes: Vec<u8>,
    /// Current lifecycle state.
    pub state: UploadState,
    /// Failure reason, populated only in `Failed`.
    pub error: Option<String>,
}

impl UploadTask {
    /// Creates a pending upload task for one selected file.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
            state: UploadState::Pending,
            error: None,
        }
    }

    /// Marks the task as dispatched.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidUploadTransition`] unless the task is
    /// `Pending`.
    pub fn start(&mut self) -> Result<(), CoreError> {
        if self.state != UploadState::Pending {
            return Err(CoreError::InvalidUploadTransition {
                from: self.state,
                to: UploadState::InFlight,
            });
        }
        self.state = UploadState::InFlight;
        Ok(())
    }

    /// Records the terminal outcome of the transfer.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidUploadTransition`] unless the task is
    /// `InFlight`.
    pub fn finish(&mut self, error: Option<String>) -> Result<(), CoreError> {
        let next = if error.is_some() {
            UploadState::Failed
        } else {
            UploadState::Succeeded
        };
        if self.state != UploadState::InFlight {
            return Err(CoreError::InvalidUploadTransition {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        self.error = error;
        Ok(())
    }
}

/// Phase of the shared generation request slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationPhase {
    /// No request submitted yet.
    Idle,
    /// Request accepted and in flight; blocks further submissions.
    Running,
    /// Request completed and produced the current output.
    Succeeded,
    /// Request failed; slot is free for resubmission.
    Failed,
}

/// Kind of work occupying the shared request slot.
///
/// Analyze and edit requests share one slot so the single-flight guarantee
/// covers both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GenerationKind {
    /// Server-side analysis of one asset; produces no output artifact.
    Analyze,
    /// Splice/caption edit across the catalog; produces the current output.
    Edit,
}

/// The single shared analyze/edit request slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Whether this is an analyze or an edit request.
    pub kind: GenerationKind,
    /// Catalog asset ids targeted by this request.
    pub target_asset_ids: Vec<String>,
    /// Natural-language editing prompt.
    pub prompt_text: String,
    /// Whether the user asked for burned-in captions.
    pub captions_requested: bool,
    /// Current phase of the request.
    pub phase: GenerationPhase,
    /// Progress indicator in `[0, 100]`; exactly 100 only in `Succeeded`.
    pub progress: u8,
}

impl GenerationRequest {
    /// Creates a freshly submitted running edit request at zero progress.
    pub fn running_edit(
        target_asset_ids: Vec<String>,
        prompt_text: impl Into<String>,
        captions_requested: bool,
    ) -> Self {
        Self {
            kind: GenerationKind::Edit,
            target_asset_ids,
            prompt_text: prompt_text.into(),
            captions_requested,
            phase: GenerationPhase::Running,
            progress: 0,
        }
    }

    /// Creates a freshly submitted running analyze request for one asset.
    pub fn running_analysis(asset_id: impl Into<String>, prompt_text: impl Into<String>) -> Self {
        Self {
            kind: GenerationKind::Analyze,
            target_asset_ids: vec![asset_id.into()],
            prompt_text: prompt_text.into(),
            captions_requested: false,
            phase: GenerationPhase::Running,
            progress: 0,
        }
    }
}

/// The spliced, captioned result of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputArtifact {
    /// Absolute URI resolved against the service origin.
    pub uri: String,
    /// Suggested filename for download.
    pub download_name: String,
}

/// Policy controlling whether a successful generation freezes the project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockPolicy {
    /// Project stays editable after a successful generation.
    AllowResubmission,
    /// First successful generation sets `locked` irreversibly.
    LockAfterFirstUse,
}

/// Aggregate project state; the single source of truth for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectState {
    /// Ordered catalog as last reported by the remote service.
    pub catalog: Vec<VideoAsset>,
    /// Shared generation slot; `None` before the first submission.
    pub active_generation: Option<GenerationRequest>,
    /// Current output; superseded wholesale by the next success.
    pub current_output: Option<OutputArtifact>,
    /// Irreversible edit lock under [`LockPolicy::LockAfterFirstUse`].
    pub locked: bool,
}

impl ProjectState {
    fn empty() -> Self {
        Self {
            catalog: Vec::new(),
            active_generation: None,
            current_output: None,
            locked: false,
        }
    }

    /// Returns `true` while a generation request is in flight.
    pub fn generation_running(&self) -> bool {
        matches!(
            &self.active_generation,
            Some(request) if request.phase == GenerationPhase::Running
        )
    }
}

/// Terminal outcome of one upload task, as applied to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// Server accepted the file and assigned an identity.
    Succeeded(VideoAsset),
    /// Transfer or server rejection for one file.
    Failed {
        /// Client-side filename of the rejected file.
        file_name: String,
        /// Human-readable failure reason.
        reason: String,
    },
}

/// Generation slot transition applied through the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationTransition {
    /// A new request was accepted; must carry `Running` phase.
    Submitted(GenerationRequest),
    /// Progress update while running; regressions are clamped away.
    Progress(u8),
    /// Running edit request completed and produced an output artifact.
    Succeeded(OutputArtifact),
    /// Running analyze request completed; no output artifact is involved.
    AnalysisSucceeded,
    /// Running request failed; slot becomes resubmittable.
    Failed(String),
}

/// Reducer-owned store for the [`ProjectState`] aggregate.
///
/// Every mutation in the system goes through the named `apply_*` reducers
/// below; no other code path writes fields. Reducers are pure functions of
/// current state plus event, so a recorded event sequence replays
/// deterministically in tests.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    state: ProjectState,
    lock_policy: LockPolicy,
}

impl ProjectStore {
    /// Creates an empty store under the given lock policy.
    pub fn new(lock_policy: LockPolicy) -> Self {
        Self {
            state: ProjectState::empty(),
            lock_policy,
        }
    }

    /// Returns an immutable snapshot of the current state.
    pub fn snapshot(&self) -> ProjectState {
        self.state.clone()
    }

    /// Returns the configured lock policy.
    pub fn lock_policy(&self) -> LockPolicy {
        self.lock_policy
    }

    /// Applies the terminal outcome of one upload task.
    ///
    /// A successful upload appends the server-identified asset so the UI can
    /// show it before the authoritative refresh lands; a failed upload leaves
    /// the catalog untouched. Duplicate ids are ignored because the refresh
    /// that follows every upload replaces the catalog wholesale anyway.
    pub fn apply_upload_result(&mut self, outcome: UploadOutcome) {
        if let UploadOutcome::Succeeded(asset) = outcome
            && !self.state.catalog.iter().any(|known| known.id == asset.id)
        {
            self.state.catalog.push(asset);
        }
    }

    /// Replaces the entire catalog with an authoritative server listing.
    ///
    /// Full-replace reconciliation makes refresh arrival order irrelevant:
    /// whichever refresh lands last wins, and the catalog can never drift from
    /// server state after any successful call.
    pub fn apply_catalog(&mut self, catalog: Vec<VideoAsset>) {
        self.state.catalog = catalog;
    }

    /// Applies one generation slot transition.
    ///
    /// # Errors
    /// - [`CoreError::GenerationAlreadyRunning`] when a submission arrives
    ///   while another request is running (single-flight).
    /// - [`CoreError::NoRunningGeneration`] for progress/terminal events
    ///   without a running request.
    /// - [`CoreError::InvalidSubmission`] when a submitted request does not
    ///   carry the `Running` phase.
    pub fn apply_generation_transition(
        &mut self,
        transition: GenerationTransition,
    ) -> Result<(), CoreError> {
        match transition {
            GenerationTransition::Submitted(request) => {
                if self.state.generation_running() {
                    return Err(CoreError::GenerationAlreadyRunning);
                }
                if request.phase != GenerationPhase::Running || request.progress != 0 {
                    return Err(CoreError::InvalidSubmission);
                }
                self.state.active_generation = Some(request);
                Ok(())
            }
            GenerationTransition::Progress(progress) => {
                let Some(request) = self.state.active_generation.as_mut() else {
                    return Err(CoreError::NoRunningGeneration);
                };
                if request.phase != GenerationPhase::Running {
                    return Err(CoreError::NoRunningGeneration);
                }
                // 100 is reserved for the Succeeded transition.
                request.progress = request.progress.max(progress.min(99));
                Ok(())
            }
            GenerationTransition::Succeeded(artifact) => {
                let Some(request) = self.state.active_generation.as_mut() else {
                    return Err(CoreError::NoRunningGeneration);
                };
                if request.phase != GenerationPhase::Running {
                    return Err(CoreError::NoRunningGeneration);
                }
                if request.kind != GenerationKind::Edit {
                    return Err(CoreError::KindMismatch);
                }
                request.phase = GenerationPhase::Succeeded;
                request.progress = 100;
                self.state.current_output = Some(artifact);
                if self.lock_policy == LockPolicy::LockAfterFirstUse {
                    self.state.locked = true;
                }
                Ok(())
            }
            GenerationTransition::AnalysisSucceeded => {
                let Some(request) = self.state.active_generation.as_mut() else {
                    return Err(CoreError::NoRunningGeneration);
                };
                if request.phase != GenerationPhase::Running {
                    return Err(CoreError::NoRunningGeneration);
                }
                if request.kind != GenerationKind::Analyze {
                    return Err(CoreError::KindMismatch);
                }
                request.phase = GenerationPhase::Succeeded;
                request.progress = 100;
                Ok(())
            }
            GenerationTransition::Failed(_reason) => {
                let Some(request) = self.state.active_generation.as_mut() else {
                    return Err(CoreError::NoRunningGeneration);
                };
                if request.phase != GenerationPhase::Running {
                    return Err(CoreError::NoRunningGeneration);
                }
                request.phase = GenerationPhase::Failed;
                Ok(())
            }
        }
    }
}

/// Error type for model validation and reducer transitions.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Upload tasks transition exactly once through their lifecycle.
    #[error("invalid upload transition: {from:?} -> {to:?}")]
    InvalidUploadTransition {
        /// State the task was in.
        from: UploadState,
        /// State the caller attempted.
        to: UploadState,
    },
    /// A second submission arrived while a request was running.
    #[error("a generation request is already running")]
    GenerationAlreadyRunning,
    /// Progress or terminal event without a running request.
    #[error("no generation request is running")]
    NoRunningGeneration,
    /// Submitted requests must be `Running` at zero progress.
    #[error("submitted generation request must be running at zero progress")]
    InvalidSubmission,
    /// Terminal transition does not match the running request kind.
    #[error("terminal transition does not match the running request kind")]
    KindMismatch,
    /// JSON encoding/decoding error for state snapshots.
    #[error("state codec failure: {0}")]
    Codec(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    //! Unit tests for reducer invariants.

    use super::*;

    fn asset(id: &str) -> VideoAsset {
        VideoAsset {
            id: id.to_string(),
            filename: format!("{id}.mp4"),
            source_path: format!("videos/raw/{id}.mp4"),
        }
    }

    #[test]
    fn upload_task_transitions_exactly_once() {
        let mut task = UploadTask::new("clip.mp4", vec![0, 1, 2]);
        task.start().expect("pending task should start");
        task.finish(None).expect("in-flight task should finish");
        assert_eq!(task.state, UploadState::Succeeded);
        assert!(task.start().is_err());
        assert!(task.finish(Some("late".to_string())).is_err());
    }

    #[test]
    fn failed_upload_leaves_catalog_untouched() {
        let mut store = ProjectStore::new(LockPolicy::AllowResubmission);
        store.apply_upload_result(UploadOutcome::Failed {
            file_name: "broken.mp4".to_string(),
            reason: "transport".to_string(),
        });
        assert!(store.snapshot().catalog.is_empty());
    }

    #[test]
    fn catalog_refresh_is_full_replace() {
        let mut store = ProjectStore::new(LockPolicy::AllowResubmission);
        store.apply_catalog(vec![asset("v1"), asset("v2")]);
        store.apply_catalog(vec![asset("v3")]);
        let state = store.snapshot();
        assert_eq!(state.catalog.len(), 1);
        assert_eq!(state.catalog[0].id, "v3");
    }

    #[test]
    fn second_submission_while_running_is_rejected() {
        let mut store = ProjectStore::new(LockPolicy::AllowResubmission);
        store
            .apply_generation_transition(GenerationTransition::Submitted(
                GenerationRequest::running_edit(vec!["v1".to_string()], "cut it", false),
            ))
            .expect("first submission should pass");

        let rejected = store.apply_generation_transition(GenerationTransition::Submitted(
            GenerationRequest::running_edit(vec!["v1".to_string()], "again", false),
        ));
        assert!(matches!(rejected, Err(CoreError::GenerationAlreadyRunning)));
        assert!(store.snapshot().generation_running());
    }

    #[test]
    fn progress_never_regresses_and_caps_below_100() {
        let mut store = ProjectStore::new(LockPolicy::AllowResubmission);
        store
            .apply_generation_transition(GenerationTransition::Submitted(
                GenerationRequest::running_edit(vec!["v1".to_string()], "cut it", false),
            ))
            .expect("submission should pass");

        for value in [10, 40, 20, 100] {
            store
                .apply_generation_transition(GenerationTransition::Progress(value))
                .expect("progress should apply");
        }
        let request = store.snapshot().active_generation.expect("slot populated");
        assert_eq!(request.progress, 99);
    }

    #[test]
    fn success_reaches_exactly_100_and_supersedes_output() {
        let mut store = ProjectStore::new(LockPolicy::AllowResubmission);
        for round in 1..=2_u32 {
            store
                .apply_generation_transition(GenerationTransition::Submitted(
                    GenerationRequest::running_edit(vec!["v1".to_string()], "cut it", true),
                ))
                .expect("submission should pass");
            store
                .apply_generation_transition(GenerationTransition::Succeeded(OutputArtifact {
                    uri: format!("http://localhost:8000/outputs/out{round}.mp4"),
                    download_name: "output.mp4".to_string(),
                }))
                .expect("success should apply");
        }

        let state = store.snapshot();
        let request = state.active_generation.expect("slot populated");
        assert_eq!(request.phase, GenerationPhase::Succeeded);
        assert_eq!(request.progress, 100);
        assert_eq!(
            state.current_output.expect("output present").uri,
            "http://localhost:8000/outputs/out2.mp4"
        );
    }

    #[test]
    fn failure_keeps_prior_output_and_frees_slot() {
        let mut store = ProjectStore::new(LockPolicy::AllowResubmission);
        store
            .apply_generation_transition(GenerationTransition::Submitted(
                GenerationRequest::running_edit(vec!["v1".to_string()], "cut it", false),
            ))
            .expect("submission should pass");
        store
            .apply_generation_transition(GenerationTransition::Failed(
                "remote exploded".to_string(),
            ))
            .expect("failure should apply");

        let state = store.snapshot();
        assert!(state.current_output.is_none());
        assert!(!state.generation_running());
        // Slot is free again.
        store
            .apply_generation_transition(GenerationTransition::Submitted(
                GenerationRequest::running_edit(vec!["v1".to_string()], "retry", false),
            ))
            .expect("resubmission should pass");
    }

    #[test]
    fn analyze_shares_the_single_flight_slot() {
        let mut store = ProjectStore::new(LockPolicy::AllowResubmission);
        store
            .apply_generation_transition(GenerationTransition::Submitted(
                GenerationRequest::running_analysis("v1", "find highlights"),
            ))
            .expect("analyze submission should pass");

        let rejected = store.apply_generation_transition(GenerationTransition::Submitted(
            GenerationRequest::running_edit(vec!["v1".to_string()], "cut it", false),
        ));
        assert!(matches!(rejected, Err(CoreError::GenerationAlreadyRunning)));

        // Analyze completion never touches the output artifact.
        store
            .apply_generation_transition(GenerationTransition::AnalysisSucceeded)
            .expect("analyze completion should apply");
        let state = store.snapshot();
        assert!(state.current_output.is_none());
        assert_eq!(
            state.active_generation.expect("slot populated").phase,
            GenerationPhase::Succeeded
        );
    }

    #[test]
    fn terminal_kind_mismatch_is_rejected() {
        let mut store = ProjectStore::new(LockPolicy::AllowResubmission);
        store
            .apply_generation_transition(GenerationTransition::Submitted(
                GenerationRequest::running_analysis("v1", "find highlights"),
            ))
            .expect("analyze submission should pass");

        let rejected = store.apply_generation_transition(GenerationTransition::Succeeded(
            OutputArtifact {
                uri: "http://localhost:8000/outputs/out.mp4".to_string(),
                download_name: "output.mp4".to_string(),
            },
        ));
        assert!(matches!(rejected, Err(CoreError::KindMismatch)));
    }

    #[test]
    fn lock_is_irreversible_after_first_success() {
        let mut store = ProjectStore::new(LockPolicy::LockAfterFirstUse);
        store
            .apply_generation_transition(GenerationTransition::Submitted(
                GenerationRequest::running_edit(vec!["v1".to_string()], "cut it", false),
            ))
            .expect("submission should pass");
        store
            .apply_generation_transition(GenerationTransition::Succeeded(OutputArtifact {
                uri: "http://localhost:8000/outputs/out.mp4".to_string(),
                download_name: "output.mp4".to_string(),
            }))
            .expect("success should apply");
        assert!(store.snapshot().locked);

        // No reducer path can clear the flag once set.
        store.apply_catalog(Vec::new());
        store.apply_upload_result(UploadOutcome::Failed {
            file_name: "x.mp4".to_string(),
            reason: "transport".to_string(),
        });
        assert!(store.snapshot().locked);
    }
}
