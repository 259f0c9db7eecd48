#![warn(missing_docs)]
//! # promptcut-ui
//!
//! ## Purpose
//! Defines the presentation boundary for `promptcut`: renderable view state
//! and the capability interface the controller drives.
//!
//! ## Responsibilities
//! - Project [`promptcut_core::ProjectState`] into spinner/disabled/progress
//!   values the shell can render directly.
//! - Expose the imperative shell capabilities (fullscreen, file picker) as a
//!   trait so the controller never reaches into rendering internals.
//!
//! ## Data flow
//! Store snapshot -> [`project_view`] -> rendered controls. User gestures ->
//! controller -> [`ShellCapabilities`] calls.
//!
//! ## Ownership and lifetimes
//! `ViewState` owns all its values; it is derived on every snapshot change and
//! never a second source of truth.
//!
//! ## Error model
//! Projection is total; invalid combinations are prevented upstream by the
//! store reducers.

use promptcut_core::{GenerationPhase, ProjectState};

/// Imperative shell capabilities the controller may invoke.
///
/// Implemented by the embedding shell (browser adapter, desktop window); the
/// controller only ever calls through this trait.
pub trait ShellCapabilities {
    /// Puts the playback surface into fullscreen.
    fn request_fullscreen(&self);

    /// Opens the hidden file picker for clip import.
    fn open_file_picker(&self);
}

/// Generic stage status used for upload/catalog/generation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    /// Stage has not started.
    Idle,
    /// Stage is currently running.
    Running,
    /// Stage completed successfully.
    Healthy,
    /// Stage encountered non-fatal error.
    Degraded,
}

/// One renderable catalog row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogRow {
    /// Server-assigned asset id.
    pub asset_id: String,
    /// Filename shown to the user.
    pub filename: String,
}

/// Renderable view state derived from one project snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    /// Whether the import spinner should show.
    pub import_busy: bool,
    /// Whether the generate affordance must be disabled.
    pub generate_disabled: bool,
    /// Progress bar value in `[0, 100]`; meaningful only while generating.
    pub progress: u8,
    /// Whether the progress bar should show.
    pub generating: bool,
    /// Catalog rows in server order.
    pub catalog: Vec<CatalogRow>,
    /// Playback/download URI of the current output, when one exists.
    pub output_uri: Option<String>,
    /// Suggested download filename for the current output.
    pub download_name: Option<String>,
    /// Banner shown once the project is locked.
    pub locked_banner: bool,
}

/// Projects one project snapshot into renderable view state.
///
/// `import_busy` is passed by the orchestrator because upload tasks live
/// outside the store aggregate.
pub fn project_view(state: &ProjectState, import_busy: bool) -> ViewState {
    let generating = state.generation_running();
    let progress = state
        .active_generation
        .as_ref()
        .map(|request| request.progress)
        .unwrap_or(0);

    ViewState {
        import_busy,
        generate_disabled: generating || state.locked,
        progress,
        generating,
        catalog: state
            .catalog
            .iter()
            .map(|asset| CatalogRow {
                asset_id: asset.id.clone(),
                filename: asset.filename.clone(),
            })
            .collect(),
        output_uri: state.current_output.as_ref().map(|output| output.uri.clone()),
        download_name: state
            .current_output
            .as_ref()
            .map(|output| output.download_name.clone()),
        locked_banner: state.locked,
    }
}

/// Maps the generation slot onto a stage status for status rows.
pub fn generation_stage(state: &ProjectState) -> StageStatus {
    match state.active_generation.as_ref().map(|request| request.phase) {
        None | Some(GenerationPhase::Idle) => StageStatus::Idle,
        Some(GenerationPhase::Running) => StageStatus::Running,
        Some(GenerationPhase::Succeeded) => StageStatus::Healthy,
        Some(GenerationPhase::Failed) => StageStatus::Degraded,
    }
}
