//! Shared fixtures for app integration tests.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use promptcut_app::ProjectController;
use promptcut_catalog::{CatalogClient, CatalogError, CatalogTransport};
use promptcut_core::LockPolicy;
use promptcut_generate::{GenerationController, GenerationError, GenerationTransport};
use promptcut_service_contract::{
    AnalyzeRequest, AnalyzeResponse, CutInstruction, EditRequest, EditResponse, UploadVideoResponse,
    VideoSummary,
};
use promptcut_transfer::{TransferClient, TransferError, TransferTransport};

/// Base origin used by every fixture controller.
pub const TEST_ORIGIN: &str = "http://localhost:8000";

#[derive(Default)]
struct FakeState {
    videos: Vec<VideoSummary>,
    fail_upload_for: HashSet<String>,
    fail_next_list: bool,
    fail_edit: bool,
    output_video: Option<String>,
}

/// Scriptable in-memory stand-in for the remote editing service.
///
/// Behaves like the real backend by default: uploads are assigned sequential
/// ids (`v1`, `v2`, ...) and show up in the listing; edits return a relative
/// output path.
#[derive(Default)]
pub struct FakeService {
    state: Mutex<FakeState>,
}

#[allow(dead_code)]
impl FakeService {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes the upload of `file_name` fail with a simulated transport error.
    pub fn fail_upload_of(&self, file_name: &str) {
        self.state
            .lock()
            .expect("fake state lock should work")
            .fail_upload_for
            .insert(file_name.to_string());
    }

    /// Makes exactly the next listing call fail.
    pub fn fail_next_list(&self) {
        self.state
            .lock()
            .expect("fake state lock should work")
            .fail_next_list = true;
    }

    /// Makes edit calls fail until cleared.
    pub fn set_fail_edit(&self, fail: bool) {
        self.state
            .lock()
            .expect("fake state lock should work")
            .fail_edit = fail;
    }

    /// Overrides the relative output path returned by edit calls.
    pub fn set_output_video(&self, path: &str) {
        self.state
            .lock()
            .expect("fake state lock should work")
            .output_video = Some(path.to_string());
    }
}

impl TransferTransport for FakeService {
    fn upload(
        &self,
        _endpoint: &str,
        file_name: &str,
        _bytes: &[u8],
    ) -> Result<UploadVideoResponse, TransferError> {
        let mut state = self.state.lock().expect("fake state lock should work");
        if state.fail_upload_for.contains(file_name) {
            return Err(TransferError::Transport(format!(
                "simulated connection reset while sending {file_name}"
            )));
        }

        let video_id = format!("v{}", state.videos.len() + 1);
        state.videos.push(VideoSummary {
            video_id: video_id.clone(),
            filename: file_name.to_string(),
        });

        Ok(UploadVideoResponse {
            video_id: video_id.clone(),
            filename: file_name.to_string(),
            path: format!("videos/raw/{video_id}_{file_name}"),
        })
    }
}

impl CatalogTransport for FakeService {
    fn list(&self, _endpoint: &str) -> Result<Vec<VideoSummary>, CatalogError> {
        let mut state = self.state.lock().expect("fake state lock should work");
        if state.fail_next_list {
            state.fail_next_list = false;
            return Err(CatalogError::Transport(
                "simulated listing outage".to_string(),
            ));
        }
        Ok(state.videos.clone())
    }
}

impl GenerationTransport for FakeService {
    fn analyze(
        &self,
        _endpoint: &str,
        _request: &AnalyzeRequest,
    ) -> Result<AnalyzeResponse, GenerationError> {
        Ok(AnalyzeResponse {
            instructions: vec![CutInstruction {
                start: 1.0,
                end: 3.5,
                caption: Some("keeper".to_string()),
            }],
        })
    }

    fn edit(
        &self,
        _endpoint: &str,
        _request: &EditRequest,
    ) -> Result<EditResponse, GenerationError> {
        let state = self.state.lock().expect("fake state lock should work");
        if state.fail_edit {
            return Err(GenerationError::Remote(
                "simulated splice failure".to_string(),
            ));
        }
        Ok(EditResponse {
            output_video: state
                .output_video
                .clone()
                .unwrap_or_else(|| "videos/processed/out.mp4".to_string()),
        })
    }
}

/// Builds a controller wired to one fake service instance.
#[allow(dead_code)]
pub fn controller(service: &Arc<FakeService>, lock_policy: LockPolicy) -> ProjectController {
    let transfer =
        TransferClient::new(TEST_ORIGIN, service.clone()).expect("transfer client should build");
    let catalog =
        CatalogClient::new(TEST_ORIGIN, service.clone()).expect("catalog client should build");
    let generation = GenerationController::new(TEST_ORIGIN, service.clone())
        .expect("generation controller should build");

    ProjectController::new(transfer, catalog, generation, lock_policy)
}

/// Creates file tuples for `import_files`.
#[allow(dead_code)]
pub fn files(names: &[&str]) -> Vec<(String, Vec<u8>)> {
    names
        .iter()
        .map(|name| (name.to_string(), vec![0u8; 8]))
        .collect()
}
