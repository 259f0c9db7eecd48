#![warn(missing_docs)]
//! # promptcut-app binary
//!
//! Demo shell for the orchestration controller: drives the full
//! upload -> catalog -> analyze -> generate flow against an in-memory stand-in
//! for the remote editing service, with per-run file logging.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use promptcut_app::{ProjectController, app_version};
use promptcut_catalog::{CatalogClient, CatalogError, CatalogTransport};
use promptcut_core::LockPolicy;
use promptcut_generate::{GenerationController, GenerationError, GenerationTransport};
use promptcut_service_contract::{
    AnalyzeRequest, AnalyzeResponse, CutInstruction, EditRequest, EditResponse, UploadVideoResponse,
    VideoSummary,
};
use promptcut_transfer::{TransferClient, TransferError, TransferTransport};
use promptcut_ui::ShellCapabilities;

const DEMO_ORIGIN: &str = "http://localhost:8000";

struct RunLogger {
    file: Mutex<File>,
    path: PathBuf,
}

impl RunLogger {
    fn new() -> Result<Self, String> {
        let exe_path = std::env::current_exe()
            .map_err(|error| format!("unable to resolve executable path: {error}"))?;
        let exe_dir = exe_path
            .parent()
            .ok_or_else(|| "executable parent directory is missing".to_string())?
            .to_path_buf();

        let path = exe_dir.join(format!("{}_log.txt", timestamp_ms()));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|error| format!("unable to create log file '{}': {error}", path.display()))?;

        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    fn write_line(&self, level: &str, stage: &str, detail: &str) {
        let line = format!("{} | {level} | {stage} | {detail}\n", timestamp_ms());
        if let Ok(mut file) = self.file.lock() {
            let _ = file.write_all(line.as_bytes());
            if level == "ERROR" {
                let _ = file.flush();
            }
        }
    }
}

fn timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// In-memory stand-in for the remote editing service.
///
/// Accepts uploads, lists them back, and returns canned analysis/edit
/// responses, matching the real service's JSON surface.
#[derive(Default)]
struct DemoService {
    videos: Mutex<Vec<VideoSummary>>,
}

impl TransferTransport for DemoService {
    fn upload(
        &self,
        _endpoint: &str,
        file_name: &str,
        _bytes: &[u8],
    ) -> Result<UploadVideoResponse, TransferError> {
        let mut videos = self
            .videos
            .lock()
            .map_err(|_| TransferError::Transport("demo state lock poisoned".to_string()))?;
        let video_id = format!("v{}", videos.len() + 1);
        videos.push(VideoSummary {
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

impl CatalogTransport for DemoService {
    fn list(&self, _endpoint: &str) -> Result<Vec<VideoSummary>, CatalogError> {
        self.videos
            .lock()
            .map(|videos| videos.clone())
            .map_err(|_| CatalogError::Transport("demo state lock poisoned".to_string()))
    }
}

impl GenerationTransport for DemoService {
    fn analyze(
        &self,
        _endpoint: &str,
        _request: &AnalyzeRequest,
    ) -> Result<AnalyzeResponse, GenerationError> {
        Ok(AnalyzeResponse {
            instructions: vec![CutInstruction {
                start: 0.0,
                end: 4.5,
                caption: Some("opening shot".to_string()),
            }],
        })
    }

    fn edit(&self, _endpoint: &str, _request: &EditRequest) -> Result<EditResponse, GenerationError> {
        Ok(EditResponse {
            output_video: "videos/processed/demo-output.mp4".to_string(),
        })
    }
}

struct LoggingShell {
    logger: Arc<RunLogger>,
}

impl ShellCapabilities for LoggingShell {
    fn request_fullscreen(&self) {
        self.logger.write_line("INFO", "shell", "fullscreen requested");
    }

    fn open_file_picker(&self) {
        self.logger.write_line("INFO", "shell", "file picker opened");
    }
}

fn run_demo(logger: &Arc<RunLogger>) -> Result<(), String> {
    let service = Arc::new(DemoService::default());

    let transfer = TransferClient::new(DEMO_ORIGIN, service.clone())
        .map_err(|error| error.to_string())?;
    let catalog = CatalogClient::new(DEMO_ORIGIN, service.clone())
        .map_err(|error| error.to_string())?;
    let generation = GenerationController::new(DEMO_ORIGIN, service)
        .map_err(|error| error.to_string())?;

    let mut controller =
        ProjectController::new(transfer, catalog, generation, LockPolicy::AllowResubmission)
            .with_capabilities(Arc::new(LoggingShell {
                logger: logger.clone(),
            }));

    controller.initialize();
    logger.write_line("INFO", "catalog", "initial refresh complete");

    controller.open_import_picker();
    let results = controller.import_files(vec![
        ("clip-a.mp4".to_string(), vec![0u8; 16]),
        ("clip-b.mp4".to_string(), vec![0u8; 16]),
    ]);
    for result in &results {
        match result {
            Ok(asset) => logger.write_line(
                "INFO",
                "upload",
                &format!("accepted {} as {}", asset.filename, asset.id),
            ),
            Err(error) => logger.write_line("ERROR", "upload", &error.to_string()),
        }
    }

    let snapshot = controller.snapshot();
    let first_id = snapshot
        .catalog
        .first()
        .map(|asset| asset.id.clone())
        .ok_or_else(|| "catalog is empty after import".to_string())?;

    let analysis = controller
        .analyze_blocking(&first_id, "find the best moments")
        .map_err(|error| error.to_string())?;
    logger.write_line(
        "INFO",
        "analyze",
        &format!(
            "{} instruction(s) for {}",
            analysis.response.instructions.len(),
            analysis.asset_id
        ),
    );

    let artifact = controller
        .generate_blocking("make it watchable", true)
        .map_err(|error| error.to_string())?;
    logger.write_line("INFO", "generate", &format!("output at {}", artifact.uri));

    let view = controller.view();
    println!("promptcut {}", app_version());
    println!("catalog entries: {}", view.catalog.len());
    println!(
        "output: {} (download as {})",
        view.output_uri.as_deref().unwrap_or("<none>"),
        view.download_name.as_deref().unwrap_or("<none>")
    );
    for notice in controller.take_notices() {
        println!("notice: {notice}");
    }

    Ok(())
}

/// CLI entry point.
fn main() {
    let logger = match RunLogger::new() {
        Ok(logger) => Arc::new(logger),
        Err(error) => {
            eprintln!("failed to start run logger: {error}");
            std::process::exit(1);
        }
    };
    logger.write_line(
        "INFO",
        "bootstrap",
        &format!("promptcut {} starting", app_version()),
    );

    if let Err(error) = run_demo(&logger) {
        logger.write_line("ERROR", "demo", &error);
        eprintln!("demo run failed: {error}");
        std::process::exit(1);
    }

    println!("run log: {}", logger.path.display());
}
