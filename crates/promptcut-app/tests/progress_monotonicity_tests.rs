//! Integration tests for synthesized progress behavior.

mod common;

use promptcut_core::{GenerationPhase, LockPolicy, OutputArtifact};

#[test]
fn progress_monotonicity_tests_samples_never_regress_and_end_at_100() {
    let service = common::FakeService::new();
    let mut controller = common::controller(&service, LockPolicy::AllowResubmission);
    controller.initialize();
    controller.import_files(common::files(&["clip.mp4"]));

    let pending = controller
        .begin_generate("make it watchable", true)
        .expect("submission should pass");

    let mut samples = Vec::new();
    for _ in 0..30 {
        controller.tick();
        samples.push(
            controller
                .snapshot()
                .active_generation
                .expect("slot populated")
                .progress,
        );
    }

    for window in samples.windows(2) {
        assert!(window[1] >= window[0], "progress regressed: {samples:?}");
    }
    assert!(
        samples.iter().all(|value| *value < 100),
        "100 must coincide with the succeeded transition"
    );

    let result = Ok(OutputArtifact {
        uri: "http://localhost:8000/videos/processed/out.mp4".to_string(),
        download_name: "output.mp4".to_string(),
    });
    controller
        .complete_generate(pending.token, &result)
        .expect("completion should apply");

    let request = controller
        .snapshot()
        .active_generation
        .expect("slot populated");
    assert_eq!(request.phase, GenerationPhase::Succeeded);
    assert_eq!(request.progress, 100);
}

#[test]
fn progress_monotonicity_tests_resets_to_zero_for_each_new_run() {
    let service = common::FakeService::new();
    let mut controller = common::controller(&service, LockPolicy::AllowResubmission);
    controller.initialize();
    controller.import_files(common::files(&["clip.mp4"]));

    controller
        .generate_blocking("first pass", false)
        .expect("first generation should pass");

    let pending = controller
        .begin_generate("second pass", false)
        .expect("resubmission should pass");
    assert_eq!(
        controller
            .snapshot()
            .active_generation
            .expect("slot populated")
            .progress,
        0
    );
    controller.tick();
    assert!(
        controller
            .snapshot()
            .active_generation
            .expect("slot populated")
            .progress
            < 100
    );
    let _ = pending;
}
