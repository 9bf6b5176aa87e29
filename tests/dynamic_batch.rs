use std::path::{Path, PathBuf};
use std::sync::Mutex;

use handviz::{
    DynamicVisualizer, Hand, HandvizError, HandvizResult, HostScript, RunMode, ScriptHost,
    VisualizerConfig,
};

#[derive(Default)]
struct RecordingHost {
    runs: Mutex<Vec<(HostScript, RunMode)>>,
}

impl ScriptHost for RecordingHost {
    fn run(&self, script: &HostScript, mode: RunMode) -> HandvizResult<()> {
        self.runs.lock().unwrap().push((script.clone(), mode));
        Ok(())
    }
}

fn visualizer(name: &str) -> DynamicVisualizer<RecordingHost> {
    let root = PathBuf::from("target").join("dynamic_batch").join(name);
    let _ = std::fs::remove_dir_all(&root);
    let cfg = VisualizerConfig {
        dynamic_output_dir: root.join("dynamic"),
        ..VisualizerConfig::default()
    };
    DynamicVisualizer::new(cfg, RecordingHost::default()).unwrap()
}

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// The `FRAMES = [...]` literal of a rendered script, with Python keywords mapped back to JSON.
fn frames(script: &HostScript) -> Vec<serde_json::Value> {
    let line = script
        .source()
        .lines()
        .find_map(|l| l.strip_prefix("FRAMES = "))
        .unwrap();
    serde_json::from_str(line).unwrap()
}

#[test]
fn one_export_per_gesture_instance() {
    let viz = visualizer("export");
    let report = viz
        .visualize_file(&fixture("example_dynamic.json"), true)
        .unwrap();

    assert_eq!(report.label, "z");
    assert_eq!(report.hand, Hand::Right);
    assert!(report.is_success());

    let names: Vec<String> = report
        .outputs()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["dynamic_z_Right_0.blend", "dynamic_z_Right_1.blend"]);

    let runs = viz.host().runs.lock().unwrap();
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().all(|(_, mode)| *mode == RunMode::Background));
    assert!(runs[0].0.source().contains("EXPORT = True"));
}

#[test]
fn keyframes_follow_phase_order() {
    let viz = visualizer("keyframes");
    viz.visualize_file(&fixture("example_dynamic.json"), true)
        .unwrap();

    let runs = viz.host().runs.lock().unwrap();
    let first = frames(&runs[0].0);
    assert_eq!(first.len(), 5);
    let indices: Vec<u64> = first.iter().map(|f| f["frame"].as_u64().unwrap()).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4]);
    assert_eq!(first[0]["wrist_quat"], serde_json::json!([1.0, 0.0, 0.0, 0.0]));
    assert_eq!(first[0]["bones"].as_array().unwrap().len(), 15);

    assert_eq!(frames(&runs[1].0).len(), 2);
}

#[test]
fn interactive_mode_writes_nothing() {
    let viz = visualizer("interactive");
    let report = viz
        .visualize_file(&fixture("example_dynamic.json"), false)
        .unwrap();

    assert!(report.is_success());
    assert_eq!(report.outputs().count(), 0);
    let runs = viz.host().runs.lock().unwrap();
    assert!(runs.iter().all(|(_, mode)| *mode == RunMode::Interactive));
    assert!(runs[0].0.source().contains("EXPORT = False"));
}

#[test]
fn empty_document_never_reaches_the_host() {
    let dir = PathBuf::from("target").join("dynamic_batch").join("inputs");
    std::fs::create_dir_all(&dir).unwrap();

    for (name, body) in [("empty.json", "[]"), ("null.json", "null")] {
        let path = dir.join(name);
        std::fs::write(&path, body).unwrap();
        let viz = visualizer(name);
        let err = viz.visualize_file(&path, true).unwrap_err();
        assert!(matches!(err, HandvizError::EmptyGesture(_)), "{name}: {err}");
        assert!(viz.host().runs.lock().unwrap().is_empty());
    }
}

#[test]
fn non_json_input_is_rejected() {
    let viz = visualizer("non_json");
    let err = viz
        .visualize_file(&fixture("example_static.txt"), true)
        .unwrap_err();
    assert!(matches!(err, HandvizError::UnsupportedInput(_)));
}
