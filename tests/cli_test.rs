mod common;

use assert_cmd::Command;
use common::TestServer;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

struct Workspace {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new(base_url: &str, texts: &str, profiles: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        let config = serde_json::json!({
            "api": {
                "base_url": base_url,
                "text_param": "text",
                "emotion_param": "emotion"
            },
            "output": { "dir": root.join("out") }
        });
        fs::write(root.join("config.json"), config.to_string()).unwrap();
        fs::write(root.join("texts.txt"), texts).unwrap();
        fs::write(root.join("profiles.json"), profiles).unwrap();
        Self { _dir: dir, root }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    fn generate(&self, workers: usize) -> Command {
        let mut cmd = Command::cargo_bin("ref-audio-gen").unwrap();
        cmd.current_dir(&self.root)
            .arg("--config")
            .arg(self.path("config.json"))
            .arg("generate")
            .arg("--texts")
            .arg(self.path("texts.txt"))
            .arg("--profiles")
            .arg(self.path("profiles.json"))
            .arg("--workers")
            .arg(workers.to_string());
        cmd
    }
}

fn sorted(mut items: Vec<String>) -> Vec<String> {
    items.sort();
    items
}

fn read(path: &Path) -> Vec<u8> {
    fs::read(path).unwrap()
}

#[test]
fn generate_runs_worker_processes_end_to_end() {
    let server = TestServer::start(200, b"RIFF-generated");
    let ws = Workspace::new(&server.url("/api?"), "hello\nworld\n", r#"[{"emotion": "happy"}]"#);

    ws.generate(1)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 2 of 2 pairs"));

    assert_eq!(
        sorted(server.targets()),
        vec![
            "/api?text=hello&emotion=happy".to_string(),
            "/api?text=world&emotion=happy".to_string(),
        ]
    );
    for rel in [
        "out/text/hello/happy.wav",
        "out/text/world/happy.wav",
        "out/emotion/happy/hello.wav",
        "out/emotion/happy/world.wav",
    ] {
        assert_eq!(read(&ws.path(rel)), b"RIFF-generated", "{rel}");
    }

    ws.generate(1)
        .assert()
        .success()
        .stdout(predicate::str::contains("Generated 0 of 2 pairs (2 already present)"));
    assert_eq!(server.targets().len(), 2);
}

#[test]
fn generate_splits_profiles_over_processes() {
    let server = TestServer::start(200, b"wav");
    let ws = Workspace::new(
        &server.url("/api"),
        "one\ntwo",
        r#"[{"emotion": "happy"}, {"emotion": "sad"}, {"emotion": "calm"}]"#,
    );

    ws.generate(2)
        .assert()
        .success()
        .stdout(predicate::str::contains("- worker 0: 4 fetched"))
        .stdout(predicate::str::contains("- worker 1: 2 fetched"));

    assert_eq!(server.targets().len(), 6);
    assert!(ws.path("out/emotion/calm/two.wav").exists());
}

#[test]
fn generate_reports_remote_status_from_worker() {
    let server = TestServer::start(404, b"nope");
    let ws = Workspace::new(&server.url("/api?"), "hello", r#"[{"emotion": "happy"}]"#);

    ws.generate(1)
        .assert()
        .failure()
        .stderr(predicate::str::contains("404"));

    assert!(!ws.path("out/text/hello/happy.wav").exists());
    assert!(!ws.path("out/emotion/happy/hello.wav").exists());
}

#[test]
fn generate_with_threads_matches_process_mode() {
    let server = TestServer::start(200, b"wav");
    let ws = Workspace::new(&server.url("/api?"), "hello\nworld", r#"[{"emotion": "happy"}]"#);

    ws.generate(1).arg("--threads").assert().success();

    assert_eq!(server.targets().len(), 2);
    assert!(ws.path("out/text/world/happy.wav").exists());
}

#[test]
fn generate_requires_profiles_or_manifest() {
    let mut cmd = Command::cargo_bin("ref-audio-gen").unwrap();
    cmd.args(["generate", "--texts", "texts.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--profiles"));
}

#[test]
fn generate_rejects_missing_base_url_before_fetching() {
    let ws = Workspace::new("", "hello", r#"[{"emotion": "happy"}]"#);

    ws.generate(1)
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration error"));
}

#[test]
fn system_info_reports_default_workers() {
    let mut cmd = Command::cargo_bin("ref-audio-gen").unwrap();
    cmd.args(["system-info", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"default_workers\""));
}

#[test]
fn config_validate_accepts_complete_config() {
    let ws = Workspace::new("http://127.0.0.1:9880/tts", "hello", "[]");

    let mut cmd = Command::cargo_bin("ref-audio-gen").unwrap();
    cmd.arg("--config")
        .arg(ws.path("config.json"))
        .args(["config", "--validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config OK"));
}
