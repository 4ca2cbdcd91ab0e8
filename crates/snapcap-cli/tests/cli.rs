use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `snapcap` isolated from the user's config directory.
fn snapcap(config_home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("snapcap").unwrap();
    cmd.env("XDG_CONFIG_HOME", config_home.path());
    cmd
}

#[test]
fn test_compose_two_objects() {
    let home = TempDir::new().unwrap();
    snapcap(&home)
        .args(["compose", "-p", "pizza=0.5", "-p", "table=0.3"])
        .assert()
        .success()
        .stdout("A photo of a pizza and a table\n");
}

#[test]
fn test_compose_ranks_unordered_input() {
    let home = TempDir::new().unwrap();
    snapcap(&home)
        .args(["compose", "-p", "table=0.3", "-p", "pizza=0.5"])
        .assert()
        .success()
        .stdout("A photo of a pizza and a table\n");
}

#[test]
fn test_compose_empty_stdin() {
    let home = TempDir::new().unwrap();
    snapcap(&home)
        .arg("compose")
        .write_stdin("[]")
        .assert()
        .success()
        .stdout("An interesting scene captured in this image\n");
}

#[test]
fn test_compose_json_from_stdin() {
    let home = TempDir::new().unwrap();
    let output = snapcap(&home)
        .args(["compose", "--format", "json"])
        .write_stdin(r#"[["sports_car", 0.35], {"label": "street_sign", "score": 0.2}]"#)
        .output()
        .unwrap();

    assert!(output.status.success());
    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["text"], "A sports car on the street");
    assert_eq!(json["branch"], "single_with_context");
    assert_eq!(json["scene"], "outdoor");
    assert_eq!(json["context"], "on the street");
}

#[test]
fn test_compose_csv() {
    let home = TempDir::new().unwrap();
    snapcap(&home)
        .args(["compose", "--format", "csv", "-p", "umbrella=0.1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("caption,branch,scene,context"))
        .stdout(predicate::str::contains("An umbrella,fallback,general,"));
}

#[test]
fn test_compose_seeded_is_reproducible() {
    let home = TempDir::new().unwrap();
    let run = |home: &TempDir| {
        snapcap(home)
            .args(["compose", "--seed", "7", "-p", "volcano=0.9", "-p", "valley=0.5"])
            .output()
            .unwrap()
            .stdout
    };

    assert_eq!(run(&home), run(&home));
}

#[test]
fn test_compose_uses_config_thresholds() {
    let home = TempDir::new().unwrap();
    let config_path = home.path().join("strict.json");
    std::fs::write(&config_path, r#"{"caption": {"thresholds": {"single": 0.5}}}"#).unwrap();

    snapcap(&home)
        .args(["--config", config_path.to_str().unwrap(), "compose", "-p", "dog=0.45"])
        .assert()
        .success()
        .stdout("A dog\n");
}

#[test]
fn test_compose_rejects_malformed_prediction() {
    let home = TempDir::new().unwrap();
    snapcap(&home)
        .args(["compose", "-p", "pizza"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected LABEL=SCORE"));
}

#[test]
fn test_caption_without_model_fails() {
    let home = TempDir::new().unwrap();
    let image = home.path().join("photo.png");
    std::fs::write(&image, b"not really a png").unwrap();

    snapcap(&home)
        .args(["caption", image.to_str().unwrap(), "--model-dir"])
        .arg(home.path().join("missing"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load classifier"));
}

#[test]
fn test_caption_no_matching_files() {
    let home = TempDir::new().unwrap();
    let pattern = home.path().join("*.png");

    snapcap(&home)
        .arg("caption")
        .arg(pattern)
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching image files"));
}

#[test]
fn test_config_init_and_get() {
    let home = TempDir::new().unwrap();
    let config_path = home.path().join("config.json");
    let config_arg = config_path.to_str().unwrap();

    snapcap(&home)
        .args(["--config", config_arg, "config", "init"])
        .assert()
        .success();
    assert!(config_path.exists());

    snapcap(&home)
        .args(["--config", config_arg, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    snapcap(&home)
        .args(["--config", config_arg, "config", "set", "caption.thresholds.confident", "0.8"])
        .assert()
        .success();

    snapcap(&home)
        .args(["--config", config_arg, "config", "get", "caption.thresholds.confident"])
        .assert()
        .success()
        .stdout("0.8\n");

    snapcap(&home)
        .args(["--config", config_arg, "config", "get", "caption.thresholds.single"])
        .assert()
        .success()
        .stdout("0.3\n");
}

#[test]
fn test_config_path_defaults_to_config_dir() {
    let home = TempDir::new().unwrap();
    snapcap(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("snapcap"))
        .stdout(predicate::str::contains("not created"));
}
