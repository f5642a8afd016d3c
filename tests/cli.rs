use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

const KEY_VARS: [&str; 5] = [
    "GOOGLE_API_KEY",
    "OPENAI_API_KEY",
    "GOOGLE_SEARCH_API_KEY",
    "CUSTOM_SEARCH_ENGINE_ID",
    "GOOGLE_IMAGE_API_KEY",
];

fn deckgen(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("deckgen").unwrap();
    cmd.current_dir(root)
        .env("HOME", root)
        .env("XDG_CONFIG_HOME", root.join("config"))
        .env_remove("DECKGEN_PROVIDER")
        .env_remove("DECKGEN_FORMAT")
        .env_remove("DECKGEN_OUTPUT_DIR");
    for var in KEY_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn empty_topic_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    deckgen(tmp.path())
        .arg("   ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn empty_topic_from_prompt_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    deckgen(tmp.path())
        .write_stdin("\n")
        .assert()
        .failure()
        .stdout(predicate::str::contains("Please enter the topic"))
        .stderr(predicate::str::contains("empty"));
}

#[test]
fn missing_generative_key_names_the_variable() {
    let tmp = tempfile::tempdir().unwrap();
    deckgen(tmp.path())
        .arg("Solar Energy")
        .assert()
        .failure()
        .stderr(predicate::str::contains("❌ ERROR"))
        .stderr(predicate::str::contains("GOOGLE_API_KEY"));
    let written: Vec<_> = fs::read_dir(tmp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "pptx"))
        .collect();
    assert!(written.is_empty());
}

#[test]
fn openai_provider_requires_openai_key() {
    let tmp = tempfile::tempdir().unwrap();
    deckgen(tmp.path())
        .args(["generate", "Solar Energy", "--provider", "openai"])
        .env("GOOGLE_API_KEY", "unused")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn unknown_format_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    deckgen(tmp.path())
        .args(["Solar Energy", "--format", "docx"])
        .env("GOOGLE_API_KEY", "unused")
        .assert()
        .failure()
        .stderr(predicate::str::contains("docx"));
}

#[test]
fn explicit_missing_config_file_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    deckgen(tmp.path())
        .args(["Solar Energy", "--config", "nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.json"));
}
