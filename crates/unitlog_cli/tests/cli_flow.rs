use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;

fn unitlog(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("unitlog").unwrap();
    cmd.env_remove("UNITLOG_LOG_DIR")
        .env_remove("UNITLOG_LOG_LEVEL")
        .arg("--db")
        .arg(db);
    cmd
}

fn run_json(db: &Path, args: &[&str]) -> Value {
    let output = unitlog(db).arg("--json").args(args).output().unwrap();
    assert!(
        output.status.success(),
        "command {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn preview_prints_rounded_result() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("cli.db");

    unitlog(&db)
        .args(["preview", "lbs_to_kg", "150"])
        .assert()
        .success()
        .stdout(predicate::str::contains("150.00 lbs = 68.04 kg"));
}

#[test]
fn full_user_conversion_favorite_flow() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("cli.db");

    let user = run_json(&db, &["user", "add", "  Alice "]);
    assert_eq!(user["name"], "Alice");
    let user_id = user["id"].as_str().unwrap().to_string();

    let logged = run_json(&db, &["convert", user_id.as_str(), "in_to_cm", "70", "--favorite"]);
    assert_eq!(logged["favorited"], true);
    assert_eq!(logged["conversion"]["result_value"], 177.8);
    let conversion_id = logged["conversion"]["id"].as_str().unwrap().to_string();

    let history = run_json(&db, &["history", user_id.as_str()]);
    assert_eq!(history.as_array().unwrap().len(), 1);

    let again = run_json(&db, &["favorite", "add", user_id.as_str(), conversion_id.as_str()]);
    assert_eq!(again["changed"], false);

    let removed = run_json(&db, &["favorite", "remove", user_id.as_str(), conversion_id.as_str()]);
    assert_eq!(removed["changed"], true);
    let favorites = run_json(&db, &["favorite", "list", user_id.as_str()]);
    assert!(favorites.as_array().unwrap().is_empty());

    run_json(&db, &["user", "remove", user_id.as_str()]);
    let users = run_json(&db, &["user", "list"]);
    assert!(users.as_array().unwrap().is_empty());
    let recent = run_json(&db, &["recent"]);
    assert!(recent.as_array().unwrap().is_empty());
}

#[test]
fn invalid_conversion_type_fails_with_message() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("cli.db");

    let user = run_json(&db, &["user", "add", "Bob"]);
    let user_id = user["id"].as_str().unwrap().to_string();

    unitlog(&db)
        .args(["convert", user_id.as_str(), "xyz", "10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid conversion type `xyz`"));

    let history = run_json(&db, &["history", user_id.as_str()]);
    assert!(history.as_array().unwrap().is_empty());
}

#[test]
fn empty_user_name_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("cli.db");

    unitlog(&db)
        .args(["user", "add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("name cannot be empty"));
}

#[test]
fn types_lists_every_conversion_without_touching_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("never-created.db");

    let types = run_json(&db, &["types"]);
    let names: Vec<&str> = types
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["lbs_to_kg", "kg_to_lbs", "in_to_cm", "cm_to_in"]);
    assert!(!db.exists());
}
