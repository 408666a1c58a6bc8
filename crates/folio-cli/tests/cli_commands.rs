//! Integration tests for the folio CLI commands.
#![allow(deprecated)] // Command::cargo_bin – macro replacement not yet stable

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const PAGES: &str = r#"{
    "1": {"type": "auto", "text": "You reach the city gate.", "next": 2},
    "2": {"text": "Which way?", "choices": {"The market": 3, "The alley": 4, "The docks": 42}},
    "3": {"type": "victory", "text": "You find the wizard."},
    "4": {"type": "effect", "text": "A poisoned dart!", "effects": {"stamina": -100}, "next": 2}
}"#;

const ENEMIES: &str = r#"{"guard": {"name": "Guard", "skill": 7, "stamina": 6}}"#;

/// A temp directory with a small story and enemy file.
fn test_data() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("pages.json"), PAGES).unwrap();
    fs::write(dir.path().join("enemies.json"), ENEMIES).unwrap();
    dir
}

fn folio(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("folio").unwrap();
    cmd.env("NO_COLOR", "1")
        .env_remove("RUST_LOG")
        .arg("--story")
        .arg(dir.path().join("pages.json"))
        .arg("--enemies")
        .arg(dir.path().join("enemies.json"))
        .arg("--saves")
        .arg(dir.path().join("saves").join("characters.json"))
        .arg("--seed")
        .arg("7");
    cmd
}

fn create(dir: &TempDir) {
    folio(dir).args(["create", "Zara"]).assert().success();
}

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

#[test]
fn create_rolls_and_saves() {
    let dir = test_data();
    folio(&dir)
        .args(["create", "Zara"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"))
        .stdout(predicate::str::contains("Zara's Adventure Sheet"))
        .stdout(predicate::str::contains("Provisions: 10"));

    let saves = fs::read_to_string(dir.path().join("saves").join("characters.json")).unwrap();
    assert!(saves.contains("\"local_player\""));
    assert!(saves.contains("\"saved_at\""));
}

#[test]
fn create_defaults_name() {
    let dir = test_data();
    folio(&dir)
        .arg("create")
        .assert()
        .success()
        .stdout(predicate::str::contains("Adventurer"));
}

#[test]
fn create_twice_fails() {
    let dir = test_data();
    create(&dir);
    folio(&dir)
        .args(["create", "Again"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already has a character"));
}

#[test]
fn players_are_separate() {
    let dir = test_data();
    create(&dir);
    folio(&dir)
        .args(["--player", "someone_else", "create", "Bram"])
        .assert()
        .success();
    folio(&dir)
        .args(["stats", "--player", "someone_else"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bram"));
}

// ---------------------------------------------------------------------------
// stats
// ---------------------------------------------------------------------------

#[test]
fn stats_without_character_fails() {
    let dir = test_data();
    folio(&dir)
        .arg("stats")
        .assert()
        .failure()
        .stderr(predicate::str::contains("folio create"));
}

#[test]
fn stats_shows_sheet() {
    let dir = test_data();
    create(&dir);
    folio(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::contains("SKILL"))
        .stdout(predicate::str::contains("Leather Armour"))
        .stdout(predicate::str::contains("Page"));
}

// ---------------------------------------------------------------------------
// play
// ---------------------------------------------------------------------------

#[test]
fn play_to_victory_deletes_character() {
    let dir = test_data();
    create(&dir);
    folio(&dir)
        .arg("play")
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("You reach the city gate."))
        .stdout(predicate::str::contains("1. The market"))
        .stdout(predicate::str::contains("VICTORY!"));

    folio(&dir).arg("stats").assert().failure();
}

#[test]
fn play_death_deletes_character() {
    let dir = test_data();
    create(&dir);
    folio(&dir)
        .arg("play")
        .write_stdin("2\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("-100 STAMINA"))
        .stdout(predicate::str::contains("Your STAMINA has reached 0."))
        .stdout(predicate::str::contains("YOU HAVE DIED."));

    folio(&dir).arg("stats").assert().failure();
}

#[test]
fn play_pauses_on_eof_and_resumes() {
    let dir = test_data();
    create(&dir);
    folio(&dir)
        .arg("play")
        .write_stdin("")
        .assert()
        .success()
        .stdout(predicate::str::contains("Adventure paused at page 2."));

    folio(&dir)
        .arg("play")
        .write_stdin("1\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("page 2"))
        .stdout(predicate::str::contains("VICTORY!"));
}

#[test]
fn play_rejects_bad_input_and_accepts_commands() {
    let dir = test_data();
    create(&dir);
    folio(&dir)
        .arg("play")
        .write_stdin("9\nstats\neat\nq\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Please enter one of the options shown."))
        .stdout(predicate::str::contains("Adventure Sheet"))
        .stdout(predicate::str::contains("Your STAMINA is already full."))
        .stdout(predicate::str::contains("Farewell"));

    folio(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Page\W+2\b").unwrap());
}

#[test]
fn play_missing_page_fails_without_saving() {
    let dir = test_data();
    create(&dir);
    folio(&dir)
        .arg("play")
        .write_stdin("3\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("page 42 not found"));

    folio(&dir)
        .arg("stats")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"Page\W+2\b").unwrap());
}

#[test]
fn play_without_story_fails() {
    let dir = TempDir::new().unwrap();
    folio(&dir)
        .arg("play")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read"));
}

// ---------------------------------------------------------------------------
// delete
// ---------------------------------------------------------------------------

#[test]
fn delete_with_yes() {
    let dir = test_data();
    create(&dir);
    folio(&dir)
        .args(["delete", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));
    folio(&dir).arg("stats").assert().failure();
}

#[test]
fn delete_can_be_cancelled() {
    let dir = test_data();
    create(&dir);
    folio(&dir)
        .arg("delete")
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Cancelled."));
    folio(&dir).arg("stats").assert().success();
}

// ---------------------------------------------------------------------------
// check
// ---------------------------------------------------------------------------

#[test]
fn check_reports_broken_links() {
    let dir = test_data();
    folio(&dir)
        .arg("check")
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "error: page 2: links to missing page 42",
        ));
}

#[test]
fn check_passes_clean_story() {
    let dir = test_data();
    fs::write(
        dir.path().join("pages.json"),
        r#"{"1": {"type": "combat", "enemies": ["guard"], "outcomes": {"win": 2, "lose": 3}},
            "2": {"type": "victory"},
            "3": {"type": "game_over"}}"#,
    )
    .unwrap();
    folio(&dir)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed."))
        .stdout(predicate::str::contains("3 pages, 1 enemies"));
}

#[test]
fn bundled_story_is_valid() {
    let data = concat!(env!("CARGO_MANIFEST_DIR"), "/../../data");
    Command::cargo_bin("folio")
        .unwrap()
        .env("NO_COLOR", "1")
        .args(["check", "--story"])
        .arg(format!("{data}/pages.json"))
        .arg("--enemies")
        .arg(format!("{data}/enemies.json"))
        .assert()
        .success()
        .stdout(predicate::str::contains("All checks passed."));
}
