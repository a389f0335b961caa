use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../tiddlyparse-engine/tests/fixtures")
        .join(name)
}

fn scratch(name: &str) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(name);
    fs::copy(fixture(name), &path).unwrap();
    (dir, path)
}

/// The binary with a throwaway home directory, so no real config is read.
fn tiddlyparse(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tiddlyparse").unwrap();
    cmd.env("HOME", home).env_remove("TIDDLYPARSE_WIKI");
    cmd
}

#[test]
fn info_reports_format_and_count() {
    let home = TempDir::new().unwrap();
    tiddlyparse(home.path())
        .arg("--wiki")
        .arg(fixture("empty-5.2.0.html"))
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("format: json"))
        .stdout(predicate::str::contains("tiddlers: 7"));
}

#[test]
fn list_prints_titles_in_store_order() {
    let home = TempDir::new().unwrap();
    tiddlyparse(home.path())
        .env("TIDDLYPARSE_WIKI", fixture("empty-5.1.23.html"))
        .arg("list")
        .assert()
        .success()
        .stdout("$:/core\n$:/isEncrypted\n$:/themes/tiddlywiki/snowwhite\n$:/themes/tiddlywiki/vanilla\n");
}

#[test]
fn get_prints_one_field() {
    let home = TempDir::new().unwrap();
    tiddlyparse(home.path())
        .arg("--wiki")
        .arg(fixture("empty-5.1.23.html"))
        .args(["get", "$:/isEncrypted", "--field", "text"])
        .assert()
        .success()
        .stdout("no\n");
}

#[test]
fn get_prints_all_fields() {
    let home = TempDir::new().unwrap();
    tiddlyparse(home.path())
        .arg("--wiki")
        .arg(fixture("empty-5.2.0.html"))
        .args(["get", "$:/StoryList"])
        .assert()
        .success()
        .stdout("title: $:/StoryList\nlist: GettingStarted\n");
}

#[test]
fn get_missing_tiddler_fails() {
    let home = TempDir::new().unwrap();
    tiddlyparse(home.path())
        .arg("--wiki")
        .arg(fixture("empty-5.2.0.html"))
        .args(["get", "Nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tiddler not found: Nope"));
}

#[test]
fn set_creates_and_saves() {
    let home = TempDir::new().unwrap();
    let (_dir, wiki) = scratch("empty-5.1.23.html");

    tiddlyparse(home.path())
        .arg("--wiki")
        .arg(&wiki)
        .args(["set", "Shopping", "text", "milk"])
        .assert()
        .success();

    tiddlyparse(home.path())
        .arg("--wiki")
        .arg(&wiki)
        .args(["get", "Shopping", "--field", "text"])
        .assert()
        .success()
        .stdout("milk\n");
}

#[test]
fn set_to_stored_value_does_not_save() {
    let home = TempDir::new().unwrap();
    let (_dir, wiki) = scratch("empty-5.1.23.html");

    tiddlyparse(home.path())
        .arg("--wiki")
        .arg(&wiki)
        .args(["-v", "set", "$:/isEncrypted", "text", "no"])
        .assert()
        .success()
        .stderr(predicate::str::contains("not saving"));
}

#[test]
fn set_reserved_field_fails_without_saving() {
    let home = TempDir::new().unwrap();
    let (_dir, wiki) = scratch("empty-5.2.0.html");
    let before = fs::read_to_string(&wiki).unwrap();

    tiddlyparse(home.path())
        .arg("--wiki")
        .arg(&wiki)
        .args(["set", "Shopping", "__store", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("reserved"));

    assert_eq!(fs::read_to_string(&wiki).unwrap(), before);
}

#[test]
fn search_combines_filters() {
    let home = TempDir::new().unwrap();
    tiddlyparse(home.path())
        .arg("--wiki")
        .arg(fixture("empty-5.2.0.html"))
        .args(["search", "--eq", "plugin-type=theme", "--has", "parent-plugin"])
        .assert()
        .success()
        .stdout("$:/themes/tiddlywiki/snowwhite\n");
}

#[test]
fn default_wiki_comes_from_config() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config/tiddlyparse");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("config.toml"),
        format!("default_wiki = {:?}\n", fixture("empty-5.1.23.html")),
    )
    .unwrap();

    tiddlyparse(home.path())
        .arg("info")
        .assert()
        .success()
        .stdout(predicate::str::contains("format: div"));
}

#[test]
fn missing_wiki_is_reported() {
    let home = TempDir::new().unwrap();
    tiddlyparse(home.path())
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("No wiki given"));
}
