use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

/// Command running in a scratch directory with no ambient config or env.
fn storefront(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("storefront").expect("binary built");
    cmd.current_dir(dir.path())
        .env_remove("STOREFRONT_CATALOG_URL")
        .env_remove("STOREFRONT_DATABASE")
        .env("RUST_LOG", "error");
    cmd
}

#[test]
fn cli_returns_nonzero_on_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[cart]\nchannel_capacity = 0\n").unwrap();

    storefront(&dir)
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("channel_capacity"));
}

#[test]
fn config_validate_accepts_defaults() {
    let dir = tempfile::tempdir().unwrap();

    storefront(&dir)
        .args(["config", "validate", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"valid\":true"));
}

#[test]
fn config_show_reflects_env_override() {
    let dir = tempfile::tempdir().unwrap();

    storefront(&dir)
        .env("STOREFRONT_CATALOG_URL", "http://127.0.0.1:8080")
        .args(["config", "show", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("http://127.0.0.1:8080"));
}

#[test]
fn empty_cart_shows_as_json() {
    let dir = tempfile::tempdir().unwrap();

    storefront(&dir)
        .args(["cart", "show", "--json", "--ephemeral"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"lines\":[]"))
        .stdout(predicate::str::contains("\"items\":0"));
}

#[test]
fn cart_commands_use_configured_database() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("cart.db");

    storefront(&dir)
        .env("STOREFRONT_DATABASE", &db)
        .args(["cart", "clear", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"removed\":0"));

    assert!(db.exists(), "database file should be created");

    storefront(&dir)
        .env("STOREFRONT_DATABASE", &db)
        .args(["cart", "set", "5", "3", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"line\":null"));
}

#[test]
fn checkout_rejects_empty_cart() {
    let dir = tempfile::tempdir().unwrap();

    storefront(&dir)
        .args([
            "checkout",
            "--ephemeral",
            "--name",
            "Ada",
            "--address",
            "1 Main St",
            "--city",
            "London",
            "--zip",
            "N1",
            "--card",
            "4242",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("empty cart"));
}

#[test]
fn checkout_rejects_blank_field() {
    let dir = tempfile::tempdir().unwrap();

    storefront(&dir)
        .args([
            "checkout",
            "--ephemeral",
            "--name",
            "Ada",
            "--address",
            " ",
            "--city",
            "London",
            "--zip",
            "N1",
            "--card",
            "4242",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("address"));
}

#[test]
fn unreachable_catalog_fails_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storefront.toml");
    fs::write(
        &path,
        "[catalog]\nbase_url = \"http://127.0.0.1:9\"\ntimeout_ms = 2000\nconnect_timeout_ms = 500\n",
    )
    .unwrap();

    storefront(&dir)
        .args(["products", "--ephemeral"])
        .assert()
        .failure();
}
