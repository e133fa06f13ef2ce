//! Runs the `server` binary in `--update-users` mode against an empty roster.

use std::{fs, process::Command};

use serde_json::{Value, json};

fn write_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
  let store = dir.path().join("board.db");
  let config = dir.path().join("config.toml");
  fs::write(
    &config,
    format!(
      r#"
      store_path = {store:?}

      [directory]
      host          = "127.0.0.1"
      port          = 1
      realm         = "CORP"
      bind_username = "svc-board"
      bind_password = "hunter2"
      search_base   = "dc=corp,dc=example"
      timeout_secs  = 1
      "#
    ),
  )
  .unwrap();
  config
}

#[test]
fn update_users_prints_only_the_report_on_stdout() {
  let dir = tempfile::tempdir().unwrap();
  let config = write_config(&dir);

  let output = Command::new(env!("CARGO_BIN_EXE_server"))
    .arg("--config")
    .arg(&config)
    .arg("--update-users")
    .env("RUST_LOG", "debug")
    .output()
    .unwrap();

  let stdout = String::from_utf8_lossy(&output.stdout);
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(output.status.success(), "stderr: {stderr}");

  let report: Value = serde_json::from_str(&stdout)
    .unwrap_or_else(|e| panic!("stdout is not JSON ({e}): {stdout}"));
  assert_eq!(report, json!({ "updated": [], "failed": [] }));
  assert!(stderr.contains("directory refresh finished"), "stderr: {stderr}");
}
