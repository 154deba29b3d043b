//! Common test utilities for CLI integration tests.
//!
//! Every test gets its own data directory, and every booking is evaluated
//! as of a fixed day so the booking window does not depend on the clock.

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::TempDir;

/// The day every test books relative to.
#[allow(dead_code)]
pub const TODAY: &str = "2025-03-10";

/// Test environment with isolated data directory.
pub struct TestEnv {
    /// Temporary directory (kept alive for the duration of the test)
    #[allow(dead_code)]
    temp_dir: TempDir,
    /// Path to the parkbook data directory
    pub data_dir: PathBuf,
}

#[allow(dead_code)]
impl TestEnv {
    /// Create a new test environment.
    ///
    /// The data directory is not created; parkbook creates it on first use.
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("parkbook-data");

        Self { temp_dir, data_dir }
    }

    /// Get a bare command builder without pre-configured flags.
    pub fn command_bare(&self) -> Command {
        let mut cmd = Command::cargo_bin("parkbook").expect("Failed to find parkbook binary");
        for (key, _) in std::env::vars() {
            if key.starts_with("PARKBOOK_") {
                cmd.env_remove(key);
            }
        }
        cmd
    }

    /// Get a command builder with the data directory pre-configured.
    pub fn command(&self) -> Command {
        let mut cmd = self.command_bare();
        cmd.arg("--data-dir").arg(&self.data_dir);
        cmd
    }

    /// Write `config.yaml` into the data directory.
    pub fn write_config(&self, yaml: &str) {
        std::fs::create_dir_all(&self.data_dir).expect("Failed to create data dir");
        std::fs::write(self.data_dir.join("config.yaml"), yaml).expect("Failed to write config");
    }

    /// Add an itinerant slot.
    pub fn add_slot(&self, code: &str, vehicle: &str) {
        self.command()
            .args(["slot", "add", code, "--vehicle", vehicle])
            .assert()
            .success();
    }

    /// Run `reserve` for `TODAY` and return the raw command for assertions.
    pub fn reserve(&self, vehicle: &str, turn: &str, email: &str) -> Command {
        let mut cmd = self.command();
        cmd.args([
            "reserve", "--vehicle", vehicle, "--turn", turn, "--date", TODAY, "--today", TODAY,
            "--email", email,
        ]);
        cmd
    }

    /// Book and return the slot code printed in quiet mode.
    ///
    /// # Panics
    /// Panics if the reservation fails.
    pub fn reserve_code(&self, vehicle: &str, turn: &str, email: &str) -> String {
        let output = self
            .reserve(vehicle, turn, email)
            .arg("--quiet")
            .output()
            .expect("Failed to run reserve command");

        assert!(
            output.status.success(),
            "Reserve failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        String::from_utf8(output.stdout)
            .expect("Invalid UTF-8 in output")
            .trim()
            .to_string()
    }

    /// List reservations on `TODAY` as JSON.
    pub fn list_json(&self, extra: &[&str]) -> Vec<serde_json::Value> {
        let output = self
            .command()
            .args(["list", "--format", "json", "--date", TODAY])
            .args(extra)
            .output()
            .expect("Failed to run list command");

        assert!(
            output.status.success(),
            "List failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );

        serde_json::from_slice(&output.stdout).expect("List output is not JSON")
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}
