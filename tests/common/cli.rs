//! Runs the `homes` binary against an isolated config and data directory.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Helper to run homes commands with their own config file and favorites store
pub struct HomesCli {
    pub temp_dir: TempDir,
    binary_path: PathBuf,
}

impl HomesCli {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        HomesCli {
            temp_dir,
            binary_path: PathBuf::from(env!("CARGO_BIN_EXE_homes")),
        }
    }

    /// Like `new`, with the config pointing at `base_url`
    pub fn with_api(base_url: &str) -> Self {
        let cli = Self::new();
        cli.write_config(&format!("base_url: {base_url}\nremote_timeout: 5\n"));
        cli
    }

    pub fn config_path(&self) -> PathBuf {
        self.temp_dir.path().join("config.yaml")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.temp_dir.path().join("data")
    }

    pub fn write_config(&self, content: &str) {
        fs::write(self.config_path(), content).expect("Failed to write config file");
    }

    /// Raw content of the persisted favorites slot, if any
    pub fn read_favorites(&self) -> Option<String> {
        fs::read_to_string(self.data_dir().join("favorites.json")).ok()
    }

    pub fn write_favorites(&self, content: &str) {
        fs::create_dir_all(self.data_dir()).expect("Failed to create data directory");
        fs::write(self.data_dir().join("favorites.json"), content)
            .expect("Failed to write favorites file");
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(&self.binary_path)
            .args(args)
            .current_dir(self.temp_dir.path())
            .env("HOMES_CONFIG", self.config_path())
            .env("HOMES_DATA_DIR", self.data_dir())
            .env_remove("HOMES_API_URL")
            .output()
            .expect("Failed to execute homes command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }
}
