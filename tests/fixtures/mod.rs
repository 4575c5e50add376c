//! Shared test fixtures for E2E CLI tests.
#![allow(dead_code)] // Not every test file uses every fixture

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the defgen binary
pub fn defgen_bin() -> &'static str {
    env!("CARGO_BIN_EXE_defgen")
}

/// Config file written into every workspace.
pub const WORKSPACE_CONFIG: &str = r#"[paths]
data_dir = "data/json"
xml_dir = "data/xml"
definitions_dir = "Definitions"
"#;

/// Overhead battery button (synchronized toggle) plus an ungrouped light test.
pub const OVERHEAD_JSON: &str = r#"{
  "category": "overhead_panel",
  "description": "Overhead Panel",
  "events": [
    "OVHD_ELEC_BAT_BT_LEFT_BUTTON_DOWN",
    "OVHD_ELEC_BAT_BT_LEFT_BUTTON_UP",
    "OVHD_LIGHT_TEST"
  ]
}
"#;

/// Pedestal radar button (direct trigger), a speed knob and a native radio event.
pub const PEDESTAL_JSON: &str = r#"{
  "category": "pedestal",
  "events": [
    "PED_WX_BT_LEFT_BUTTON_DOWN",
    "PED_VOL_KB_WHEEL_UP",
    "PED_VOL_KB_WHEEL_DOWN",
    "COM1_RADIO_SWAP"
  ]
}
"#;

/// Known variables for the two categories above.
pub const VARIABLES_JSON: &str = r#"{"variables": ["MD11_OVHD_ELEC_BAT_BT", "MD11_PED_VOL_KB"]}"#;

/// Aircraft document with hand-written content and a stale generated entry.
pub const EXISTING_AIRCRAFT: &str = "# TFDi Design MD-11 Configuration File for FS Copilot
# Hand-edited

include:
  - standard/common.yaml

shared:
  # Custom sync kept by hand
  - # Custom
    get: L:CUSTOM_VAR
    set: (>B:CUSTOM_EVENT)

  - # Old generated
    get: L:MD11_OVHD_OLD_BT
    set: \"value ? '(>B:OVHD_OLD_BT_LEFT_BUTTON_UP)' : '(>B:OVHD_OLD_BT_LEFT_BUTTON_DOWN)'\"

master:
  - get: A:LIGHT NAV
    set: (>K:TOGGLE_NAV_LIGHTS)
";

/// A temporary project directory with data, config and definitions.
pub struct Workspace {
    temp_dir: TempDir,
}

impl Workspace {
    /// Creates a workspace with the standard categories, variables and config.
    pub fn new() -> Self {
        let workspace = Self::empty();
        workspace.write_category("overhead_panel", OVERHEAD_JSON);
        workspace.write_category("pedestal", PEDESTAL_JSON);
        workspace.write_variables(VARIABLES_JSON);
        workspace
    }

    /// Creates a workspace with only the config file and an empty data directory.
    pub fn empty() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir_all(temp_dir.path().join("data/json")).expect("Failed to create data dir");
        fs::write(temp_dir.path().join("defgen.toml"), WORKSPACE_CONFIG)
            .expect("Failed to write config");
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root().join("data/json")
    }

    pub fn aircraft_file(&self) -> PathBuf {
        self.root().join("Definitions/TFDi_Design_MD-11.yaml")
    }

    pub fn modules_dir(&self) -> PathBuf {
        self.root().join("Definitions/modules/tfdi-md11")
    }

    pub fn module_file(&self, name: &str) -> PathBuf {
        self.modules_dir().join(format!("TFDi_MD11_{name}.yaml"))
    }

    pub fn write_category(&self, name: &str, json: &str) {
        fs::write(self.data_dir().join(format!("{name}.json")), json)
            .expect("Failed to write category");
    }

    pub fn write_variables(&self, json: &str) {
        fs::write(self.data_dir().join("variables.json"), json).expect("Failed to write variables");
    }

    pub fn write_aircraft(&self, content: &str) {
        let path = self.aircraft_file();
        fs::create_dir_all(path.parent().unwrap()).expect("Failed to create definitions dir");
        fs::write(path, content).expect("Failed to write aircraft file");
    }

    pub fn read_aircraft(&self) -> String {
        fs::read_to_string(self.aircraft_file()).expect("Failed to read aircraft file")
    }

    pub fn read_category(&self, name: &str) -> serde_json::Value {
        let content = fs::read_to_string(self.data_dir().join(format!("{name}.json")))
            .expect("Failed to read category");
        serde_json::from_str(&content).expect("Category file should be JSON")
    }

    /// Runs defgen in the workspace root (picking up `./defgen.toml`).
    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(defgen_bin())
            .args(args)
            .current_dir(self.root())
            .env_remove("RUST_LOG")
            .output()
            .expect("Failed to execute command")
    }
}

/// Asserts a zero exit code, showing stderr on failure.
pub fn assert_success(output: &Output) {
    assert_eq!(
        output.status.code(),
        Some(0),
        "Command should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}
