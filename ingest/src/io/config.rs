//! Ingestion task configuration (TOML).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::locator::CalcLoc;

/// Configuration for one ingestion task (TOML).
///
/// This file is intended to be edited by humans and must remain stable and
/// automatable. Optional fields default to the conventional LAMMPS file
/// names documented per field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskConfig {
    /// Descriptor of the simulation's input/command set. Opaque to this
    /// task; recorded for provenance only.
    pub lammps_input: String,

    /// Explicit directory containing the run's output files. Takes
    /// precedence over `calc_loc`.
    #[serde(default)]
    pub calc_dir: Option<PathBuf>,

    /// Symbolic locator: `true` for the most recent recorded run, or a
    /// name matching a recorded run.
    #[serde(default)]
    pub calc_loc: Option<CalcLoc>,

    /// Parameters forwarded to the drone's diffusion analysis. When set, a
    /// summary of diffusion statistics is part of the parsed document.
    #[serde(default)]
    pub diffusion_params: Option<Map<String, Value>>,

    /// Path to the database credential file. Supports `>>key<<`
    /// indirection through the workflow's `_fw_env`. Unset means the
    /// document is written to `task.json` instead.
    #[serde(default)]
    pub db_file: Option<String>,

    /// Input file name inside the run directory. Default: `lammps.in`.
    #[serde(default = "default_input_filename")]
    pub input_filename: String,

    /// Data file name inside the run directory. Default: unset.
    #[serde(default)]
    pub data_filename: Option<String>,

    /// Log file name inside the run directory. Default: `lammps.log`.
    #[serde(default = "default_log_filename")]
    pub log_filename: String,

    /// Dump file name inside the run directory. Default: unset.
    #[serde(default)]
    pub dump_filename: Option<String>,

    /// Whether the run used a classical force field (as opposed to an
    /// ab-initio potential). Default: `true`.
    #[serde(default = "default_is_forcefield")]
    pub is_forcefield: bool,

    /// Name of a workflow-spec field whose (object) value is merged into
    /// the parsed document, overwriting same-named keys.
    #[serde(default)]
    pub fw_spec_field: Option<String>,

    #[serde(default)]
    pub drone: DroneConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DroneConfig {
    /// External parser command (e.g. `["lammps-drone"]`). Receives the
    /// assimilation request as JSON on stdin and must print the parsed
    /// document as JSON on stdout.
    pub command: Vec<String>,

    /// Wall-clock budget for one drone invocation in seconds.
    pub timeout_secs: u64,

    /// Truncate drone stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            command: vec!["lammps-drone".to_string()],
            timeout_secs: 10 * 60,
            output_limit_bytes: 10_000_000,
        }
    }
}

fn default_input_filename() -> String {
    "lammps.in".to_string()
}

fn default_log_filename() -> String {
    "lammps.log".to_string()
}

fn default_is_forcefield() -> bool {
    true
}

impl TaskConfig {
    pub fn validate(&self) -> Result<()> {
        if self.lammps_input.trim().is_empty() {
            return Err(anyhow!("lammps_input must be a non-empty descriptor"));
        }
        if self.input_filename.trim().is_empty() {
            return Err(anyhow!("input_filename must be non-empty"));
        }
        if self.log_filename.trim().is_empty() {
            return Err(anyhow!("log_filename must be non-empty"));
        }
        if self.drone.command.is_empty() || self.drone.command[0].trim().is_empty() {
            return Err(anyhow!("drone.command must be a non-empty array"));
        }
        if self.drone.timeout_secs == 0 {
            return Err(anyhow!("drone.timeout_secs must be > 0"));
        }
        if self.drone.output_limit_bytes == 0 {
            return Err(anyhow!("drone.output_limit_bytes must be > 0"));
        }
        Ok(())
    }
}

/// Load and validate a task config from a TOML file.
pub fn load_config(path: &Path) -> Result<TaskConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: TaskConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> TaskConfig {
        toml::from_str("lammps_input = \"peo.in\"").expect("parse")
    }

    #[test]
    fn minimal_config_gets_documented_defaults() {
        let cfg = minimal();
        assert_eq!(cfg.input_filename, "lammps.in");
        assert_eq!(cfg.data_filename, None);
        assert_eq!(cfg.log_filename, "lammps.log");
        assert_eq!(cfg.dump_filename, None);
        assert!(cfg.is_forcefield);
        assert_eq!(cfg.calc_dir, None);
        assert_eq!(cfg.calc_loc, None);
        assert_eq!(cfg.db_file, None);
        assert_eq!(cfg.fw_spec_field, None);
        assert_eq!(cfg.drone, DroneConfig::default());
        cfg.validate().expect("valid");
    }

    #[test]
    fn calc_loc_parses_bool_and_string_forms() {
        let cfg: TaskConfig =
            toml::from_str("lammps_input = \"peo.in\"\ncalc_loc = true").expect("parse");
        assert_eq!(cfg.calc_loc, Some(CalcLoc::MostRecent(true)));

        let cfg: TaskConfig =
            toml::from_str("lammps_input = \"peo.in\"\ncalc_loc = \"prod\"").expect("parse");
        assert_eq!(cfg.calc_loc, Some(CalcLoc::Named("prod".to_string())));
    }

    #[test]
    fn missing_lammps_input_fails_to_parse() {
        let err = toml::from_str::<TaskConfig>("calc_dir = \"/runs/1\"").expect_err("should fail");
        assert!(err.to_string().contains("lammps_input"));
    }

    #[test]
    fn empty_drone_command_fails_validation() {
        let mut cfg = minimal();
        cfg.drone.command = vec![];
        let err = cfg.validate().expect_err("should fail");
        assert!(err.to_string().contains("drone.command"));
    }

    #[test]
    fn zero_timeout_fails_validation() {
        let mut cfg = minimal();
        cfg.drone.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_config(&temp.path().join("missing.toml")).expect_err("should fail");
        assert!(err.to_string().contains("read"));
    }

    #[test]
    fn load_parses_full_config() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("ingest.toml");
        std::fs::write(
            &path,
            concat!(
                "lammps_input = \"peo.in\"\n",
                "calc_loc = \"nvt\"\n",
                "db_file = \">>db_file<<\"\n",
                "fw_spec_field = \"tags\"\n",
                "\n",
                "[diffusion_params]\n",
                "time_step = 2\n",
                "\n",
                "[drone]\n",
                "command = [\"python\", \"-m\", \"drone\"]\n",
                "timeout_secs = 60\n",
            ),
        )
        .expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.db_file.as_deref(), Some(">>db_file<<"));
        assert_eq!(cfg.fw_spec_field.as_deref(), Some("tags"));
        let diffusion = cfg.diffusion_params.expect("diffusion params");
        assert_eq!(diffusion.get("time_step"), Some(&serde_json::json!(2)));
        assert_eq!(cfg.drone.command, vec!["python", "-m", "drone"]);
        assert_eq!(cfg.drone.timeout_secs, 60);
        // Unspecified drone fields keep their defaults.
        assert_eq!(
            cfg.drone.output_limit_bytes,
            DroneConfig::default().output_limit_bytes
        );
    }
}
