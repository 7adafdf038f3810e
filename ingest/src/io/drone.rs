//! Drone abstraction for parsing run output into a task document.
//!
//! The [`Drone`] trait decouples the ingestion task from the actual parser
//! backend. The shipped backend spawns an external parser command; tests use
//! scripted drones that return predetermined documents without spawning
//! processes.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, instrument};

use crate::core::document::{TaskDoc, datetime_value};
use crate::io::config::{DroneConfig, TaskConfig};
use crate::io::process::run_command_with_timeout;

/// Parameters for one assimilation: the resolved run directory plus the
/// file-name overrides with their defaults already applied.
#[derive(Debug, Clone, Serialize)]
pub struct AssimilateRequest {
    /// Directory containing the run's output files.
    pub dir: PathBuf,
    pub input_filename: String,
    pub data_filename: Option<String>,
    pub log_filename: String,
    pub dump_filename: Option<String>,
    pub is_forcefield: bool,
    pub diffusion_params: Option<Map<String, Value>>,
}

impl AssimilateRequest {
    /// Build a request for `dir` from the task configuration.
    pub fn new(dir: PathBuf, config: &TaskConfig) -> Self {
        Self {
            dir,
            input_filename: config.input_filename.clone(),
            data_filename: config.data_filename.clone(),
            log_filename: config.log_filename.clone(),
            dump_filename: config.dump_filename.clone(),
            is_forcefield: config.is_forcefield,
            diffusion_params: config.diffusion_params.clone(),
        }
    }
}

/// Abstraction over parser backends.
pub trait Drone {
    /// Parse the run directory into a task document. Fails on unparsable or
    /// missing artifacts; the caller propagates the error untouched.
    fn assimilate(&self, request: &AssimilateRequest) -> Result<TaskDoc>;
}

/// Drone backend that spawns an external parser command.
///
/// The command receives the JSON-serialized [`AssimilateRequest`] on stdin
/// and must print the parsed document as a JSON object on stdout, exiting 0.
pub struct CommandDrone {
    command: Vec<String>,
    timeout: Duration,
    output_limit_bytes: usize,
}

impl CommandDrone {
    pub fn from_config(config: &DroneConfig) -> Self {
        Self {
            command: config.command.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            output_limit_bytes: config.output_limit_bytes,
        }
    }
}

impl Drone for CommandDrone {
    #[instrument(skip_all, fields(dir = %request.dir.display()))]
    fn assimilate(&self, request: &AssimilateRequest) -> Result<TaskDoc> {
        if !request.dir.is_dir() {
            bail!("run directory {} does not exist", request.dir.display());
        }
        info!(command = %self.command.join(" "), "starting drone");

        let payload = serde_json::to_vec(request).context("serialize assimilate request")?;
        let mut cmd = Command::new(&self.command[0]);
        cmd.args(&self.command[1..]).current_dir(&request.dir);

        let output =
            run_command_with_timeout(cmd, Some(&payload), self.timeout, self.output_limit_bytes)
                .context("run drone command")?;

        if output.timed_out {
            bail!("drone timed out after {}s", self.timeout.as_secs());
        }
        if !output.status.success() {
            bail!(
                "drone exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let mut doc: TaskDoc = serde_json::from_slice(&output.stdout)
            .context("parse drone output as task document")?;
        if !doc.contains_key("last_updated") {
            doc.insert("last_updated", datetime_value(Utc::now()));
        }
        Ok(doc)
    }
}
