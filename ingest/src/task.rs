//! Orchestration of the result-ingestion task.
//!
//! One synchronous, single-shot procedure with five ordered steps: resolve
//! the run directory, parse it with a drone, optionally merge a workflow-spec
//! field into the document, persist the document (file or database), and
//! report the stored `task_id`. Every failure propagates to the caller; any
//! retry policy belongs to the invoking workflow engine.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::{debug, info};

use crate::core::document::TaskDoc;
use crate::core::env_chk::env_chk;
use crate::core::locator::resolve_run_dir;
use crate::io::config::TaskConfig;
use crate::io::db_config::load_db_config;
use crate::io::drone::{AssimilateRequest, Drone};
use crate::io::fw_spec::FwSpec;
use crate::io::sink::{CalcDbFactory, write_task_file};

/// Completion signal handed back to the invoking engine. No follow-on tasks
/// are scheduled; the stored identifier is the only payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskOutcome {
    /// The document's `task_id`, absent when the document carries none.
    pub task_id: Option<Value>,
}

/// Run the ingestion task.
///
/// `root` is the task's working directory: the run-directory fallback when
/// neither `calc_dir` nor `calc_loc` is configured, and the destination for
/// `task.json` when no database resolves.
pub fn run_ingest<D: Drone, F: CalcDbFactory>(
    root: &Path,
    config: &TaskConfig,
    fw_spec: &FwSpec,
    drone: &D,
    db_factory: &F,
) -> Result<TaskOutcome> {
    config.validate()?;

    let dir = resolve_run_dir(
        config.calc_dir.as_deref(),
        config.calc_loc.as_ref(),
        &fw_spec.calc_locs,
        root,
    )?;
    info!(dir = %dir.display(), "parsing directory");

    let request = AssimilateRequest::new(dir, config);
    let mut doc = drone.assimilate(&request)?;

    if let Some(field) = &config.fw_spec_field {
        merge_spec_field(&mut doc, fw_spec, field)?;
    }

    let db_file = env_chk(config.db_file.as_deref(), &fw_spec.fw_env)?;
    match db_file {
        None => {
            let path = write_task_file(root, &doc)?;
            debug!(path = %path.display(), "task document written to file");
        }
        Some(db_file) => {
            let db_config = load_db_config(Path::new(&db_file))?;
            let mut db = db_factory
                .open(&db_config)
                .context("construct database client")?;
            let id = db.insert(&doc).context("insert task document")?;
            // Record the generated identifier so the reported outcome and
            // the inserted document agree.
            doc.set_task_id(id);
        }
    }

    let task_id = doc.task_id().cloned();
    info!(task_id = ?task_id, "finished ingesting run");
    Ok(TaskOutcome { task_id })
}

fn merge_spec_field(doc: &mut TaskDoc, fw_spec: &FwSpec, field: &str) -> Result<()> {
    let value = fw_spec
        .field(field)
        .ok_or_else(|| anyhow!("fw_spec field `{}` not present in workflow spec", field))?;
    let map = value
        .as_object()
        .ok_or_else(|| anyhow!("fw_spec field `{}` must be an object", field))?;
    debug!(field, keys = map.len(), "merging workflow spec field");
    doc.update(map);
    Ok(())
}
