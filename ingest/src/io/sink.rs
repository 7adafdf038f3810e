//! Persistence sinks for task documents.
//!
//! Two destinations exist: a `task.json` file in the working directory
//! (the default), or a database client constructed from a credential file.
//! Database backends live outside this crate; the [`CalcDb`] /
//! [`CalcDbFactory`] traits are the seam embedders implement.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::core::document::TaskDoc;
use crate::io::db_config::DbConfig;

/// File name used when no database is configured.
pub const TASK_FILENAME: &str = "task.json";

/// Database client for task documents.
pub trait CalcDb {
    /// Insert the document, returning the generated identifier.
    fn insert(&mut self, doc: &TaskDoc) -> Result<Value>;
}

/// Constructor seam for database clients.
pub trait CalcDbFactory {
    /// Construct a client from a validated credential file.
    fn open(&self, config: &DbConfig) -> Result<Box<dyn CalcDb>>;
}

/// Write the document to `task.json` under `dir` (atomic temp file +
/// rename). Returns the written path.
pub fn write_task_file(dir: &Path, doc: &TaskDoc) -> Result<PathBuf> {
    let path = dir.join(TASK_FILENAME);
    debug!(path = %path.display(), "writing task document");
    let buf = doc.to_json_string()?;
    write_atomic(&path, &buf)?;
    Ok(path)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("task file path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp task file {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace task file {}", path.display()))?;
    Ok(())
}
