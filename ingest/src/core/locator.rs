//! Run-directory resolution for completed calculations.
//!
//! A finished run is located either by an explicit directory, by a symbolic
//! [`CalcLoc`] resolved against the workflow's recorded locations, or by
//! falling back to a default directory. Exactly one strategy applies per
//! invocation, in that order of precedence.

use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};

/// Symbolic reference to a previously recorded run directory.
///
/// In configuration files this is either a boolean (`true` selects the most
/// recent recorded location) or a string (selects the most recent location
/// recorded under that name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalcLoc {
    /// `true` selects the most recent location; `false` behaves as if no
    /// locator was given at all.
    MostRecent(bool),
    /// Select the most recent location recorded under this name.
    Named(String),
}

impl CalcLoc {
    /// Whether this locator actually selects anything (`calc_loc = false`
    /// is treated the same as an absent locator).
    pub fn is_set(&self) -> bool {
        !matches!(self, CalcLoc::MostRecent(false))
    }
}

/// One recorded run location, as maintained by the invoking workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalcLocEntry {
    /// Name the location was recorded under.
    pub name: String,
    /// Directory containing the run's output files.
    pub path: PathBuf,
}

/// Resolve a symbolic locator against the recorded locations (oldest first).
///
/// Fails when the list is empty or no entry matches; an unresolved locator
/// must surface as an error rather than silently falling back elsewhere.
pub fn get_calc_loc<'a>(loc: &CalcLoc, calc_locs: &'a [CalcLocEntry]) -> Result<&'a CalcLocEntry> {
    match loc {
        CalcLoc::MostRecent(_) => calc_locs
            .last()
            .ok_or_else(|| anyhow!("no calc locations recorded in workflow spec")),
        CalcLoc::Named(name) => calc_locs
            .iter()
            .rev()
            .find(|entry| entry.name == *name)
            .ok_or_else(|| anyhow!("no calc location named `{}`", name)),
    }
}

/// Resolve the directory to ingest.
///
/// Precedence: explicit `calc_dir` (the recorded locations are never
/// consulted), then `calc_loc` via [`get_calc_loc`] (resolution failure is an
/// error, never a fallback), then `default_dir`.
pub fn resolve_run_dir(
    calc_dir: Option<&Path>,
    calc_loc: Option<&CalcLoc>,
    calc_locs: &[CalcLocEntry],
    default_dir: &Path,
) -> Result<PathBuf> {
    if let Some(dir) = calc_dir {
        return Ok(dir.to_path_buf());
    }
    if let Some(loc) = calc_loc
        && loc.is_set()
    {
        return Ok(get_calc_loc(loc, calc_locs)?.path.clone());
    }
    Ok(default_dir.to_path_buf())
}
