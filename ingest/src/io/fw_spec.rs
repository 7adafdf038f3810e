//! Ambient workflow spec handed to the task by the invoking engine.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::core::locator::CalcLocEntry;

/// Workflow spec (JSON): recorded run locations, the shared `_fw_env`
/// machine configuration, and arbitrary engine-managed fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FwSpec {
    /// Run locations recorded by earlier tasks, oldest first.
    #[serde(default)]
    pub calc_locs: Vec<CalcLocEntry>,

    /// Per-machine shared configuration consulted by `>>key<<` indirection.
    #[serde(default, rename = "_fw_env")]
    pub fw_env: Map<String, Value>,

    /// Everything else the engine put in the spec.
    #[serde(default, flatten)]
    pub fields: Map<String, Value>,
}

impl FwSpec {
    /// Look up a free-form spec field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Load a workflow spec from a JSON file.
pub fn load_fw_spec(path: &Path) -> Result<FwSpec> {
    debug!(path = %path.display(), "loading workflow spec");
    let contents =
        fs::read_to_string(path).with_context(|| format!("read fw spec {}", path.display()))?;
    let spec: FwSpec = serde_json::from_str(&contents)
        .with_context(|| format!("parse fw spec {}", path.display()))?;
    debug!(calc_locs = spec.calc_locs.len(), "workflow spec loaded");
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn spec_round_trips_with_free_fields() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("fw_spec.json");
        fs::write(
            &path,
            json!({
                "calc_locs": [{"name": "nvt", "path": "/runs/nvt"}],
                "_fw_env": {"db_file": "/cluster/db.json"},
                "tags": {"project": "peo-melt"}
            })
            .to_string(),
        )
        .expect("write");

        let spec = load_fw_spec(&path).expect("load");
        assert_eq!(spec.calc_locs.len(), 1);
        assert_eq!(spec.calc_locs[0].name, "nvt");
        assert_eq!(spec.fw_env.get("db_file"), Some(&json!("/cluster/db.json")));
        assert_eq!(spec.field("tags"), Some(&json!({"project": "peo-melt"})));
        assert_eq!(spec.field("missing"), None);
    }

    #[test]
    fn empty_object_is_a_valid_spec() {
        let spec: FwSpec = serde_json::from_str("{}").expect("parse");
        assert_eq!(spec, FwSpec::default());
    }
}
