//! Environment-check indirection for configuration values.
//!
//! A configured value shaped `>>key<<` is a pointer into the workflow's
//! shared `_fw_env` mapping rather than a literal. This lets one workflow
//! definition run against per-machine settings (e.g. the database credential
//! file lives at a different path on each cluster).

use anyhow::{Result, anyhow, bail};
use serde_json::{Map, Value};

/// Resolve a possibly-indirect configuration value against `fw_env`.
///
/// - `None` resolves to `None`.
/// - `">>key<<"` resolves to `fw_env["key"]`, which must exist and be a
///   string; a dangling pointer is an error, not a literal.
/// - Anything else resolves to itself.
pub fn env_chk(raw: Option<&str>, fw_env: &Map<String, Value>) -> Result<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let Some(key) = raw
        .strip_prefix(">>")
        .and_then(|rest| rest.strip_suffix("<<"))
    else {
        return Ok(Some(raw.to_string()));
    };
    match fw_env.get(key) {
        Some(Value::String(concrete)) => Ok(Some(concrete.clone())),
        Some(other) => bail!(
            "_fw_env value for `{}` must be a string, got {}",
            key,
            other
        ),
        None => Err(anyhow!("`>>{}<<` not found in workflow _fw_env", key)),
    }
}
