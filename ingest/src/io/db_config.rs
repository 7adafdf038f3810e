//! Database credential file load with schema validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use jsonschema::Draft;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DB_CONFIG_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../schemas/db_config/v1.schema.json"
));

/// Database credentials (JSON file referenced by `db_file`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DbConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub database: String,
    #[serde(default = "default_collection")]
    pub collection: String,
    #[serde(default)]
    pub admin_user: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    27017
}

fn default_collection() -> String {
    "tasks".to_string()
}

/// Load a credential file, validating it against the bundled v1 schema
/// before deserialization.
pub fn load_db_config(path: &Path) -> Result<DbConfig> {
    let contents =
        fs::read_to_string(path).with_context(|| format!("read db config {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("parse db config {}", path.display()))?;
    validate_schema(&value)?;
    let config: DbConfig = serde_json::from_value(value)
        .with_context(|| format!("deserialize db config {}", path.display()))?;
    Ok(config)
}

/// Validate a credential document against the bundled JSON Schema
/// (Draft 2020-12).
pub fn validate_schema(instance: &Value) -> Result<()> {
    let schema: Value = serde_json::from_str(DB_CONFIG_SCHEMA).context("parse bundled schema")?;
    let compiled = jsonschema::options()
        .with_draft(Draft::Draft202012)
        .build(&schema)
        .context("compile db config schema")?;
    let messages: Vec<String> = compiled
        .iter_errors(instance)
        .map(|err| err.to_string())
        .collect();
    if !messages.is_empty() {
        bail!(
            "db config schema validation failed:\n- {}",
            messages.join("\n- ")
        );
    }
    Ok(())
}
