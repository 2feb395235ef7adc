//! Component configuration document (`server/component-config.json`).
//!
//! Reads are tolerant: a missing, unreadable or malformed document is treated
//! as an empty object. Writes replace the whole document (temp file + rename).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Read the document, falling back to `{}` on any read or parse problem.
pub fn read_component_config(path: &Path) -> Value {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(path = %path.display(), error = %err, "component config unreadable, starting empty");
            return Value::Object(Map::new());
        }
    };
    match serde_json::from_str::<Value>(&contents) {
        Ok(value @ Value::Object(_)) => {
            debug!(path = %path.display(), "component config loaded");
            value
        }
        Ok(_) => {
            warn!(path = %path.display(), "component config is not a JSON object, starting empty");
            Value::Object(Map::new())
        }
        Err(err) => {
            warn!(path = %path.display(), error = %err, "component config is not valid JSON, starting empty");
            Value::Object(Map::new())
        }
    }
}

/// Replace the document on disk with `document`.
pub fn write_component_config(path: &Path, document: &Value) -> Result<()> {
    let mut buf = serde_json::to_string_pretty(document).context("serialize component config")?;
    buf.push('\n');
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, buf)
        .with_context(|| format!("write temp component config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path)
        .with_context(|| format!("replace component config {}", path.display()))?;
    Ok(())
}
