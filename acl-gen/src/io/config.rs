//! Generator configuration stored under `.acl-gen/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Relative location of the optional config file inside a project.
pub const CONFIG_RELATIVE_PATH: &str = ".acl-gen/config.toml";

/// Generator configuration (TOML).
///
/// Every field is optional in the file; missing fields fall back to the
/// LoopBack project layout defaults. Relative paths resolve against the
/// project root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Component configuration document patched on the auth-config path.
    pub component_config_path: PathBuf,

    /// Top-level key of the route-realm section in that document.
    pub component_name: String,

    /// Directories scanned for model definition JSON files, in order.
    pub model_dirs: Vec<PathBuf>,

    /// Where answers to stored questions are persisted between runs.
    pub answers_path: PathBuf,

    pub auth: AuthDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthDefaults {
    /// Default realm offered by the realm prompt.
    pub realm: String,
    /// Default public key server URL offered by the server prompt.
    pub server_url: String,
}

impl Default for AuthDefaults {
    fn default() -> Self {
        Self {
            realm: "SampleAppRealm".to_string(),
            server_url: "http://localhost:10080/FormBasedAuth-release71".to_string(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            component_config_path: PathBuf::from("server/component-config.json"),
            component_name: "loopback-mfp".to_string(),
            model_dirs: vec![
                PathBuf::from("common/models"),
                PathBuf::from("server/models"),
            ],
            answers_path: PathBuf::from(".acl-gen/answers.json"),
            auth: AuthDefaults::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if is_empty_path(&self.component_config_path) {
            return Err(anyhow!("component_config_path must not be empty"));
        }
        if self.component_name.trim().is_empty() {
            return Err(anyhow!("component_name must not be empty"));
        }
        if self.model_dirs.is_empty() || self.model_dirs.iter().any(is_empty_path) {
            return Err(anyhow!("model_dirs must be a non-empty array of paths"));
        }
        if is_empty_path(&self.answers_path) {
            return Err(anyhow!("answers_path must not be empty"));
        }
        Ok(())
    }
}

fn is_empty_path(path: impl AsRef<Path>) -> bool {
    path.as_ref().as_os_str().is_empty()
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `GeneratorConfig::default()`.
pub fn load_config(path: &Path) -> Result<GeneratorConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        let cfg = GeneratorConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: GeneratorConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Load `<root>/.acl-gen/config.toml`.
pub fn load_project_config(root: &Path) -> Result<GeneratorConfig> {
    load_config(&root.join(CONFIG_RELATIVE_PATH))
}
