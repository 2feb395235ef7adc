//! Workspace model store backed by a LoopBack project on disk.
//!
//! [`ProjectLoader`] and [`WorkspaceStore`] decouple the generator from the
//! project layout. [`ProjectWorkspace`] reads model definition JSON files from
//! the configured model directories, appends ACL entries in memory and writes
//! the touched files back on [`WorkspaceStore::save`].

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::core::questions::AclMetadata;
use crate::core::selection::filter_models;
use crate::core::types::{AclEntry, Choice, ModelDefinition, ModelFilter};
use crate::core::validation::validate_entry;

const ACLS: &str = "acls";

/// Models loaded from the current project.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    pub root: PathBuf,
    pub models: Vec<ModelDefinition>,
}

impl Project {
    /// Names offered by the model prompt, in load order.
    pub fn editable_model_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name.clone()).collect()
    }
}

/// Loads the editable models of the current project.
pub trait ProjectLoader {
    fn load_project(&mut self) -> Result<Project>;
}

/// Persistent model-definition store.
pub trait WorkspaceStore {
    fn access_types(&self) -> Result<Vec<Choice>>;
    fn builtin_roles(&self) -> Result<Vec<Choice>>;
    fn permission_types(&self) -> Result<Vec<Choice>>;

    /// Models matching `filter`, in load order. `ModelFilter::All` must not
    /// reuse a previously cached list.
    fn find_models(&mut self, filter: &ModelFilter) -> Result<Vec<ModelDefinition>>;

    /// Validate `entry` and append it to `model`'s access controls.
    fn create_access_control(&mut self, model: &ModelDefinition, entry: &AclEntry) -> Result<()>;

    /// Persist pending model changes.
    fn save(&mut self) -> Result<()>;
}

/// Query the three metadata enumerations. Any failure aborts the run.
pub fn load_metadata<S: WorkspaceStore + ?Sized>(store: &S) -> Result<AclMetadata> {
    Ok(AclMetadata {
        access_types: store.access_types().context("load access types")?,
        roles: store.builtin_roles().context("load builtin roles")?,
        permissions: store.permission_types().context("load permission types")?,
    })
}

pub fn default_access_types() -> Vec<Choice> {
    vec![
        Choice::new("All (match all types)", "*"),
        Choice::new("Read", "READ"),
        Choice::new("Write", "WRITE"),
        Choice::new("Execute", "EXECUTE"),
    ]
}

pub fn default_builtin_roles() -> Vec<Choice> {
    vec![
        Choice::new("All users", "$everyone"),
        Choice::new("Any unauthenticated user", "$unauthenticated"),
        Choice::new("Any authenticated user", "$authenticated"),
        Choice::new("The user owning the object", "$owner"),
    ]
}

pub fn default_permission_types() -> Vec<Choice> {
    vec![
        Choice::new("Explicitly grant access", "ALLOW"),
        Choice::new("Explicitly deny access", "DENY"),
    ]
}

/// True if `root` looks like a LoopBack application.
pub fn is_project_dir(root: &Path) -> bool {
    root.join("package.json").is_file() && root.join("server").is_dir()
}

/// One model definition file and its pending state.
#[derive(Debug, Clone)]
struct ModelFile {
    path: PathBuf,
    name: String,
    document: Map<String, Value>,
    dirty: bool,
}

impl ModelFile {
    fn read(path: &Path) -> Result<Self> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("read model {}", path.display()))?;
        let value: Value = serde_json::from_str(&contents)
            .with_context(|| format!("parse model {}", path.display()))?;
        let Value::Object(document) = value else {
            return Err(anyhow!("model {} is not a JSON object", path.display()));
        };
        let name = document
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| anyhow!("model {} has no name", path.display()))?
            .to_string();
        Ok(Self {
            path: path.to_path_buf(),
            name,
            document,
            dirty: false,
        })
    }

    fn definition(&self) -> ModelDefinition {
        let acls = match self.document.get(ACLS) {
            Some(Value::Array(entries)) => entries.clone(),
            _ => Vec::new(),
        };
        ModelDefinition {
            name: self.name.clone(),
            acls,
        }
    }

    fn push_acl(&mut self, entry: Value) -> Result<()> {
        let acls = self
            .document
            .entry(ACLS)
            .or_insert_with(|| Value::Array(Vec::new()));
        let Value::Array(entries) = acls else {
            return Err(anyhow!("model {} has a non-array acls field", self.path.display()));
        };
        entries.push(entry);
        self.dirty = true;
        Ok(())
    }

    fn write(&self) -> Result<()> {
        let mut buf = serde_json::to_string_pretty(&self.document)
            .with_context(|| format!("serialize model {}", self.name))?;
        buf.push('\n');
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, buf)
            .with_context(|| format!("write temp model {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .with_context(|| format!("replace model {}", self.path.display()))?;
        Ok(())
    }
}

/// Filesystem-backed project and model store.
#[derive(Debug)]
pub struct ProjectWorkspace {
    root: PathBuf,
    model_dirs: Vec<PathBuf>,
    models: Vec<ModelFile>,
    loaded: bool,
}

impl ProjectWorkspace {
    /// `model_dirs` are resolved against `root` unless absolute.
    pub fn new(root: impl Into<PathBuf>, model_dirs: &[PathBuf]) -> Self {
        let root = root.into();
        let model_dirs = model_dirs.iter().map(|dir| root.join(dir)).collect();
        Self {
            root,
            model_dirs,
            models: Vec::new(),
            loaded: false,
        }
    }

    fn scan(&mut self) -> Result<()> {
        if self.models.iter().any(|m| m.dirty) {
            debug!("pending model changes, keeping loaded models");
            return Ok(());
        }
        let mut models: Vec<ModelFile> = Vec::new();
        for dir in &self.model_dirs {
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "model directory missing, skipping");
                continue;
            }
            for path in json_files(dir)? {
                let model = ModelFile::read(&path)?;
                if models.iter().any(|m| m.name == model.name) {
                    warn!(
                        model = %model.name,
                        path = %path.display(),
                        "duplicate model name, ignoring file"
                    );
                    continue;
                }
                models.push(model);
            }
        }
        debug!(count = models.len(), "models loaded");
        self.models = models;
        self.loaded = true;
        Ok(())
    }

    fn definitions(&self) -> Vec<ModelDefinition> {
        self.models.iter().map(ModelFile::definition).collect()
    }
}

/// `*.json` files directly inside `dir`, sorted by file name.
fn json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry.context("read entry")?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

impl ProjectLoader for ProjectWorkspace {
    fn load_project(&mut self) -> Result<Project> {
        if !is_project_dir(&self.root) {
            return Err(anyhow!(
                "{} is not a LoopBack project (expected package.json and server/)",
                self.root.display()
            ));
        }
        self.scan()?;
        Ok(Project {
            root: self.root.clone(),
            models: self.definitions(),
        })
    }
}

impl WorkspaceStore for ProjectWorkspace {
    fn access_types(&self) -> Result<Vec<Choice>> {
        Ok(default_access_types())
    }

    fn builtin_roles(&self) -> Result<Vec<Choice>> {
        Ok(default_builtin_roles())
    }

    fn permission_types(&self) -> Result<Vec<Choice>> {
        Ok(default_permission_types())
    }

    fn find_models(&mut self, filter: &ModelFilter) -> Result<Vec<ModelDefinition>> {
        if matches!(filter, ModelFilter::All) || !self.loaded {
            self.scan()?;
        }
        Ok(filter_models(&self.definitions(), filter))
    }

    fn create_access_control(&mut self, model: &ModelDefinition, entry: &AclEntry) -> Result<()> {
        let metadata = load_metadata(&*self)?;
        validate_entry(&model.name, entry, &metadata)?;
        let value = serde_json::to_value(entry).context("serialize ACL entry")?;
        let file = self
            .models
            .iter_mut()
            .find(|m| m.name == model.name)
            .ok_or_else(|| anyhow!("model '{}' not found in workspace", model.name))?;
        file.push_acl(value)?;
        debug!(model = %model.name, "ACL entry added");
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let mut saved = 0usize;
        for model in self.models.iter_mut().filter(|m| m.dirty) {
            model.write()?;
            model.dirty = false;
            saved += 1;
        }
        info!(saved, "project saved");
        Ok(())
    }
}
