//! Test-only fakes for the generator's collaborators.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use serde_json::{Value, json};

use crate::core::questions::{Answers, Question};
use crate::core::selection::filter_models;
use crate::core::types::{AclEntry, Choice, ModelDefinition, ModelFilter};
use crate::core::validation::{FieldProblem, ValidationError};
use crate::io::prompt::{PromptEngine, ask_visible};
use crate::io::reporter::{ValidationReporter, render_error};
use crate::io::workspace::{
    Project, ProjectLoader, WorkspaceStore, default_access_types, default_builtin_roles,
    default_permission_types,
};

/// Prompt engine answering by question name; unscripted questions take their
/// default. Records which questions were actually shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: BTreeMap<String, Value>,
    asked: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(mut self, name: &str, value: Value) -> Self {
        self.answers.insert(name.to_string(), value);
        self
    }

    /// Question names shown so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }
}

impl PromptEngine for ScriptedPrompter {
    fn prompt(&mut self, questions: &[Question]) -> Result<Answers> {
        ask_visible(questions, |question, _answers| {
            self.asked.push(question.name.to_string());
            self.answers
                .get(question.name)
                .or(question.default.as_ref())
                .cloned()
                .ok_or_else(|| anyhow!("no scripted answer for '{}'", question.name))
        })
    }
}

/// Reporter keeping rendered reports in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    pub reports: Vec<String>,
}

impl ValidationReporter for RecordingReporter {
    fn report(&mut self, err: &anyhow::Error) {
        self.reports.push(render_error(err));
    }
}

/// In-memory project and model store with injectable failures.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    models: Vec<ModelDefinition>,
    failing: Vec<String>,
    fail_find: bool,
    fail_metadata: bool,
    attempted: Vec<String>,
    created: Vec<(String, AclEntry)>,
    find_calls: Vec<ModelFilter>,
    saves: usize,
}

impl InMemoryStore {
    pub fn with_models(names: &[&str]) -> Self {
        Self {
            models: names
                .iter()
                .map(|name| ModelDefinition {
                    name: name.to_string(),
                    acls: Vec::new(),
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Reject ACL creation on `model` with a validation error.
    pub fn failing_on(mut self, model: &str) -> Self {
        self.failing.push(model.to_string());
        self
    }

    pub fn failing_find(mut self) -> Self {
        self.fail_find = true;
        self
    }

    pub fn failing_metadata(mut self) -> Self {
        self.fail_metadata = true;
        self
    }

    pub fn attempted(&self) -> &[String] {
        &self.attempted
    }

    pub fn created(&self) -> &[(String, AclEntry)] {
        &self.created
    }

    pub fn find_calls(&self) -> &[ModelFilter] {
        &self.find_calls
    }

    pub fn saves(&self) -> usize {
        self.saves
    }

    fn metadata(&self, choices: Vec<Choice>) -> Result<Vec<Choice>> {
        if self.fail_metadata {
            return Err(anyhow!("workspace metadata unavailable"));
        }
        Ok(choices)
    }
}

impl ProjectLoader for InMemoryStore {
    fn load_project(&mut self) -> Result<Project> {
        Ok(Project {
            root: PathBuf::from("."),
            models: self.models.clone(),
        })
    }
}

impl WorkspaceStore for InMemoryStore {
    fn access_types(&self) -> Result<Vec<Choice>> {
        self.metadata(default_access_types())
    }

    fn builtin_roles(&self) -> Result<Vec<Choice>> {
        self.metadata(default_builtin_roles())
    }

    fn permission_types(&self) -> Result<Vec<Choice>> {
        self.metadata(default_permission_types())
    }

    fn find_models(&mut self, filter: &ModelFilter) -> Result<Vec<ModelDefinition>> {
        self.find_calls.push(filter.clone());
        if self.fail_find {
            return Err(anyhow!("model store offline"));
        }
        Ok(filter_models(&self.models, filter))
    }

    fn create_access_control(&mut self, model: &ModelDefinition, entry: &AclEntry) -> Result<()> {
        self.attempted.push(model.name.clone());
        if self.failing.contains(&model.name) {
            return Err(ValidationError {
                model: model.name.clone(),
                problems: vec![FieldProblem {
                    field: "principalId",
                    message: "is rejected by the store".to_string(),
                }],
            }
            .into());
        }
        self.created.push((model.name.clone(), entry.clone()));
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        self.saves += 1;
        Ok(())
    }
}

/// Temporary LoopBack project on disk.
pub struct TestProject {
    dir: tempfile::TempDir,
}

impl TestProject {
    /// Project with `package.json`, `server/` and one model file per name.
    pub fn new(models: &[&str]) -> Result<Self> {
        let dir = tempfile::tempdir()?;
        let root = dir.path();
        fs::write(root.join("package.json"), "{\"name\": \"sample-app\"}\n")?;
        fs::create_dir_all(root.join("server"))?;
        fs::create_dir_all(root.join("common/models"))?;
        let project = Self { dir };
        for name in models {
            project.write_model(name, json!({ "name": name, "base": "PersistedModel" }))?;
        }
        Ok(project)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn model_path(&self, name: &str) -> PathBuf {
        self.root()
            .join("common/models")
            .join(format!("{}.json", name.to_lowercase()))
    }

    pub fn write_model(&self, name: &str, definition: Value) -> Result<()> {
        let mut buf = serde_json::to_string_pretty(&definition)?;
        buf.push('\n');
        fs::write(self.model_path(name), buf)?;
        Ok(())
    }

    pub fn read_model(&self, name: &str) -> Result<Value> {
        Ok(serde_json::from_str(&fs::read_to_string(self.model_path(name))?)?)
    }

    pub fn component_config_path(&self) -> PathBuf {
        self.root().join("server/component-config.json")
    }

    pub fn write_component_config(&self, document: &Value) -> Result<()> {
        fs::write(
            self.component_config_path(),
            serde_json::to_string_pretty(document)?,
        )?;
        Ok(())
    }

    pub fn read_component_config(&self) -> Result<Value> {
        Ok(serde_json::from_str(&fs::read_to_string(self.component_config_path())?)?)
    }
}
