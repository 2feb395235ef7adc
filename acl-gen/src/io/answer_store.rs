//! Persisted answers for stored questions (`.acl-gen/answers.json`).
//!
//! A question marked `store` gets its last answer back as the default on the
//! next run. The file is rewritten as soon as a stored question is answered.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use crate::core::questions::{Answers, Question};

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerStore {
    path: PathBuf,
    values: BTreeMap<String, Value>,
}

impl AnswerStore {
    /// Load stored answers. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self> {
        let values = if path.exists() {
            debug!(path = %path.display(), "loading stored answers");
            let contents = fs::read_to_string(path)
                .with_context(|| format!("read stored answers {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("parse stored answers {}", path.display()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// Replace defaults of stored questions with previously stored answers.
    pub fn apply_defaults(&self, questions: &mut [Question]) {
        for question in questions.iter_mut().filter(|q| q.store) {
            if let Some(stored) = self.values.get(question.name) {
                question.default = Some(stored.clone());
            }
        }
    }

    /// Record answers of stored questions and persist them.
    pub fn record(&mut self, questions: &[Question], answers: &Answers) -> Result<()> {
        let mut changed = false;
        for question in questions.iter().filter(|q| q.store) {
            let Some(value) = answers.get(question.name) else {
                continue;
            };
            if self.values.get(question.name) != Some(value) {
                self.values.insert(question.name.to_string(), value.clone());
                changed = true;
            }
        }
        if !changed {
            return Ok(());
        }
        debug!(path = %self.path.display(), count = self.values.len(), "writing stored answers");
        let mut buf = serde_json::to_string_pretty(&self.values)?;
        buf.push('\n');
        write_atomic(&self.path, &buf)
    }
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("answers path missing parent {}", path.display()))?;
    fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    let tmp_path = path.with_extension("json.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp answers {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace answers {}", path.display()))?;
    Ok(())
}
