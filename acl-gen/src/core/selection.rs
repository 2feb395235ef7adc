//! Model selection: one named model or every model in the project.

use anyhow::{Result, anyhow};
use serde_json::Value;

use crate::core::types::{ModelDefinition, ModelFilter};

#[derive(Debug, Clone, PartialEq)]
pub enum ModelSelection {
    All,
    Named {
        name: String,
        definition: ModelDefinition,
    },
}

impl ModelSelection {
    pub fn model_name(&self) -> Option<&str> {
        match self {
            ModelSelection::All => None,
            ModelSelection::Named { name, .. } => Some(name),
        }
    }

    pub fn definition(&self) -> Option<&ModelDefinition> {
        match self {
            ModelSelection::All => None,
            ModelSelection::Named { definition, .. } => Some(definition),
        }
    }

    /// Store filter: exact name with limit 1, or unrestricted.
    pub fn filter(&self) -> ModelFilter {
        match self {
            ModelSelection::All => ModelFilter::All,
            ModelSelection::Named { name, .. } => ModelFilter::ByName(name.clone()),
        }
    }
}

/// Resolve the model answer against the loaded project.
///
/// A null (or absent) answer selects every model. A named answer must be one of
/// the editable model names and must have a loaded definition.
pub fn resolve_selection(
    answer: Option<&Value>,
    editable_model_names: &[String],
    models: &[ModelDefinition],
) -> Result<ModelSelection> {
    let name = match answer {
        None | Some(Value::Null) => return Ok(ModelSelection::All),
        Some(Value::String(name)) => name,
        Some(other) => return Err(anyhow!("unexpected model answer {other}")),
    };

    if !editable_model_names.iter().any(|n| n == name) {
        return Err(anyhow!("model '{name}' is not an editable model of this project"));
    }
    let definition = models
        .iter()
        .find(|m| &m.name == name)
        .cloned()
        .ok_or_else(|| anyhow!("model '{name}' has no loaded definition"))?;

    Ok(ModelSelection::Named {
        name: name.clone(),
        definition,
    })
}

/// Apply a filter to an ordered model list, preserving order.
pub fn filter_models(models: &[ModelDefinition], filter: &ModelFilter) -> Vec<ModelDefinition> {
    match filter {
        ModelFilter::All => models.to_vec(),
        ModelFilter::ByName(name) => models
            .iter()
            .filter(|m| &m.name == name)
            .take(1)
            .cloned()
            .collect(),
    }
}
