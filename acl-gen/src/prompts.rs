//! Prompt orchestration for the ACL generator.
//!
//! Runs the question groups in order (model, then parameters) and returns the
//! accumulated run state instead of mutating a shared generator object.

use anyhow::{Context, Result, anyhow};
use tracing::debug;

use crate::core::descriptor::{ParameterSelection, build_descriptor};
use crate::core::questions::{
    AclMetadata, MODEL, check_dependency_order, model_questions, parameter_questions,
};
use crate::core::selection::{ModelSelection, resolve_selection};
use crate::core::types::AclDescriptor;
use crate::io::prompt::PromptEngine;
use crate::io::workspace::Project;

/// Everything the prompt flow collected for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct AclRun {
    pub model: ModelSelection,
    pub method: Option<String>,
    pub property: Option<String>,
    pub descriptor: AclDescriptor,
}

/// Ask which model the entry applies to.
pub fn ask_for_model<P: PromptEngine + ?Sized>(
    engine: &mut P,
    project: &Project,
) -> Result<ModelSelection> {
    let editable = project.editable_model_names();
    let questions = model_questions(&editable);
    let answers = engine.prompt(&questions).context("ask for model")?;
    let selection = resolve_selection(answers.get(MODEL), &editable, &project.models)?;
    debug!(model = ?selection.model_name(), "model selected");
    Ok(selection)
}

/// Ask for scope, method/property, access type, role and permission.
pub fn ask_for_parameters<P: PromptEngine + ?Sized>(
    engine: &mut P,
    metadata: &AclMetadata,
) -> Result<ParameterSelection> {
    let questions = parameter_questions(metadata);
    check_dependency_order(&questions).map_err(|msg| anyhow!(msg))?;
    let answers = engine
        .prompt(&questions)
        .context("ask for ACL parameters")?;
    let selection = build_descriptor(&answers)?;
    debug!(
        scope = selection.scope.as_str(),
        permission = %selection.descriptor.permission,
        principal = %selection.descriptor.principal_id,
        "ACL parameters collected"
    );
    Ok(selection)
}

/// Run both groups in order. The parameter group is only shown once the model
/// answer is known.
pub fn ask_acl<P: PromptEngine + ?Sized>(
    engine: &mut P,
    project: &Project,
    metadata: &AclMetadata,
) -> Result<AclRun> {
    let model = ask_for_model(engine, project)?;
    let parameters = ask_for_parameters(engine, metadata)?;
    Ok(AclRun {
        model,
        method: parameters.method,
        property: parameters.property,
        descriptor: parameters.descriptor,
    })
}
