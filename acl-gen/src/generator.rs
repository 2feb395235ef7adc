//! End-to-end ACL generator run.
//!
//! Order: load project, load metadata, ask for model and parameters, then
//! either apply the ACL entry or patch the component configuration, and
//! finally save the project. The two branches never both run.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::apply::{ApplyOutcome, apply_acl};
use crate::auth_config::{ask_auth_settings, patch_component_config};
use crate::core::routes::{RouteRealmPatch, route_key};
use crate::core::selection::ModelSelection;
use crate::io::answer_store::AnswerStore;
use crate::io::config::GeneratorConfig;
use crate::io::prompt::PromptEngine;
use crate::io::reporter::ValidationReporter;
use crate::io::workspace::{Project, ProjectLoader, WorkspaceStore, load_metadata};
use crate::prompts::{AclRun, ask_acl};

/// What a successful run changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratorOutcome {
    /// ACL entry created on these models.
    AclApplied(ApplyOutcome),
    /// Route-realm entries merged into the component configuration.
    AuthConfigPatched { path: PathBuf, routes: Vec<String> },
}

/// Run the ACL generator once against the project at `root`.
pub fn run_acl_generator<W, P, R>(
    root: &Path,
    config: &GeneratorConfig,
    workspace: &mut W,
    engine: &mut P,
    reporter: &mut R,
) -> Result<GeneratorOutcome>
where
    W: ProjectLoader + WorkspaceStore + ?Sized,
    P: PromptEngine + ?Sized,
    R: ValidationReporter + ?Sized,
{
    let project = workspace.load_project().context("load project")?;
    debug!(root = %project.root.display(), models = project.models.len(), "project loaded");
    let metadata = load_metadata(&*workspace)?;

    let run = ask_acl(engine, &project, &metadata)?;

    let outcome = match run.descriptor.to_entry() {
        Some(entry) => {
            let applied = apply_acl(workspace, reporter, &run.model.filter(), &entry)?;
            GeneratorOutcome::AclApplied(applied)
        }
        None => generate_auth_config(root, config, &project, &run, engine)?,
    };

    workspace.save().context("save project")?;
    Ok(outcome)
}

fn generate_auth_config<P: PromptEngine + ?Sized>(
    root: &Path,
    config: &GeneratorConfig,
    project: &Project,
    run: &AclRun,
    engine: &mut P,
) -> Result<GeneratorOutcome> {
    info!("generating route auth config");
    let mut answers = AnswerStore::load(&root.join(&config.answers_path))?;
    let settings = ask_auth_settings(engine, &mut answers, &config.auth)?;

    let model_names = match &run.model {
        ModelSelection::Named { name, .. } => vec![name.clone()],
        ModelSelection::All => project.editable_model_names(),
    };
    if model_names.is_empty() {
        warn!("project has no models, no routes to add");
    }

    let patch = RouteRealmPatch {
        model_names,
        property: run.property.clone(),
        method: run.method.clone(),
        realm: settings.realm,
        server_url: settings.server_url,
    };
    let path = root.join(&config.component_config_path);
    patch_component_config(&path, &config.component_name, &patch)?;

    let routes = patch
        .model_names
        .iter()
        .map(|model| route_key(model, patch.property.as_deref()))
        .collect();
    Ok(GeneratorOutcome::AuthConfigPatched { path, routes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::questions::{
        ACCESS_TYPE, AUTH_REALM, AUTH_SERVER, METHOD, MODEL, PERMISSION, ROLE, SCOPE,
    };
    use crate::core::types::GENERATE_AUTH_CONFIG;
    use crate::test_support::{InMemoryStore, RecordingReporter, ScriptedPrompter};
    use serde_json::{Value, json};

    fn acl_answers(model: Value, permission: &str) -> ScriptedPrompter {
        ScriptedPrompter::new()
            .answer(MODEL, model)
            .answer(SCOPE, Value::from("method"))
            .answer(METHOD, Value::from("find"))
            .answer(ROLE, Value::from("$everyone"))
            .answer(PERMISSION, Value::from(permission))
    }

    #[test]
    fn metadata_failure_aborts_before_prompting() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut store = InMemoryStore::with_models(&["Book"]).failing_metadata();
        let mut engine = ScriptedPrompter::new();
        let mut reporter = RecordingReporter::default();

        let err = run_acl_generator(
            temp.path(),
            &GeneratorConfig::default(),
            &mut store,
            &mut engine,
            &mut reporter,
        )
        .expect_err("metadata failure");
        assert!(format!("{err:#}").contains("load access types"));
        assert!(engine.asked().is_empty());
        assert_eq!(store.saves(), 0);
    }

    #[test]
    fn standard_permission_applies_and_saves() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut store = InMemoryStore::with_models(&["Book", "Author"]);
        let mut engine = acl_answers(Value::from("Book"), "ALLOW");
        let mut reporter = RecordingReporter::default();

        let outcome = run_acl_generator(
            temp.path(),
            &GeneratorConfig::default(),
            &mut store,
            &mut engine,
            &mut reporter,
        )
        .expect("run");
        assert_eq!(
            outcome,
            GeneratorOutcome::AclApplied(ApplyOutcome {
                applied: vec!["Book".to_string()],
                failed: Vec::new(),
            })
        );
        assert_eq!(store.saves(), 1);
        assert!(!temp.path().join("server/component-config.json").exists());
    }

    #[test]
    fn failed_apply_does_not_save() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut store = InMemoryStore::with_models(&["Book", "Author"]).failing_on("Book");
        let mut engine = acl_answers(Value::Null, "ALLOW");
        let mut reporter = RecordingReporter::default();

        run_acl_generator(
            temp.path(),
            &GeneratorConfig::default(),
            &mut store,
            &mut engine,
            &mut reporter,
        )
        .expect_err("apply failure");
        assert_eq!(store.attempted(), &["Book", "Author"].map(String::from));
        assert_eq!(reporter.reports.len(), 1);
        assert_eq!(store.saves(), 0);
    }

    #[test]
    fn sentinel_permission_patches_config_for_all_models() {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut store = InMemoryStore::with_models(&["Book", "Author"]);
        let mut engine = ScriptedPrompter::new()
            .answer(MODEL, Value::Null)
            .answer(SCOPE, Value::from("all"))
            .answer(ACCESS_TYPE, Value::from("*"))
            .answer(ROLE, Value::from("$everyone"))
            .answer(PERMISSION, Value::from(GENERATE_AUTH_CONFIG))
            .answer(AUTH_REALM, Value::from("Realm1"))
            .answer(AUTH_SERVER, Value::from("http://mfp"));
        let mut reporter = RecordingReporter::default();

        let outcome = run_acl_generator(
            temp.path(),
            &GeneratorConfig::default(),
            &mut store,
            &mut engine,
            &mut reporter,
        )
        .expect("run");

        let path = temp.path().join("server/component-config.json");
        assert_eq!(
            outcome,
            GeneratorOutcome::AuthConfigPatched {
                path: path.clone(),
                routes: vec!["/api/Book".to_string(), "/api/Author".to_string()],
            }
        );
        assert!(store.created().is_empty());
        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("read")).expect("parse");
        assert_eq!(
            written,
            json!({
                "loopback-mfp": {
                    "publicKeyServerUrl": "http://mfp",
                    "routes": {
                        "/api/Book": { "*": { "authRealm": "Realm1" } },
                        "/api/Author": { "*": { "authRealm": "Realm1" } }
                    }
                }
            })
        );
        assert!(temp.path().join(".acl-gen/answers.json").exists());
    }
}
