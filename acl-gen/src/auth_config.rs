//! Route-realm patcher for the sentinel permission.
//!
//! Asks for the auth realm and public key server URL (answers are stored for
//! later runs), then merges the route map into the component configuration
//! document and rewrites it.

use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::core::questions::{AUTH_REALM, AUTH_SERVER, auth_questions};
use crate::core::routes::{RouteRealmPatch, apply_route_patch};
use crate::io::answer_store::AnswerStore;
use crate::io::component_config::{read_component_config, write_component_config};
use crate::io::config::AuthDefaults;
use crate::io::prompt::PromptEngine;

/// Realm and server URL chosen for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSettings {
    pub realm: String,
    pub server_url: String,
}

/// Ask for realm and server URL; stored answers override configured defaults.
pub fn ask_auth_settings<P: PromptEngine + ?Sized>(
    engine: &mut P,
    store: &mut AnswerStore,
    defaults: &AuthDefaults,
) -> Result<AuthSettings> {
    let mut questions = auth_questions(&defaults.realm, &defaults.server_url);
    store.apply_defaults(&mut questions);
    let answers = engine.prompt(&questions).context("ask for auth settings")?;
    store.record(&questions, &answers)?;

    let realm = answers
        .get_str(AUTH_REALM)
        .ok_or_else(|| anyhow!("missing answer for '{AUTH_REALM}'"))?;
    let server_url = answers
        .get_str(AUTH_SERVER)
        .ok_or_else(|| anyhow!("missing answer for '{AUTH_SERVER}'"))?;
    Ok(AuthSettings {
        realm: realm.to_string(),
        server_url: server_url.to_string(),
    })
}

/// Read, patch and rewrite the component configuration document.
///
/// Returns the document as written.
#[instrument(skip_all, fields(path = %path.display(), component = %component))]
pub fn patch_component_config(
    path: &Path,
    component: &str,
    patch: &RouteRealmPatch,
) -> Result<Value> {
    let mut document = read_component_config(path);
    let notes = apply_route_patch(&mut document, component, patch);
    if notes.created_section {
        debug!("component section was missing, created it");
    }
    if let Some(kept) = &notes.kept_server_url {
        info!(kept = %kept, ignored = %patch.server_url, "publicKeyServerUrl already set, keeping it");
    }
    if notes.replaced_routes {
        warn!("existing routes value was not an object and has been replaced");
    }
    write_component_config(path, &document)?;
    info!(routes = patch.model_names.len(), "component config patched");
    Ok(document)
}
