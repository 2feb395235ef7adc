//! Route-realm patch logic for the component configuration document.
//!
//! The document is keyed by component name. The component section holds
//! `publicKeyServerUrl` (first write wins) and `routes`, a map from route path
//! to a map from method name to `{ "authRealm": <realm> }`.
//!
//! Existing routes are merged structurally: objects merge key by key, any other
//! value is replaced by the incoming one. Applying the same patch twice leaves
//! the document unchanged the second time.

use serde_json::{Map, Value};

pub const PUBLIC_KEY_SERVER_URL: &str = "publicKeyServerUrl";
pub const ROUTES: &str = "routes";
pub const AUTH_REALM: &str = "authRealm";

/// Method key used when the ACL scope covered every method.
pub const ANY_METHOD: &str = "*";

/// Route-realm settings collected from the prompts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRealmPatch {
    pub model_names: Vec<String>,
    pub property: Option<String>,
    pub method: Option<String>,
    pub realm: String,
    pub server_url: String,
}

/// Problems tolerated while patching, surfaced as warnings by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PatchNotes {
    pub created_section: bool,
    pub replaced_routes: bool,
    pub kept_server_url: Option<String>,
}

/// `/api/<model>[/<property>]`.
pub fn route_key(model_name: &str, property: Option<&str>) -> String {
    match property {
        Some(property) => format!("/api/{model_name}/{property}"),
        None => format!("/api/{model_name}"),
    }
}

/// Build `{ route: { method: { authRealm } } }` for every target model.
pub fn build_routes(patch: &RouteRealmPatch) -> Map<String, Value> {
    let method = patch.method.as_deref().unwrap_or(ANY_METHOD);
    let mut routes = Map::new();
    for model in &patch.model_names {
        let mut realm = Map::new();
        realm.insert(AUTH_REALM.to_string(), Value::from(patch.realm.as_str()));
        let mut methods = Map::new();
        methods.insert(method.to_string(), Value::Object(realm));
        routes.insert(
            route_key(model, patch.property.as_deref()),
            Value::Object(methods),
        );
    }
    routes
}

/// Structural deep merge of `incoming` into `target`.
///
/// Objects merge recursively; on conflict the incoming leaf wins.
pub fn deep_merge(target: &mut Value, incoming: &Value) {
    match (target, incoming) {
        (Value::Object(target), Value::Object(incoming)) => {
            for (key, value) in incoming {
                match target.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, incoming) => *target = incoming.clone(),
    }
}

/// Apply the route-realm patch to the whole document in place.
///
/// A non-object document or component section is replaced by an empty object.
pub fn apply_route_patch(
    document: &mut Value,
    component: &str,
    patch: &RouteRealmPatch,
) -> PatchNotes {
    let mut notes = PatchNotes::default();

    if !document.is_object() {
        *document = Value::Object(Map::new());
    }
    let Value::Object(root) = document else {
        unreachable!("document was just normalized to an object");
    };

    let section = root
        .entry(component.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !section.is_object() {
        *section = Value::Object(Map::new());
        notes.created_section = true;
    } else if section.as_object().is_some_and(Map::is_empty) {
        notes.created_section = true;
    }
    let Value::Object(section) = section else {
        unreachable!("section was just normalized to an object");
    };

    match section.get(PUBLIC_KEY_SERVER_URL) {
        Some(existing) if is_set(existing) => {
            if existing.as_str() != Some(patch.server_url.as_str()) {
                notes.kept_server_url = Some(display_value(existing));
            }
        }
        _ => {
            section.insert(
                PUBLIC_KEY_SERVER_URL.to_string(),
                Value::from(patch.server_url.as_str()),
            );
        }
    }

    let routes = Value::Object(build_routes(patch));
    match section.get_mut(ROUTES) {
        Some(existing) if existing.is_object() => deep_merge(existing, &routes),
        Some(existing) => {
            notes.replaced_routes = true;
            *existing = routes;
        }
        None => {
            section.insert(ROUTES.to_string(), routes);
        }
    }

    notes
}

/// Any value other than null, `false`, `0` or `""` counts as already set.
fn is_set(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64() != Some(0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
