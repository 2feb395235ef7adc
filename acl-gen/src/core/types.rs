//! Shared deterministic types for the ACL generator core.
//!
//! These types define stable contracts between the prompt flow, the applier and
//! the auth-config patcher. They carry no I/O and serialize deterministically.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Permission value that redirects the run into the auth-config patch path.
pub const GENERATE_AUTH_CONFIG: &str = "generate-auth-config";

/// Access type forced for method-scoped entries.
pub const EXECUTE: &str = "EXECUTE";

/// One selectable value of a list question or a metadata enumeration.
///
/// `value: None` is a legal choice (e.g. "all existing models").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub name: String,
    pub value: Option<String>,
}

impl Choice {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    /// Choice whose display name is also its value.
    pub fn plain(value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: value.clone(),
            value: Some(value),
        }
    }

    pub fn null(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }
}

/// ACL scope selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Method,
    Property,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::Method => "method",
            Scope::Property => "property",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "all" => Some(Scope::All),
            "method" => Some(Scope::Method),
            "property" => Some(Scope::Property),
            _ => None,
        }
    }
}

/// Principal kinds supported by the generator. Only roles for now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrincipalType {
    Role,
}

/// Permission answer: either a real ACL permission or the auth-config sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Permission {
    Standard(String),
    GenerateAuthConfig,
}

impl Permission {
    pub fn parse(raw: &str) -> Self {
        if raw == GENERATE_AUTH_CONFIG {
            Permission::GenerateAuthConfig
        } else {
            Permission::Standard(raw.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Permission::Standard(value) => value,
            Permission::GenerateAuthConfig => GENERATE_AUTH_CONFIG,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access-control descriptor accumulated from the prompt answers.
///
/// Built once per run and consumed by exactly one of the two appliers,
/// depending on `permission`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclDescriptor {
    pub property: Option<String>,
    pub access_type: Option<String>,
    pub principal_type: PrincipalType,
    pub principal_id: String,
    pub permission: Permission,
}

impl AclDescriptor {
    /// Persistable ACL entry, or `None` when the permission is the sentinel.
    pub fn to_entry(&self) -> Option<AclEntry> {
        match &self.permission {
            Permission::GenerateAuthConfig => None,
            Permission::Standard(permission) => Some(AclEntry {
                property: self.property.clone(),
                access_type: self.access_type.clone(),
                principal_type: self.principal_type,
                principal_id: self.principal_id.clone(),
                permission: permission.clone(),
            }),
        }
    }
}

/// ACL entry as stored in a model definition's `acls` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AclEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type: Option<String>,
    pub principal_type: PrincipalType,
    pub principal_id: String,
    pub permission: String,
}

/// Model definition as seen by the generator.
///
/// `acls` holds the existing entries verbatim; the generator only appends.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDefinition {
    pub name: String,
    pub acls: Vec<Value>,
}

/// Model lookup filter understood by the workspace store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelFilter {
    /// Every model; stores must fetch fresh state.
    All,
    /// `{where: {name}, limit: 1}`.
    ByName(String),
}
