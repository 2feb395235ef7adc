//! ACL entry validation against workspace metadata.

use std::fmt;

use thiserror::Error;

use crate::core::questions::AclMetadata;
use crate::core::types::{AclEntry, Choice};

/// One field-level problem with an ACL entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProblem {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` {}", self.field, self.message)
    }
}

/// Structured validation failure for an ACL entry on one model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("the ACL entry for model `{model}` is not valid: {}", join_problems(.problems))]
pub struct ValidationError {
    pub model: String,
    pub problems: Vec<FieldProblem>,
}

fn join_problems(problems: &[FieldProblem]) -> String {
    problems
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validate `entry` for `model`. Returns every problem found, not just the first.
pub fn validate_entry(
    model: &str,
    entry: &AclEntry,
    metadata: &AclMetadata,
) -> Result<(), ValidationError> {
    let mut problems = Vec::new();

    if let Some(access_type) = entry
        .access_type
        .as_deref()
        .filter(|value| !contains_value(&metadata.access_types, value))
    {
        problems.push(FieldProblem {
            field: "accessType",
            message: format!(
                "is not one of {} (got '{access_type}')",
                list_values(&metadata.access_types)
            ),
        });
    }

    if entry.principal_id.trim().is_empty() {
        problems.push(FieldProblem {
            field: "principalId",
            message: "can't be blank".to_string(),
        });
    }

    if !contains_value(&metadata.permissions, &entry.permission) {
        problems.push(FieldProblem {
            field: "permission",
            message: format!(
                "is not one of {} (got '{}')",
                list_values(&metadata.permissions),
                entry.permission
            ),
        });
    }

    if entry
        .property
        .as_deref()
        .is_some_and(|property| property.trim().is_empty())
    {
        problems.push(FieldProblem {
            field: "property",
            message: "can't be blank".to_string(),
        });
    }

    if problems.is_empty() {
        return Ok(());
    }
    Err(ValidationError {
        model: model.to_string(),
        problems,
    })
}

fn contains_value(choices: &[Choice], value: &str) -> bool {
    choices.iter().any(|c| c.value.as_deref() == Some(value))
}

fn list_values(choices: &[Choice]) -> String {
    choices
        .iter()
        .filter_map(|c| c.value.as_deref())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PrincipalType;

    fn metadata() -> AclMetadata {
        AclMetadata {
            access_types: vec![Choice::plain("*"), Choice::plain("EXECUTE")],
            roles: vec![Choice::plain("$everyone")],
            permissions: vec![Choice::plain("ALLOW"), Choice::plain("DENY")],
        }
    }

    fn entry(access_type: Option<&str>, principal_id: &str, permission: &str) -> AclEntry {
        AclEntry {
            property: None,
            access_type: access_type.map(str::to_string),
            principal_type: PrincipalType::Role,
            principal_id: principal_id.to_string(),
            permission: permission.to_string(),
        }
    }

    #[test]
    fn valid_entry_passes() {
        validate_entry("Book", &entry(Some("*"), "$everyone", "ALLOW"), &metadata())
            .expect("valid");
        validate_entry("Book", &entry(None, "admin", "DENY"), &metadata()).expect("valid");
    }

    #[test]
    fn collects_every_problem() {
        let err = validate_entry("Book", &entry(Some("PATCH"), " ", "MAYBE"), &metadata())
            .expect_err("invalid");
        assert_eq!(err.model, "Book");
        let fields: Vec<_> = err.problems.iter().map(|p| p.field).collect();
        assert_eq!(fields, vec!["accessType", "principalId", "permission"]);
        assert!(err.to_string().contains("model `Book`"));
    }
}
