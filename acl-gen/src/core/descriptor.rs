//! Derive the access-control descriptor from the parameter answers.

use anyhow::{Result, anyhow};

use crate::core::questions::{
    ACCESS_TYPE, Answers, CUSTOM_ROLE, METHOD, OTHER_ROLE, PERMISSION, PROPERTY, ROLE, SCOPE,
};
use crate::core::types::{AclDescriptor, EXECUTE, Permission, PrincipalType, Scope};

/// Descriptor plus the raw method/property selections the auth-config path needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSelection {
    pub scope: Scope,
    pub method: Option<String>,
    pub property: Option<String>,
    pub descriptor: AclDescriptor,
}

/// Build the descriptor from the parameter group answers.
///
/// - `scope = method` forces `accessType = EXECUTE`.
/// - `role = other` takes the custom role text as `principalId`.
/// - the ACL `property` is the property answer, falling back to the method name.
pub fn build_descriptor(answers: &Answers) -> Result<ParameterSelection> {
    let scope_raw = answers
        .get_str(SCOPE)
        .ok_or_else(|| anyhow!("missing answer for '{SCOPE}'"))?;
    let scope = Scope::parse(scope_raw).ok_or_else(|| anyhow!("unknown scope '{scope_raw}'"))?;

    let method = non_empty(answers.get_str(METHOD));
    let property = non_empty(answers.get_str(PROPERTY));

    let access_type = match scope {
        Scope::Method => Some(EXECUTE.to_string()),
        _ => non_empty(answers.get_str(ACCESS_TYPE)),
    };

    let role = answers
        .get_str(ROLE)
        .ok_or_else(|| anyhow!("missing answer for '{ROLE}'"))?;
    let principal_id = if role == OTHER_ROLE {
        non_empty(answers.get_str(CUSTOM_ROLE))
            .ok_or_else(|| anyhow!("role 'other' requires a custom role name"))?
    } else {
        role.to_string()
    };

    let permission = answers
        .get_str(PERMISSION)
        .map(Permission::parse)
        .ok_or_else(|| anyhow!("missing answer for '{PERMISSION}'"))?;

    let descriptor = AclDescriptor {
        property: property.clone().or_else(|| method.clone()),
        access_type,
        principal_type: PrincipalType::Role,
        principal_id,
        permission,
    };

    Ok(ParameterSelection {
        scope,
        method,
        property,
        descriptor,
    })
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
