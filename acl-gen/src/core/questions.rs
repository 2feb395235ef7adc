//! Question groups for the ACL prompt flow.
//!
//! Each group is an ordered list of [`Question`]s. Dependent questions carry a
//! pure visibility predicate over the answers collected earlier in the same
//! group; the prompt engine omits a question whose predicate is false.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::core::types::{Choice, GENERATE_AUTH_CONFIG, Scope};

pub const MODEL: &str = "model";
pub const SCOPE: &str = "scope";
pub const METHOD: &str = "method";
pub const PROPERTY: &str = "property";
pub const ACCESS_TYPE: &str = "accessType";
pub const ROLE: &str = "role";
pub const CUSTOM_ROLE: &str = "customRole";
pub const PERMISSION: &str = "permission";
pub const AUTH_REALM: &str = "authRealm";
pub const AUTH_SERVER: &str = "authServer";

/// List value that switches the role question to free text.
pub const OTHER_ROLE: &str = "other";

/// Answer map returned by the prompt engine, keyed by question name.
///
/// A `Value::Null` answer is a real answer (the "all models" choice); a missing
/// key means the question was not shown.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Answers(BTreeMap<String, Value>);

impl Answers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// String answer, or `None` when absent or null.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

}

impl FromIterator<(String, Value)> for Answers {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Pure predicate over answers collected so far.
pub type Predicate = fn(&Answers) -> bool;

/// Free-text check; `Err` carries the message shown before re-asking.
pub type Validator = fn(&str) -> Result<(), String>;

static FORBIDDEN_NAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/@\s+%:]").expect("valid name regex"));

/// Method, property and role names end up in model files and route paths.
pub fn validate_name(name: &str) -> Result<(), String> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Name cannot be empty".to_string());
    }
    if FORBIDDEN_NAME_CHARS.is_match(name) {
        return Err(format!("Name cannot contain special characters (/@+%: ): {name}"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    List(Vec<Choice>),
    Input,
}

#[derive(Debug, Clone)]
pub struct Question {
    pub name: &'static str,
    pub message: String,
    pub kind: QuestionKind,
    pub default: Option<Value>,
    /// Question names the predicate reads. Must all precede this question.
    pub depends_on: &'static [&'static str],
    pub when: Option<Predicate>,
    pub validate: Option<Validator>,
    /// Persist the answer and reuse it as the default on later runs.
    pub store: bool,
}

impl Question {
    pub fn list(name: &'static str, message: impl Into<String>, choices: Vec<Choice>) -> Self {
        Self {
            name,
            message: message.into(),
            kind: QuestionKind::List(choices),
            default: None,
            depends_on: &[],
            when: None,
            validate: None,
            store: false,
        }
    }

    pub fn input(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            message: message.into(),
            kind: QuestionKind::Input,
            default: None,
            depends_on: &[],
            when: None,
            validate: None,
            store: false,
        }
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn when(mut self, depends_on: &'static [&'static str], predicate: Predicate) -> Self {
        self.depends_on = depends_on;
        self.when = Some(predicate);
        self
    }

    pub fn validated(mut self, validator: Validator) -> Self {
        self.validate = Some(validator);
        self
    }

    pub fn stored(mut self) -> Self {
        self.store = true;
        self
    }

    pub fn is_visible(&self, answers: &Answers) -> bool {
        self.when.is_none_or(|predicate| predicate(answers))
    }
}

pub fn scope_is_method(answers: &Answers) -> bool {
    answers.get_str(SCOPE) == Some(Scope::Method.as_str())
}

pub fn scope_is_property(answers: &Answers) -> bool {
    answers.get_str(SCOPE) == Some(Scope::Property.as_str())
}

pub fn scope_is_all(answers: &Answers) -> bool {
    answers.get_str(SCOPE) == Some(Scope::All.as_str())
}

pub fn role_is_other(answers: &Answers) -> bool {
    answers.get_str(ROLE) == Some(OTHER_ROLE)
}

/// Model selection group: "(all existing models)" first, then editable names.
pub fn model_questions(editable_model_names: &[String]) -> Vec<Question> {
    let mut choices = vec![Choice::null("(all existing models)")];
    choices.extend(editable_model_names.iter().map(Choice::plain));
    vec![
        Question::list(
            MODEL,
            "Select the model to apply the ACL entry to:",
            choices,
        )
        .with_default(Value::Null),
    ]
}

/// Metadata enumerations supplied by the workspace store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclMetadata {
    pub access_types: Vec<Choice>,
    pub roles: Vec<Choice>,
    pub permissions: Vec<Choice>,
}

/// Parameter group: scope, method/property, access type, role, permission.
pub fn parameter_questions(metadata: &AclMetadata) -> Vec<Question> {
    let scopes = vec![
        Choice::new("All methods and properties", Scope::All.as_str()),
        Choice::new("A single method", Scope::Method.as_str()),
    ];

    let mut roles = metadata.roles.clone();
    roles.push(Choice::new("other", OTHER_ROLE));

    let mut permissions = metadata.permissions.clone();
    permissions.push(Choice::new("Generate MFP route auth config", GENERATE_AUTH_CONFIG));

    vec![
        Question::list(SCOPE, "Select the ACL scope:", scopes)
            .with_default(Value::from(Scope::All.as_str())),
        Question::input(METHOD, "Enter the method name")
            .when(&[SCOPE], scope_is_method)
            .validated(validate_name),
        Question::input(PROPERTY, "Enter the property name")
            .when(&[SCOPE], scope_is_property)
            .validated(validate_name),
        Question::list(
            ACCESS_TYPE,
            "Select the access type:",
            metadata.access_types.clone(),
        )
        .with_default(Value::from("*"))
        .when(&[SCOPE], scope_is_all),
        Question::list(ROLE, "Select the role", roles).with_default(Value::from("$everyone")),
        Question::input(CUSTOM_ROLE, "Enter the role name:")
            .when(&[ROLE], role_is_other)
            .validated(validate_name),
        Question::list(PERMISSION, "Select the permission to apply", permissions),
    ]
}

/// Auth-config group, asked only on the sentinel branch.
pub fn auth_questions(default_realm: &str, default_server_url: &str) -> Vec<Question> {
    vec![
        Question::input(AUTH_REALM, "Please enter the MFP scope:")
            .with_default(Value::from(default_realm))
            .stored(),
        Question::input(AUTH_SERVER, "Please enter the MFP server url:")
            .with_default(Value::from(default_server_url))
            .stored(),
    ]
}

/// Check that every predicate only depends on earlier questions.
pub fn check_dependency_order(questions: &[Question]) -> Result<(), String> {
    for (idx, question) in questions.iter().enumerate() {
        for dep in question.depends_on {
            if !questions[..idx].iter().any(|earlier| earlier.name == *dep) {
                return Err(format!(
                    "question '{}' depends on '{}' which is not asked before it",
                    question.name, dep
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata() -> AclMetadata {
        AclMetadata {
            access_types: vec![Choice::plain("*"), Choice::plain("READ")],
            roles: vec![Choice::plain("$everyone")],
            permissions: vec![Choice::plain("ALLOW"), Choice::plain("DENY")],
        }
    }

    fn answers(pairs: &[(&str, &str)]) -> Answers {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn model_group_prepends_all_models_choice() {
        let questions = model_questions(&["Book".to_string(), "Author".to_string()]);
        let QuestionKind::List(choices) = &questions[0].kind else {
            panic!("model question must be a list");
        };
        assert_eq!(choices[0], Choice::null("(all existing models)"));
        let values: Vec<_> = choices.iter().map(|c| c.value.clone()).collect();
        assert_eq!(
            values,
            vec![None, Some("Book".to_string()), Some("Author".to_string())]
        );
    }

    #[test]
    fn parameter_group_appends_other_role_and_sentinel_permission() {
        let questions = parameter_questions(&metadata());
        let role = questions.iter().find(|q| q.name == ROLE).expect("role");
        let QuestionKind::List(roles) = &role.kind else {
            panic!("role must be a list");
        };
        let last_role = roles.last().and_then(|c| c.value.as_deref());
        assert_eq!(last_role, Some(OTHER_ROLE));

        let permission = questions
            .iter()
            .find(|q| q.name == PERMISSION)
            .expect("perm");
        let QuestionKind::List(perms) = &permission.kind else {
            panic!("permission must be a list");
        };
        assert_eq!(
            perms.last().and_then(|c| c.value.as_deref()),
            Some(GENERATE_AUTH_CONFIG)
        );
    }

    #[test]
    fn visibility_follows_earlier_answers() {
        let questions = parameter_questions(&metadata());
        let by_name = |name: &str| {
            questions
                .iter()
                .find(|q| q.name == name)
                .expect("known question")
        };

        let method_scope = answers(&[(SCOPE, "method"), (ROLE, "$everyone")]);
        assert!(by_name(METHOD).is_visible(&method_scope));
        assert!(!by_name(ACCESS_TYPE).is_visible(&method_scope));
        assert!(!by_name(PROPERTY).is_visible(&method_scope));
        assert!(!by_name(CUSTOM_ROLE).is_visible(&method_scope));

        let all_scope = answers(&[(SCOPE, "all"), (ROLE, "other")]);
        assert!(!by_name(METHOD).is_visible(&all_scope));
        assert!(by_name(ACCESS_TYPE).is_visible(&all_scope));
        assert!(by_name(CUSTOM_ROLE).is_visible(&all_scope));
    }

    #[test]
    fn groups_declare_dependencies_in_order() {
        check_dependency_order(&parameter_questions(&metadata())).expect("parameter order");
        check_dependency_order(&auth_questions("Realm", "http://x")).expect("auth order");

        let mut reversed = parameter_questions(&metadata());
        reversed.reverse();
        assert!(check_dependency_order(&reversed).is_err());
    }

    #[test]
    fn names_reject_special_characters() {
        assert!(validate_name("findById").is_ok());
        assert!(validate_name("$owner").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("find one").is_err());
        assert!(validate_name("a/b").is_err());
        assert!(validate_name("x:y").is_err());
        assert!(validate_name("user@host").is_err());
        assert!(validate_name("a+b").is_err());
        assert!(validate_name("100%").is_err());
    }

    #[test]
    fn auth_questions_are_stored() {
        let questions = auth_questions("SampleAppRealm", "http://localhost");
        assert!(questions.iter().all(|q| q.store));
        assert_eq!(questions[0].default, Some(Value::from("SampleAppRealm")));
    }
}
