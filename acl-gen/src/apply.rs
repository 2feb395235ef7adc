//! ACL applier: create the entry on every model in the resolved target set.

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::core::types::{AclEntry, ModelFilter};
use crate::io::reporter::ValidationReporter;
use crate::io::workspace::WorkspaceStore;

/// Per-model results of an apply pass, in target order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ApplyOutcome {
    pub applied: Vec<String>,
    pub failed: Vec<String>,
}

/// Summary context on the error returned when any model rejected the entry.
///
/// The underlying cause was already handed to the reporter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("ACL entry rejected by {failed} of {total} models")]
pub struct AclRejected {
    pub failed: usize,
    pub total: usize,
}

/// Resolve the target models and create `entry` on each, one at a time.
///
/// Every model is attempted even after a failure. Only the first failure is
/// handed to `reporter`; it is also the error returned once all models were
/// attempted. A failing model lookup aborts before any creation.
#[instrument(skip_all, fields(filter = ?filter))]
pub fn apply_acl<S, R>(
    store: &mut S,
    reporter: &mut R,
    filter: &ModelFilter,
    entry: &AclEntry,
) -> Result<ApplyOutcome>
where
    S: WorkspaceStore + ?Sized,
    R: ValidationReporter + ?Sized,
{
    let models = store.find_models(filter).context("find target models")?;
    debug!(count = models.len(), "target models resolved");

    let mut outcome = ApplyOutcome::default();
    let mut first_error = None;
    for model in &models {
        match store.create_access_control(model, entry) {
            Ok(()) => outcome.applied.push(model.name.clone()),
            Err(err) => {
                outcome.failed.push(model.name.clone());
                if first_error.is_none() {
                    reporter.report(&err);
                    first_error = Some(err);
                } else {
                    warn!(model = %model.name, error = %err, "ACL entry rejected");
                }
            }
        }
    }

    if let Some(err) = first_error {
        return Err(err.context(AclRejected {
            failed: outcome.failed.len(),
            total: models.len(),
        }));
    }
    info!(applied = outcome.applied.len(), "ACL entry applied");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PrincipalType;
    use crate::test_support::{InMemoryStore, RecordingReporter};

    fn entry() -> AclEntry {
        AclEntry {
            property: None,
            access_type: Some("*".to_string()),
            principal_type: PrincipalType::Role,
            principal_id: "$everyone".to_string(),
            permission: "ALLOW".to_string(),
        }
    }

    #[test]
    fn applies_to_named_model_only() {
        let mut store = InMemoryStore::with_models(&["Book", "Author", "Review"]);
        let mut reporter = RecordingReporter::default();
        let outcome = apply_acl(
            &mut store,
            &mut reporter,
            &ModelFilter::ByName("Author".to_string()),
            &entry(),
        )
        .expect("apply");
        assert_eq!(outcome.applied, vec!["Author"]);
        assert_eq!(store.created(), &[("Author".to_string(), entry())]);
        assert!(reporter.reports.is_empty());
    }

    #[test]
    fn applies_to_all_models_in_order() {
        let mut store = InMemoryStore::with_models(&["Zeta", "Alpha", "Mid"]);
        let mut reporter = RecordingReporter::default();
        let outcome =
            apply_acl(&mut store, &mut reporter, &ModelFilter::All, &entry()).expect("apply");
        assert_eq!(outcome.applied, vec!["Zeta", "Alpha", "Mid"]);
        assert_eq!(store.find_calls(), &[ModelFilter::All]);
    }

    #[test]
    fn second_model_failure_is_reported_once_and_rest_are_attempted() {
        let mut store =
            InMemoryStore::with_models(&["M1", "M2", "M3", "M4", "M5"]).failing_on("M2");
        let mut reporter = RecordingReporter::default();

        let err = apply_acl(&mut store, &mut reporter, &ModelFilter::All, &entry())
            .expect_err("failure");

        assert_eq!(reporter.reports.len(), 1);
        assert!(reporter.reports[0].contains("M2"));
        assert_eq!(
            store.attempted(),
            &["M1", "M2", "M3", "M4", "M5"].map(String::from)
        );
        assert!(format!("{err:#}").contains("M2"));
    }

    #[test]
    fn only_first_of_several_failures_is_reported() {
        let mut store = InMemoryStore::with_models(&["A", "B", "C"])
            .failing_on("B")
            .failing_on("C");
        let mut reporter = RecordingReporter::default();
        let err = apply_acl(&mut store, &mut reporter, &ModelFilter::All, &entry())
            .expect_err("failure");
        assert_eq!(reporter.reports.len(), 1);
        assert!(reporter.reports[0].contains("`B`"));
        assert!(err.to_string().contains("2 of 3 models"));
        assert_eq!(
            err.downcast_ref::<AclRejected>(),
            Some(&AclRejected {
                failed: 2,
                total: 3
            })
        );
    }

    #[test]
    fn lookup_failure_aborts_before_creation() {
        let mut store = InMemoryStore::with_models(&["A"]).failing_find();
        let mut reporter = RecordingReporter::default();
        let err = apply_acl(&mut store, &mut reporter, &ModelFilter::All, &entry())
            .expect_err("find failure");
        assert!(format!("{err:#}").contains("find target models"));
        assert!(store.attempted().is_empty());
        assert!(reporter.reports.is_empty());
    }
}
