//! Stable exit codes for the `acl-gen` CLI.

use crate::core::validation::ValidationError;

/// Run completed and all changes were saved.
pub const OK: i32 = 0;
/// Run aborted: not a project, metadata or model lookup failure, I/O error,
/// or the prompt input ended early.
pub const FAILED: i32 = 1;
/// At least one model rejected the ACL entry; nothing was saved.
pub const INVALID_ACL: i32 = 2;

/// Exit code for a failed run.
pub fn for_error(err: &anyhow::Error) -> i32 {
    if err.chain().any(|cause| cause.is::<ValidationError>()) {
        INVALID_ACL
    } else {
        FAILED
    }
}
