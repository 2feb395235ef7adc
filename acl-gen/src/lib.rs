//! Interactive ACL generator for LoopBack application models.
//!
//! One run asks which model (or all models) an access-control entry applies
//! to, collects the entry's scope, access type, role and permission, and then
//! either appends the entry to the model definitions or, for the auth-config
//! sentinel permission, merges a route-realm mapping into the project's
//! component configuration.
//!
//! - **[`core`]**: Pure, deterministic logic (questions, descriptor derivation,
//!   model selection, validation, route merging). No I/O.
//! - **[`io`]**: Adapters for the prompt engine, the model store, the reporter
//!   and the JSON documents on disk. Each sits behind a trait or a small
//!   function so tests can substitute fakes.
//!
//! Orchestration modules ([`prompts`], [`apply`], [`auth_config`],
//! [`generator`]) coordinate core logic with I/O to implement the CLI command.

pub mod apply;
pub mod auth_config;
pub mod core;
pub mod exit_codes;
pub mod generator;
pub mod io;
pub mod logging;
pub mod prompts;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
