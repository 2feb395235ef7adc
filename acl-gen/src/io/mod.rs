//! I/O adapters for the generator's external collaborators.

pub mod answer_store;
pub mod component_config;
pub mod config;
pub mod prompt;
pub mod reporter;
pub mod workspace;
