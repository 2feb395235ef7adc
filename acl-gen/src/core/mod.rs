//! Deterministic, pure logic shared by the ACL generator.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! answers, descriptors and JSON documents and return deterministic outputs.

pub mod descriptor;
pub mod questions;
pub mod routes;
pub mod selection;
pub mod types;
pub mod validation;
