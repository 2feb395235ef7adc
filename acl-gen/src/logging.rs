//! Diagnostics for `acl-gen`.
//!
//! The generator writes to three places:
//!
//! - stdout: prompts and the one-line run summary (`acl: added entry ...`).
//! - stderr, always: the first rejected ACL entry (via the console reporter)
//!   and the final error message.
//! - stderr, filtered by `RUST_LOG`: the tracing events set up here, such as
//!   skipped duplicate model files, kept server URLs and replaced routes.
//!
//! Stored answers and patched JSON documents are never routed through tracing.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset. Tolerated problems in the project
/// files are logged at `warn`, so they stay visible by default.
const DEFAULT_FILTER: &str = "warn";

/// Install the stderr subscriber.
///
/// ```bash
/// RUST_LOG=acl_gen=debug acl-gen acl
/// ```
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .init();
}
