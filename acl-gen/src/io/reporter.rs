//! User-facing rendering of ACL creation failures.

use std::io::{self, Stderr, Write};

use tracing::warn;

use crate::core::validation::ValidationError;

/// Renders a creation failure to the user.
pub trait ValidationReporter {
    fn report(&mut self, err: &anyhow::Error);
}

/// Reporter writing human-readable text, stderr by default.
pub struct ConsoleReporter<W> {
    out: W,
}

impl ConsoleReporter<Stderr> {
    pub fn stderr() -> Self {
        Self { out: io::stderr() }
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ValidationReporter for ConsoleReporter<W> {
    fn report(&mut self, err: &anyhow::Error) {
        let text = render_error(err);
        if let Err(write_err) = self.out.write_all(text.as_bytes()) {
            warn!(error = %write_err, "failed to write validation report");
        }
    }
}

/// Structured text for a [`ValidationError`] anywhere in the chain, else the
/// plain error chain.
pub fn render_error(err: &anyhow::Error) -> String {
    let validation = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<ValidationError>());
    match validation {
        Some(validation) => {
            let mut text = format!(
                "The ACL entry for model `{}` is not valid.\nDetails:\n",
                validation.model
            );
            for problem in &validation.problems {
                text.push_str(&format!("  - {problem}\n"));
            }
            text
        }
        None => format!("Error: {err:#}\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validation::FieldProblem;
    use anyhow::{Context, anyhow};

    #[test]
    fn renders_validation_problems() {
        let err = Err::<(), _>(ValidationError {
            model: "Book".to_string(),
            problems: vec![FieldProblem {
                field: "permission",
                message: "is not one of ALLOW, DENY (got 'MAYBE')".to_string(),
            }],
        })
        .context("create ACL on Book")
        .expect_err("error");

        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.report(&err);
        let text = String::from_utf8(reporter.into_inner()).expect("utf8");
        assert_eq!(
            text,
            "The ACL entry for model `Book` is not valid.\nDetails:\n  - `permission` is not one of ALLOW, DENY (got 'MAYBE')\n"
        );
    }

    #[test]
    fn renders_other_errors_as_chain() {
        let err = anyhow!("disk full").context("save Book");
        assert_eq!(render_error(&err), "Error: save Book: disk full\n");
    }
}
