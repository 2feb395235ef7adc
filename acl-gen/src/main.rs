//! Interactive ACL generator for LoopBack projects.
//!
//! All input is collected through prompts on stdin; the only option relocates
//! the project root.

use std::path::PathBuf;

use acl_gen::apply::AclRejected;
use acl_gen::exit_codes;
use acl_gen::generator::{GeneratorOutcome, run_acl_generator};
use acl_gen::io::config::load_project_config;
use acl_gen::io::prompt::TerminalPrompter;
use acl_gen::io::reporter::ConsoleReporter;
use acl_gen::io::workspace::ProjectWorkspace;
use acl_gen::logging;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "acl-gen",
    version,
    about = "Interactive ACL generator for LoopBack models"
)]
struct Cli {
    /// Project root (defaults to the current directory).
    #[arg(long, global = true, value_name = "PATH")]
    project_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add an access-control entry to one model or to every model.
    Acl,
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    let code = match run(cli) {
        Ok(()) => exit_codes::OK,
        Err(err) => {
            eprintln!("{}", error_message(&err));
            exit_codes::for_error(&err)
        }
    };
    std::process::exit(code);
}

/// Full cause chain, except for rejected ACL entries whose cause the reporter
/// already printed.
fn error_message(err: &anyhow::Error) -> String {
    if err.downcast_ref::<AclRejected>().is_some() {
        err.to_string()
    } else {
        format!("{err:#}")
    }
}

fn run(cli: Cli) -> Result<()> {
    let root = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("resolve current directory")?,
    };
    match cli.command {
        Command::Acl => cmd_acl(root),
    }
}

fn cmd_acl(root: PathBuf) -> Result<()> {
    let config = load_project_config(&root)?;
    let mut workspace = ProjectWorkspace::new(&root, &config.model_dirs);
    let mut engine = TerminalPrompter::stdio();
    let mut reporter = ConsoleReporter::stderr();

    let outcome = run_acl_generator(&root, &config, &mut workspace, &mut engine, &mut reporter)?;
    match outcome {
        GeneratorOutcome::AclApplied(applied) => {
            println!(
                "acl: added entry to {} model(s): {}",
                applied.applied.len(),
                applied.applied.join(", ")
            );
        }
        GeneratorOutcome::AuthConfigPatched { path, routes } => {
            println!(
                "acl: updated {} routes={}",
                path.display(),
                routes.join(",")
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_acl() {
        let cli = Cli::parse_from(["acl-gen", "acl"]);
        assert!(matches!(cli.command, Command::Acl));
        assert!(cli.project_dir.is_none());
    }

    #[test]
    fn parse_project_dir_after_subcommand() {
        let cli = Cli::parse_from(["acl-gen", "acl", "--project-dir", "/tmp/app"]);
        assert_eq!(cli.project_dir, Some(PathBuf::from("/tmp/app")));
    }

    #[test]
    fn rejected_entry_prints_summary_only() {
        let cause = anyhow::anyhow!("model book.json has a non-array acls field");
        let err = cause.context(AclRejected {
            failed: 1,
            total: 1,
        });
        assert_eq!(error_message(&err), "ACL entry rejected by 1 of 1 models");

        let other = anyhow::anyhow!("read model").context("load project");
        assert_eq!(error_message(&other), "load project: read model");
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["acl-gen", "acl", "--model", "Book"]).is_err());
    }
}
