//! pgbind command-line tool
//!
//! Introspects the configured PostgreSQL databases and keeps the generated
//! Rust bindings in sync with them.

use clap::{Parser, Subcommand};
use pgbind::{Config, Pipeline, SyncMode, SyncReport, DEFAULT_CONFIG};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Typed Rust bindings for PostgreSQL schemas
#[derive(Parser, Debug)]
#[command(name = "pgbind")]
#[command(version, about = "Typed Rust bindings for PostgreSQL schemas")]
struct Args {
    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG)]
    config: PathBuf,

    /// Only process these databases (repeatable)
    #[arg(short, long = "database", global = true)]
    databases: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Introspect the databases and write the spec document
    Spec,
    /// Generate bindings from the spec document
    Generate {
        /// Fail instead of writing when the bindings would change
        #[arg(long)]
        check: bool,
    },
    /// Introspect, then generate
    Run {
        /// Fail instead of writing when the bindings would change
        #[arg(long)]
        check: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pgbind=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> pgbind::Result<()> {
    let config = Config::load(&args.config)?;
    let pipeline = Pipeline::new(config).with_databases(args.databases);

    match args.command {
        Command::Spec => {
            let model = pipeline.spec()?;
            println!(
                "wrote {} ({} databases)",
                pipeline.config().spec_path.display(),
                model.databases.len()
            );
        }
        Command::Generate { check } => {
            let reports = pipeline.with_mode(mode(check)).generate()?;
            print_reports(&reports, check);
        }
        Command::Run { check } => {
            let reports = pipeline.with_mode(mode(check)).run()?;
            print_reports(&reports, check);
        }
    }
    Ok(())
}

fn mode(check: bool) -> SyncMode {
    if check {
        SyncMode::Check
    } else {
        SyncMode::Write
    }
}

fn print_reports(reports: &BTreeMap<String, SyncReport>, check: bool) {
    for (database, report) in reports {
        if check {
            println!("{database}: up to date ({} files)", report.unchanged);
            continue;
        }
        println!(
            "{database}: {} added, {} updated, {} removed, {} unchanged",
            report.added.len(),
            report.updated.len(),
            report.removed.len(),
            report.unchanged
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_generate_check() {
        let args = Args::try_parse_from(["pgbind", "generate", "--check", "-d", "main"]).unwrap();
        assert_eq!(args.config, PathBuf::from(DEFAULT_CONFIG));
        assert_eq!(args.databases, ["main"]);
        assert!(matches!(args.command, Command::Generate { check: true }));
    }

    #[test]
    fn test_parse_global_config() {
        let args = Args::try_parse_from(["pgbind", "--config", "db/pgbind.toml", "spec"]).unwrap();
        assert_eq!(args.config, PathBuf::from("db/pgbind.toml"));
        assert!(args.databases.is_empty());
        assert!(matches!(args.command, Command::Spec));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["pgbind"]).is_err());
    }

    #[test]
    fn test_mode() {
        assert_eq!(mode(true), SyncMode::Check);
        assert_eq!(mode(false), SyncMode::Write);
    }
}
