//! conform: command-line driver for the connector conformance workbench.
//!
//! - `conform setup` writes a commented default config file
//! - `conform run` seeds the in-memory reference repository with demo data,
//!   runs every test case against it and prints the report
//!
//! Exits with status 1 when any assertion failed or any test case aborted.

mod commands;
mod format;

use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::ArgMatches;
use conform_core::{Operation, Timestamp};
use conform_harness::{Workbench, WorkbenchConfig, CONFIG_FILE_NAME};
use conform_memory::{seed_demo, DemoData, InMemoryRepository};
use tracing::info;
use tracing_subscriber::EnvFilter;

use commands::build_cli;
use format::{format_error, format_report, OutputMode};

/// Demo data is written this long before the run starts.
const DEMO_HISTORY: Duration = Duration::from_secs(3_600);

fn main() {
    let matches = build_cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    let (name, sub) = match matches.subcommand() {
        Some(pair) => pair,
        None => process::exit(2),
    };
    let mode = if sub.try_get_one::<bool>("json").ok().flatten() == Some(&true) {
        OutputMode::Json
    } else {
        OutputMode::Human
    };

    let result = match name {
        "setup" => run_setup(sub),
        "run" => run_workbench(sub, mode),
        other => Err(anyhow::anyhow!("unknown command: {}", other)),
    };
    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{}", format_error(&e, mode));
            process::exit(1);
        }
    }
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn config_path(matches: &ArgMatches) -> PathBuf {
    matches
        .get_one::<String>("config")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
}

fn run_setup(matches: &ArgMatches) -> anyhow::Result<i32> {
    let path = config_path(matches);
    let written = WorkbenchConfig::write_default_if_missing(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    if written {
        println!("Wrote default config to {}", path.display());
    } else {
        println!("Config already exists at {}", path.display());
    }
    Ok(0)
}

/// Load the config: an explicit `--config` must exist, the default file is
/// optional.
fn load_config(matches: &ArgMatches) -> anyhow::Result<WorkbenchConfig> {
    let explicit = matches.get_one::<String>("config").is_some();
    let path = config_path(matches);
    if path.exists() {
        WorkbenchConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {}", path.display()))
    } else if explicit {
        bail!("config file {} does not exist", path.display())
    } else {
        info!("No {} found, using defaults", CONFIG_FILE_NAME);
        Ok(WorkbenchConfig::default())
    }
}

fn parse_operation(name: &str) -> anyhow::Result<Operation> {
    Operation::ALL
        .into_iter()
        .find(|op| op.name() == name)
        .with_context(|| {
            let known: Vec<&str> = Operation::ALL.iter().map(|op| op.name()).collect();
            format!("unknown operation {:?}; expected one of {}", name, known.join(", "))
        })
}

fn run_workbench(matches: &ArgMatches, mode: OutputMode) -> anyhow::Result<i32> {
    let mut config = load_config(matches)?;
    if let Some(&workers) = matches.get_one::<usize>("workers") {
        config.workers = workers;
    }

    let demo = DemoData {
        entity_types: *matches.get_one::<usize>("demo-types").unwrap_or(&3),
        instances_per_type: *matches.get_one::<usize>("demo-instances").unwrap_or(&5),
        versions_per_instance: *matches.get_one::<usize>("demo-versions").unwrap_or(&3),
    };
    let repo = Arc::new(InMemoryRepository::new());
    let seeded = seed_demo(&repo, &demo, Timestamp::now().saturating_sub(DEMO_HISTORY))
        .context("failed to seed demo repository")?;
    if let Some(names) = matches.get_many::<String>("decline") {
        for name in names {
            repo.decline(parse_operation(name)?);
        }
    }
    info!(
        types = seeded.types.len(),
        instances = seeded.instances,
        "Demo repository ready"
    );

    let workbench = Workbench::for_connector(config, repo.clone(), repo)
        .context("invalid workbench configuration")?
        .keep_assertions(matches.get_flag("assertions"));
    let report = workbench.run().context("workbench run failed")?;

    println!("{}", format_report(&report, mode)?);
    Ok(if report.has_failures() { 1 } else { 0 })
}
