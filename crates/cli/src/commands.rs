//! Clap command tree definition.

use clap::{value_parser, Arg, ArgAction, Command};
use conform_harness::CONFIG_FILE_NAME;

/// Build the complete CLI command tree.
pub fn build_cli() -> Command {
    Command::new("conform")
        .about("Conformance and performance workbench for repository connectors")
        .version(clap::crate_version!())
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help(format!("Config file (default: ./{})", CONFIG_FILE_NAME))
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log progress (repeat for debug output); RUST_LOG overrides")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(build_setup())
        .subcommand(build_run())
}

fn build_setup() -> Command {
    Command::new("setup").about("Write a commented default config file if none exists")
}

fn build_run() -> Command {
    Command::new("run")
        .about("Run the workbench against the in-memory reference repository")
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the report as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("assertions")
                .long("assertions")
                .help("Include every raw assertion in the JSON report")
                .action(ArgAction::SetTrue)
                .requires("json"),
        )
        .arg(
            Arg::new("demo-types")
                .long("demo-types")
                .help("Entity types seeded into the demo repository")
                .value_parser(value_parser!(usize))
                .default_value("3"),
        )
        .arg(
            Arg::new("demo-instances")
                .long("demo-instances")
                .help("Instances seeded per demo type")
                .value_parser(value_parser!(usize))
                .default_value("5"),
        )
        .arg(
            Arg::new("demo-versions")
                .long("demo-versions")
                .help("Versions written per demo instance")
                .value_parser(value_parser!(usize))
                .default_value("3"),
        )
        .arg(
            Arg::new("workers")
                .long("workers")
                .short('w')
                .help("Test cases run concurrently (overrides the config file)")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("decline")
                .long("decline")
                .help("Make the demo repository decline an operation, e.g. get_entity_history")
                .action(ArgAction::Append),
        )
}
