use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::{groups, inspect, tables};

#[derive(Parser, Debug)]
#[command(
    name = "graftforge",
    about = "A command-line tool for assembling grafted molecular systems from port-based building blocks.",
    version,
    author,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a recipe and report its particles, bonds, and open ports.
    Inspect(inspect::InspectArgs),
    /// Build a two-sided grafted monolayer and report its index groups.
    Groups(groups::GroupsArgs),
    /// Build a recipe, type it from its geometry, and print the topology tables.
    Tables(tables::TablesArgs),
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Inspect(args) => inspect::run(&args)?,
        Command::Groups(args) => groups::run(&args)?,
        Command::Tables(args) => tables::run(&args)?,
    }

    Ok(())
}
