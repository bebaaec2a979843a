use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Args;
use prettytable::{Table, format, row};

use graft_forge::Assembly;
use graft_forge::ops::{IndexGroupConfig, IndexGroups, classify};
use graft_forge::recipes::dual_monolayer;

use crate::commands::{LayerArgs, print_boxed_label, run_with_spinner};

/// Builds a two-sided grafted monolayer and classifies its particles.
#[derive(Debug, Args)]
pub struct GroupsArgs {
    #[command(flatten)]
    pub layer: LayerArgs,
    /// Compound name marking grafted chains.
    #[arg(long = "chain-marker", default_value = "Alkylsilane")]
    pub chain_marker: String,
    /// Compound names marking terminal groups (repeatable, case-insensitive).
    #[arg(long = "terminal-group", value_name = "NAME")]
    pub terminal_groups: Vec<String>,
    /// Depth of the frozen layer at each outer face (nm).
    #[arg(long = "freeze-thickness", default_value_t = 0.5)]
    pub freeze_thickness: f64,
}

impl GroupsArgs {
    fn config(&self) -> IndexGroupConfig {
        self.terminal_groups.iter().fold(
            IndexGroupConfig::new()
                .chain_marker(self.chain_marker.clone())
                .freeze_thickness(self.freeze_thickness),
            |config, name| config.terminal_group(name.clone()),
        )
    }
}

pub fn run(args: &GroupsArgs) -> Result<()> {
    let groups = run_with_spinner("Classifying index groups", || {
        let mut assembly = Assembly::new();
        let layer = &args.layer;
        let system = dual_monolayer(
            &mut assembly,
            &layer.layout(),
            layer.chain_length,
            layer.terminal.into(),
            layer.gap,
        )
        .context("Failed to assemble the two-sided monolayer")?;
        classify(&assembly, system, &args.config()).context("Failed to classify particles")
    })?;

    print_groups(&groups)
}

fn print_groups(groups: &IndexGroups) -> Result<()> {
    let mut stderr = io::stderr().lock();
    print_boxed_label(&mut stderr, "Index Groups")?;

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table.set_titles(row!["Group", "Size", "First", "Last"]);
    for (name, indices) in groups.iter() {
        let first = indices.first().map_or("-".to_string(), usize::to_string);
        let last = indices.last().map_or("-".to_string(), usize::to_string);
        table.add_row(row![name, indices.len(), first, last]);
    }
    table
        .print(&mut stderr)
        .context("Failed to render index groups")?;
    Ok(())
}
