use std::io::{self, Write};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};

use graft_forge::recipes::{self, ChainGroup, Secondary, SurfaceLayout, Terminal};
use graft_forge::{Assembly, NodeId};

pub mod groups;
pub mod inspect;
pub mod tables;

/// Building blocks the CLI knows how to assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecipeKind {
    /// Bare methylene backbone.
    Alkane,
    /// Hydroxy-silane anchored chain with two open ports.
    Alkylsilane,
    /// Alkylsilane with a carbonyl, ester, ether, or amide linkage near its end.
    Modified,
    /// Alkylsilane carrying a carboxylate and a small alkyl group.
    Functionalized,
    /// Methyl docked onto a carboxylate.
    AceticAcid,
    /// Surface-graftable chain with a terminal cap.
    Grafted,
    /// Silicon slab with a chain on every site.
    Monolayer,
    /// Two monolayers facing each other.
    DualMonolayer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TerminalKind {
    Methyl,
    Carboxylate,
    Hydrogen,
}

impl From<TerminalKind> for Terminal {
    fn from(kind: TerminalKind) -> Self {
        match kind {
            TerminalKind::Methyl => Terminal::Methyl,
            TerminalKind::Carboxylate => Terminal::Carboxylate,
            TerminalKind::Hydrogen => Terminal::Hydrogen,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SecondaryKind {
    Methyl,
    Ethyl,
}

impl From<SecondaryKind> for Secondary {
    fn from(kind: SecondaryKind) -> Self {
        match kind {
            SecondaryKind::Methyl => Secondary::Methyl,
            SecondaryKind::Ethyl => Secondary::Ethyl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ChainGroupKind {
    Carbonyl,
    Ester,
    Ether,
    Amide,
}

impl From<ChainGroupKind> for ChainGroup {
    fn from(kind: ChainGroupKind) -> Self {
        match kind {
            ChainGroupKind::Carbonyl => ChainGroup::Carbonyl,
            ChainGroupKind::Ester => ChainGroup::Ester,
            ChainGroupKind::Ether => ChainGroup::Ether,
            ChainGroupKind::Amide => ChainGroup::Amide,
        }
    }
}

/// Surface grid and chain parameters shared by the surface-based commands.
#[derive(Debug, Clone, Args)]
pub struct LayerArgs {
    /// Number of methylene units per chain.
    #[arg(short = 'n', long = "chain-length", default_value_t = 6)]
    pub chain_length: usize,
    /// Cap placed on the free end of grafted chains.
    #[arg(long, value_enum, default_value_t = TerminalKind::Methyl)]
    pub terminal: TerminalKind,
    /// Grafting sites along x.
    #[arg(long, default_value_t = 2)]
    pub nx: usize,
    /// Grafting sites along y.
    #[arg(long, default_value_t = 2)]
    pub ny: usize,
    /// Site spacing (nm).
    #[arg(long, default_value_t = 0.5)]
    pub spacing: f64,
    /// Gap between facing monolayers (nm).
    #[arg(long, default_value_t = 1.0)]
    pub gap: f64,
}

impl LayerArgs {
    pub fn layout(&self) -> SurfaceLayout {
        SurfaceLayout::new(self.nx, self.ny, self.spacing)
    }
}

/// Recipe selection shared by the reporting commands.
#[derive(Debug, Clone, Args)]
pub struct RecipeArgs {
    /// Recipe to assemble.
    #[arg(value_enum, default_value_t = RecipeKind::Grafted)]
    pub recipe: RecipeKind,
    /// Group docked onto the secondary port of functionalized chains.
    #[arg(long, value_enum, default_value_t = SecondaryKind::Methyl)]
    pub secondary: SecondaryKind,
    /// Backbone linkage for modified and functionalized chains.
    #[arg(long = "chain-group", value_enum)]
    pub chain_group: Option<ChainGroupKind>,
    #[command(flatten)]
    pub layer: LayerArgs,
}

impl RecipeArgs {
    /// Assembles the selected recipe and returns its root.
    pub fn build(&self, assembly: &mut Assembly) -> Result<NodeId> {
        let layer = &self.layer;
        let root = match self.recipe {
            RecipeKind::Alkane => recipes::alkane(assembly, layer.chain_length),
            RecipeKind::Alkylsilane => recipes::alkylsilane(assembly, layer.chain_length),
            RecipeKind::Modified => recipes::modified_chain(
                assembly,
                layer.chain_length,
                self.chain_group.map(Into::into).unwrap_or_default(),
            ),
            RecipeKind::Functionalized => recipes::functionalized_alkylsilane(
                assembly,
                layer.chain_length,
                self.secondary.into(),
                self.chain_group.map(Into::into),
            ),
            RecipeKind::AceticAcid => recipes::acetic_acid(assembly),
            RecipeKind::Grafted => {
                recipes::grafted_chain(assembly, layer.chain_length, layer.terminal.into())
            }
            RecipeKind::Monolayer => recipes::monolayer(
                assembly,
                &layer.layout(),
                layer.chain_length,
                layer.terminal.into(),
            ),
            RecipeKind::DualMonolayer => recipes::dual_monolayer(
                assembly,
                &layer.layout(),
                layer.chain_length,
                layer.terminal.into(),
                layer.gap,
            ),
        };
        root.with_context(|| format!("Failed to assemble {:?}", self.recipe))
    }
}

/// Label path of `node` below `root`, such as `alkane/CH2[2]/C[0]`.
pub fn label_path(assembly: &Assembly, root: NodeId, node: NodeId) -> String {
    let mut parts = Vec::new();
    let mut current = node;
    while current != root {
        match (assembly.label(current), assembly.parent(current)) {
            (Some(label), Some(parent)) => {
                parts.push(label);
                current = parent;
            }
            _ => break,
        }
    }
    parts.reverse();
    parts.join("/")
}

/// Wraps long-running operations with a spinner rendered to stderr.
pub fn run_with_spinner<T, F>(message: &str, work: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.green} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(message.to_string());

    let result = work();

    match &result {
        Ok(_) => spinner.finish_with_message(format!("{} ✓", message)),
        Err(_) => spinner.abandon_with_message(format!("{} ✗", message)),
    }

    result
}

pub fn print_boxed_label<W: Write>(writer: &mut W, title: &str) -> io::Result<()> {
    let inner = format!(" {title} ");
    let width = inner.chars().count();
    writeln!(writer, "╭{}╮", "─".repeat(width))?;
    writeln!(writer, "│{}│", inner)?;
    writeln!(writer, "╰{}╯", "─".repeat(width))?;
    Ok(())
}
