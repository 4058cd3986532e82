//! Subcommand implementations.
//!
//! Each command owns its CLI args and execution logic.

mod compare;
mod run;
mod strategies;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use maze_core::Layout;

pub use compare::Compare;
pub use run::Run;
pub use strategies::Strategies;

/// Loads `path`, or the built-in reference maze. Returns the layout and a
/// name for records.
fn load_layout(path: Option<&Path>) -> Result<(Layout, String)> {
    let Some(path) = path else {
        return Ok((Layout::reference()?, "reference".to_string()));
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout {}", path.display()))?;
    let layout =
        Layout::parse(&text).with_context(|| format!("Invalid layout {}", path.display()))?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((layout, name))
}

/// Layout file argument shared by several commands.
#[derive(clap::Args, Debug, Clone)]
struct LayoutArg {
    /// Maze file (`#` wall, `.` pellet, `o` power pellet, `P` agent, `G` adversary)
    #[arg(long)]
    layout: Option<PathBuf>,
}
