//! # Tree Command Implementation
//!
//! This module implements the `tree` subcommand, which displays how the
//! includes of each output unit resolve, in a hierarchical format.
//!
//! ## Functionality
//!
//! - **Include Tree Visualization**: Every entry file of a unit, with the
//!   decision taken for each of its include directives, nested by inlining
//! - **Unit Selection**: Supports `--unit` to show a single output unit
//! - **Depth Control**: Supports `--depth` flag to limit tree depth
//!
//! This command does not write any files.

use anyhow::{Context, Result};
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::borrow::Cow;

use amalgamate::amalgamate::{amalgamate_with, EntryResult};
use amalgamate::output::{emoji, OutputConfig};
use amalgamate::pipeline;
use amalgamate::resolver::{Action, IncludeEvent};

use super::{RecipeArgs, SourceArgs};

/// Display the include tree of each output unit
#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Only show the output unit with this path
    #[arg(long, value_name = "PATH")]
    pub unit: Option<String>,

    /// Maximum depth to display in the tree.
    ///
    /// If not specified, displays the full tree.
    /// Use 0 to show only the unit, 1 to show its entry files, etc.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let recipe = args.recipe.load()?;

    let units: Vec<_> = match &args.unit {
        Some(path) => vec![recipe
            .output(path)
            .with_context(|| format!("Recipe {} has no output unit {}", recipe.name, path))?],
        None => recipe.outputs.iter().collect(),
    };

    let files = pipeline::prepare(&recipe, &args.source.spec())
        .with_context(|| format!("Failed to load sources for {}", recipe.name))?;
    let max_depth = args.depth.unwrap_or(usize::MAX);

    for unit in units {
        println!(
            "{} Include tree for: {}",
            emoji(&out, "🌳", "[TREE]"),
            unit.path
        );
        let merged = amalgamate_with(files.files_for(unit), &unit.entries, recipe.dedup)
            .with_context(|| format!("Failed to resolve {}", unit.path))?;

        let root = unit_node(&unit.path, &merged.entries, max_depth);
        print_tree(&root).context("Failed to display tree")?;
    }

    Ok(())
}

fn unit_node(path: &str, entries: &[EntryResult], max_depth: usize) -> TreeNode {
    let children = if max_depth == 0 {
        vec![]
    } else {
        entries
            .iter()
            .map(|entry| TreeNode {
                label: entry.path.clone(),
                children: event_nodes(&entry.resolved.includes, max_depth, 2),
            })
            .collect()
    };
    TreeNode {
        label: path.to_string(),
        children,
    }
}

/// Build nodes for the events at `current_depth`
fn event_nodes(events: &[IncludeEvent], max_depth: usize, current_depth: usize) -> Vec<TreeNode> {
    if current_depth > max_depth {
        return vec![];
    }
    events
        .iter()
        .map(|event| match &event.action {
            Action::Inlined { path, children } => TreeNode {
                label: if *path == event.name {
                    path.clone()
                } else {
                    format!("{} -> {}", event.name, path)
                },
                children: event_nodes(children, max_depth, current_depth + 1),
            },
            Action::Suppressed { path } => TreeNode {
                label: format!("{} (already inlined as {})", event.name, path),
                children: vec![],
            },
            Action::Preserved => TreeNode {
                label: format!("{} (kept)", event.name),
                children: vec![],
            },
        })
        .collect()
}

/// Tree node structure for ptree visualization
#[derive(Clone, Debug, PartialEq, Eq)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}
