//! Generate command implementation
//!
//! The generate command runs the whole pipeline:
//! 1. Load the recipe (a file, or the built-in libz recipe)
//! 2. Load the sources (download with caching, a local archive, or a directory)
//! 3. Preprocess every file
//! 4. Amalgamate and write each output unit in recipe order

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Instant;

use amalgamate::output::{emoji, unit_summary, OutputConfig};
use amalgamate::pipeline::{self, RunOptions};

use super::{RecipeArgs, SourceArgs};

/// Arguments for the generate command
#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,

    #[command(flatten)]
    pub source: SourceArgs,

    /// Output directory (defaults to current directory)
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Generate everything but write nothing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the generate command
pub fn execute(args: GenerateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    let start_time = Instant::now();

    let recipe = args.recipe.load()?;

    let output_dir = match args.output {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to get current directory")?,
    };

    if !args.quiet {
        println!(
            "{} Generating {} {} ({})",
            emoji(&out, "🔧", "[GEN]"),
            recipe.name,
            recipe.source.version,
            args.recipe.origin()
        );
    }

    let files = pipeline::prepare(&recipe, &args.source.spec())
        .with_context(|| format!("Failed to load sources for {}", recipe.name))?;

    let options = RunOptions {
        output_dir,
        dry_run: args.dry_run,
    };
    let reports = pipeline::run(&recipe, &files, &options)?;

    if !args.quiet {
        for report in &reports {
            println!("   {}", unit_summary(&out, report));
        }
        let verb = if args.dry_run { "Checked" } else { "Wrote" };
        println!(
            "{} {} {} file(s) in {:.2}s",
            emoji(&out, "✨", "[DONE]"),
            verb,
            reports.len(),
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}
