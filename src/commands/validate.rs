//! # Validate Command Implementation
//!
//! This module implements the `validate` subcommand, which checks a recipe
//! without fetching or generating anything.
//!
//! ## Functionality
//!
//! - **Recipe Validation**: Parses the recipe and checks its structure (source
//!   URL, outputs, entries, patch operations, guard exemptions).
//! - **Preprocessing Validation**: Compiles the patch table so every operation
//!   is known to be usable.
//! - **Summary**: Prints the source, the patched files and each output unit.
//!
//! This command is a safe, read-only operation that does not modify any files.

use anyhow::Result;
use clap::Args;

use amalgamate::output::{emoji, OutputConfig};
use amalgamate::preprocess::Preprocessor;

use super::RecipeArgs;

/// Validate a recipe file
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub recipe: RecipeArgs,
}

/// Execute the `validate` command.
///
/// # Arguments
/// * `args` - The command arguments
/// * `color_flag` - The value of the global --color flag ("always", "never", or "auto")
pub fn execute(args: ValidateArgs, color_flag: &str) -> Result<()> {
    let out = OutputConfig::from_env_and_flag(color_flag);
    println!(
        "{} Validating recipe: {}",
        emoji(&out, "🔍", "[SCAN]"),
        args.recipe.origin()
    );

    let recipe = match args.recipe.load() {
        Ok(recipe) => recipe,
        Err(e) => {
            println!(
                "{} Recipe validation failed: {:#}",
                emoji(&out, "❌", "[ERR]"),
                e
            );
            return Err(e);
        }
    };

    if let Err(e) = Preprocessor::new(&recipe.preprocess) {
        println!(
            "{} Preprocessing table is invalid: {}",
            emoji(&out, "❌", "[ERR]"),
            e
        );
        return Err(anyhow::anyhow!("Preprocessing table is invalid: {}", e));
    }

    println!("{} Recipe parsed successfully", emoji(&out, "✅", "[OK]"));

    println!("\n{} Recipe Summary:", emoji(&out, "📊", "[INFO]"));
    println!("   Name: {}", recipe.name);
    println!("   Source: {} @ {}", recipe.source.url, recipe.source.version);
    println!(
        "   Patched files: {}",
        recipe.preprocess.patches.len()
    );
    for unit in &recipe.outputs {
        println!(
            "   Output {}: {} entries, labelled \"{}\"",
            unit.path,
            unit.entries.len(),
            recipe.label_for(unit)
        );
    }

    println!("\n{} Recipe is valid", emoji(&out, "✅", "[OK]"));
    Ok(())
}
