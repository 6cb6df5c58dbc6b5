//! Moonveil CLI
//!
//! Command-line interface for Luau source obfuscation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use moonveil_core::{Obfuscator, ObfuscatorConfig};

#[derive(Parser)]
#[command(name = "moonveil")]
#[command(about = "Luau source obfuscation tool")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default moonveil.toml into a directory
    Init {
        /// Directory to initialize (default: current directory)
        #[arg(short, long)]
        path: Option<PathBuf>,
    },

    /// Obfuscate a Luau source file
    Obfuscate {
        /// Input script
        input: PathBuf,

        /// Output path (default: input with an .obf extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (default: ./moonveil.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Decoy blocks added by the control-flow flattener
        #[arg(long)]
        decoys: Option<usize>,

        /// Keep comments in the output
        #[arg(long)]
        keep_comments: bool,

        /// Skip conditional inversion
        #[arg(long)]
        no_invert: bool,

        /// Skip opaque predicate injection
        #[arg(long)]
        no_inject: bool,

        /// Skip control-flow flattening
        #[arg(long)]
        no_flatten: bool,

        /// Skip boolean literal rewriting
        #[arg(long)]
        no_booleans: bool,

        /// Skip numeric literal splitting
        #[arg(long)]
        no_numbers: bool,

        /// Skip string encryption
        #[arg(long)]
        no_strings: bool,

        /// Skip global virtualization
        #[arg(long)]
        no_globals: bool,

        /// Write per-pass transform counts as JSON
        #[arg(long)]
        report_json: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("moonveil=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => {
            cmd_init(path)?;
        }
        Commands::Obfuscate {
            input,
            output,
            config,
            seed,
            decoys,
            keep_comments,
            no_invert,
            no_inject,
            no_flatten,
            no_booleans,
            no_numbers,
            no_strings,
            no_globals,
            report_json,
        } => {
            let switches = PassSwitches {
                keep_comments,
                no_invert,
                no_inject,
                no_flatten,
                no_booleans,
                no_numbers,
                no_strings,
                no_globals,
            };
            cmd_obfuscate(input, output, config, seed, decoys, switches, report_json)?;
        }
    }

    Ok(())
}

struct PassSwitches {
    keep_comments: bool,
    no_invert: bool,
    no_inject: bool,
    no_flatten: bool,
    no_booleans: bool,
    no_numbers: bool,
    no_strings: bool,
    no_globals: bool,
}

/// Write a default config file
fn cmd_init(path: Option<PathBuf>) -> Result<()> {
    let dir = path.unwrap_or_else(|| std::env::current_dir().unwrap());
    let config_path = dir.join("moonveil.toml");
    if config_path.exists() {
        bail!("{} already exists", config_path.display());
    }

    let config = ObfuscatorConfig::default();
    let raw = toml::to_string_pretty(&config)?;
    std::fs::write(&config_path, raw).context("Failed to write moonveil.toml")?;

    println!("Initialized Moonveil config at {:?}", config_path);
    println!("\nNext steps:");
    println!("  1. Adjust [passes] and [globals] to taste");
    println!("  2. Run: moonveil obfuscate script.lua");

    Ok(())
}

/// Obfuscate one file
fn cmd_obfuscate(
    input: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
    seed: Option<u64>,
    decoys: Option<usize>,
    switches: PassSwitches,
    report_json: Option<PathBuf>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => ObfuscatorConfig::load(&path)?,
        None => {
            let default_path = Path::new("moonveil.toml");
            if default_path.exists() {
                ObfuscatorConfig::load(default_path)?
            } else {
                ObfuscatorConfig::default()
            }
        }
    };

    // Flags win over the config file.
    if seed.is_some() {
        config.seed = seed;
    }
    if let Some(decoys) = decoys {
        config.decoy_blocks = decoys;
    }
    if switches.keep_comments {
        config.passes.strip_comments = false;
    }
    if switches.no_invert {
        config.passes.invert_conditionals = false;
    }
    if switches.no_inject {
        config.passes.inject_predicates = false;
    }
    if switches.no_flatten {
        config.passes.flatten_control_flow = false;
    }
    if switches.no_booleans {
        config.passes.mangle_booleans = false;
    }
    if switches.no_numbers {
        config.passes.mangle_numbers = false;
    }
    if switches.no_strings {
        config.passes.encrypt_strings = false;
    }
    if switches.no_globals {
        config.passes.virtualize_globals = false;
    }

    let source = std::fs::read_to_string(&input)
        .with_context(|| format!("Failed to read input file: {}", input.display()))?;

    tracing::info!("Obfuscating {}", input.display());
    let result = Obfuscator::new(config).obfuscate(&source);

    let output = output.unwrap_or_else(|| default_output_path(&input));
    std::fs::write(&output, &result.source)
        .with_context(|| format!("Failed to write output file: {}", output.display()))?;

    println!("Obfuscated {} -> {}", input.display(), output.display());
    println!("\nTransforms applied:");
    println!("  comments removed:       {}", result.stats.comments_removed);
    println!("  conditionals inverted:  {}", result.stats.conditionals_inverted);
    println!("  statements wrapped:     {}", result.stats.statements_wrapped);
    println!("  units flattened:        {}", result.stats.units_flattened);
    println!("  booleans rewritten:     {}", result.stats.booleans_rewritten);
    println!("  numbers mangled:        {}", result.stats.numbers_mangled);
    println!("  strings encrypted:      {}", result.stats.strings_encrypted);
    println!("  globals virtualized:    {}", result.stats.globals_virtualized);
    println!("  total:                  {}", result.stats.total_transforms());

    if let Some(report_path) = report_json {
        let report = serde_json::to_string_pretty(&result.stats)?;
        std::fs::write(&report_path, report)
            .with_context(|| format!("Failed to write report file: {}", report_path.display()))?;
        println!("\nReport written to {}", report_path.display());
    }

    Ok(())
}

/// `script.lua` becomes `script.obf.lua`, keeping the original extension.
fn default_output_path(input: &Path) -> PathBuf {
    match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => input.with_extension(format!("obf.{ext}")),
        None => input.with_extension("obf.lua"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path_keeps_extension() {
        assert_eq!(
            default_output_path(Path::new("game/init.lua")),
            PathBuf::from("game/init.obf.lua")
        );
        assert_eq!(
            default_output_path(Path::new("main.luau")),
            PathBuf::from("main.obf.luau")
        );
        assert_eq!(
            default_output_path(Path::new("script")),
            PathBuf::from("script.obf.lua")
        );
    }
}
