//! # Growgraph CLI Module
//!
//! This module implements the CLI interface for growgraph.
//!
//! ## Available Commands
//!
//! - `generate` - Grow a dataset in memory and report on it
//! - `definitions` - List the built-in definitions
//! - `sample` - Dry run: show which strategies a definition would pick

mod commands;

use crate::config::{ConfigOverrides, GrowgraphConfig};
use clap::{Parser, Subcommand};
use growgraph_core::{InfeasiblePolicy, SynthError};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// growgraph - synthetic graph dataset generator
///
/// Grows an entity/relation/attribute dataset from a weighted schema, with
/// relations drawn from what has already been generated.
#[derive(Parser, Debug)]
#[command(name = "growgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Grow a dataset against in-memory storage
    Generate {
        /// Built-in definition to use
        #[arg(short, long)]
        definition: Option<String>,

        /// Seed for every random draw
        #[arg(short, long)]
        seed: Option<u64>,

        /// Stop once storage holds this many concepts
        #[arg(long)]
        scale: Option<u64>,

        /// What a relation batch does on an unfillable instance
        /// (abort_batch, skip_instance)
        #[arg(short, long)]
        policy: Option<InfeasiblePolicy>,

        /// Print every applied instruction as a JSON line
        #[arg(short, long)]
        emit: bool,
    },

    /// List built-in definitions
    Definitions,

    /// Sample strategies without generating anything
    Sample {
        /// Built-in definition to use
        #[arg(short, long)]
        definition: Option<String>,

        /// Seed for the strategy draws
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of strategies to draw
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },
}

impl Commands {
    /// The configuration values this command sets.
    #[must_use]
    pub fn overrides(&self) -> ConfigOverrides {
        match self {
            Commands::Generate {
                definition,
                seed,
                scale,
                policy,
                ..
            } => ConfigOverrides {
                seed: *seed,
                definition: definition.clone(),
                scale_limit: *scale,
                infeasible_policy: *policy,
            },
            Commands::Sample {
                definition, seed, ..
            } => ConfigOverrides {
                seed: *seed,
                definition: definition.clone(),
                ..ConfigOverrides::default()
            },
            Commands::Definitions => ConfigOverrides::default(),
        }
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Load the config file named on the command line (if any) and apply the
/// subcommand's flags on top.
pub fn resolve_config(cli: &Cli) -> Result<GrowgraphConfig, SynthError> {
    let mut config = GrowgraphConfig::load_or_default(cli.config.as_deref())?;
    if let Some(command) = &cli.command {
        config.apply_overrides(command.overrides());
    }
    Ok(config)
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments and a resolved configuration.
pub fn execute(cli: Cli, config: GrowgraphConfig) -> Result<(), SynthError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Generate { emit, .. }) => {
            config.validate()?;
            cmd_generate(&config, emit, json_mode)
        }
        Some(Commands::Definitions) => cmd_definitions(json_mode),
        Some(Commands::Sample { count, .. }) => {
            config.validate()?;
            cmd_sample(&config, count, json_mode)
        }
        None => {
            // No subcommand - list definitions by default
            cmd_definitions(json_mode)
        }
    }
}
