//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.
//! Command output goes to stdout; logs go to stderr.

use crate::config::GrowgraphConfig;
use growgraph_core::{
    ConceptId, DataGenerator, GenerationReport, Instruction, MemoryStorage, SynthError,
    definitions,
};
use serde::Serialize;

/// One line of `generate --emit` output: the new identifier next to the
/// instruction that created it. Attribute lines also name their value's
/// data type.
#[derive(Debug, Serialize)]
pub struct EmittedLine<'a> {
    pub id: ConceptId,
    #[serde(flatten)]
    pub instruction: &'a Instruction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<&'static str>,
}

impl<'a> EmittedLine<'a> {
    #[must_use]
    pub fn new(id: ConceptId, instruction: &'a Instruction) -> Self {
        let data_type = match instruction {
            Instruction::Attribute { value, .. } => Some(value.data_type()),
            _ => None,
        };
        Self {
            id,
            instruction,
            data_type,
        }
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, SynthError> {
    let result = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    result.map_err(|e| SynthError::SerializationError(e.to_string()))
}

// =============================================================================
// GENERATE COMMAND
// =============================================================================

/// Run the driver for the configured definition and print its report.
pub fn cmd_generate(
    config: &GrowgraphConfig,
    emit: bool,
    json_mode: bool,
) -> Result<(), SynthError> {
    let report = run_generation(config, emit)?;

    if json_mode || emit {
        // Keep the stream line-oriented when instructions were emitted.
        println!("{}", to_json(&report, !emit)?);
        return Ok(());
    }

    println!("Growgraph Generation Report");
    println!("===========================");
    println!("Definition:  {}", config.definition);
    println!("Seed:        {}", config.seed);
    println!("Policy:      {}", config.infeasible_policy);
    println!();
    println!("Stopped:     {}", report.stop_reason);
    println!("Iterations:  {} ({} idle)", report.iterations, report.idle_iterations);
    println!("Scale:       {} / {}", report.final_scale, report.scale_limit);
    println!("Entities:    {}", report.applied.entities);
    println!("Attributes:  {}", report.applied.attributes);
    println!("Relations:   {}", report.applied.relations);

    if let Some(summary) = &report.summary {
        println!();
        println!("Storage:");
        println!("  Role players:       {}", summary.role_players);
        println!("  Mean roles/rel:     {:.2}", summary.mean_role_players);
        println!("  Max degree:         {}", summary.max_degree);
        println!(
            "  Orphans:            {} entities, {} attributes",
            summary.orphan_entities, summary.orphan_attributes
        );
        for (type_label, count) in &summary.per_type {
            println!("  {:<20}{}", type_label, count);
        }
    }

    Ok(())
}

/// Build the configured schema and grow an in-memory storage to the
/// configured scale.
pub fn run_generation(
    config: &GrowgraphConfig,
    emit: bool,
) -> Result<GenerationReport, SynthError> {
    let mut schema = definitions::build(&config.definition, config.seed)?;
    schema.set_infeasible_policy(config.infeasible_policy);

    let mut generator = DataGenerator::new(schema, MemoryStorage::new())
        .with_max_iterations(config.max_iterations)
        .with_max_idle_iterations(config.max_idle_iterations);

    if emit {
        generator = generator.with_observer(|id, instruction| {
            match to_json(&EmittedLine::new(id, instruction), false) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!(%id, "cannot encode instruction: {}", e),
            }
        });
    }

    let report = generator.generate(config.scale_limit)?;
    Ok(report.with_summary(generator.summary()))
}

// =============================================================================
// DEFINITIONS COMMAND
// =============================================================================

/// List the built-in definitions.
pub fn cmd_definitions(json_mode: bool) -> Result<(), SynthError> {
    if json_mode {
        let output: Vec<_> = definitions::DEFINITIONS
            .iter()
            .map(|(name, description)| {
                serde_json::json!({ "name": name, "description": description })
            })
            .collect();
        println!("{}", to_json(&output, true)?);
        return Ok(());
    }

    println!("Built-in definitions");
    println!("====================");
    for (name, description) in definitions::DEFINITIONS {
        println!("  {:<26}{}", name, description);
    }
    Ok(())
}

// =============================================================================
// SAMPLE COMMAND
// =============================================================================

/// Draw `count` strategies from the configured definition.
pub fn sample_strategies(
    config: &GrowgraphConfig,
    count: usize,
) -> Result<Vec<(String, String)>, SynthError> {
    let mut schema = definitions::build(&config.definition, config.seed)?;
    let mut picks = Vec::with_capacity(count);
    for _ in 0..count {
        let strategy = schema.sample_next_strategy()?;
        picks.push((strategy.kind().to_string(), strategy.type_label().to_string()));
    }
    Ok(picks)
}

/// Print a dry run of strategy selection.
pub fn cmd_sample(
    config: &GrowgraphConfig,
    count: usize,
    json_mode: bool,
) -> Result<(), SynthError> {
    let picks = sample_strategies(config, count)?;

    if json_mode {
        let output: Vec<_> = picks
            .iter()
            .map(|(kind, type_label)| serde_json::json!({ "kind": kind, "type": type_label }))
            .collect();
        println!("{}", to_json(&output, true)?);
        return Ok(());
    }

    println!(
        "{} strategies from {} (seed {})",
        picks.len(),
        config.definition,
        config.seed
    );
    for (i, (kind, type_label)) in picks.iter().enumerate() {
        println!("  {:>4}  {:<10}{}", i + 1, kind, type_label);
    }
    Ok(())
}
