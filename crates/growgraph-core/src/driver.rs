//! # Generation Driver
//!
//! Runs a [`SchemaDefinition`] against a storage until the storage reaches a
//! requested scale.
//!
//! Each iteration draws a batch, collects every instruction it yields, and only
//! then writes them back. A batch reads a consistent storage for its whole
//! lifetime; its instructions become visible to the next batch.

use crate::ingestor::Ingestor;
use crate::schema::SchemaDefinition;
use crate::storage::{ConceptSink, ConceptStorage, MemoryStorage};
use crate::system::StorageSummary;
use crate::{ConceptId, ConceptKind, Instruction, SynthError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default bound on driver iterations per `generate` call.
pub const DEFAULT_MAX_ITERATIONS: u64 = 100_000;

/// Default number of consecutive empty batches tolerated before giving up.
pub const DEFAULT_MAX_IDLE_ITERATIONS: u64 = 50;

/// Callback receiving every applied instruction with its new identifier.
pub type Observer = Box<dyn FnMut(ConceptId, &Instruction)>;

// =============================================================================
// REPORT
// =============================================================================

/// Why a `generate` call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The storage reached the requested scale.
    ScaleReached,
    /// The iteration bound was hit first.
    IterationLimit,
    /// Too many consecutive batches produced nothing.
    Idle,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StopReason::ScaleReached => "scale_reached",
            StopReason::IterationLimit => "iteration_limit",
            StopReason::Idle => "idle",
        };
        write!(f, "{}", name)
    }
}

/// Instructions applied, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstructionCounts {
    pub entities: u64,
    pub attributes: u64,
    pub relations: u64,
}

impl InstructionCounts {
    fn record(&mut self, kind: ConceptKind) {
        match kind {
            ConceptKind::Entity => self.entities += 1,
            ConceptKind::Attribute => self.attributes += 1,
            ConceptKind::Relation => self.relations += 1,
        }
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.entities + self.attributes + self.relations
    }
}

/// Outcome of one `generate` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Batches drawn during this call.
    pub iterations: u64,
    /// Batches that yielded no instruction.
    pub idle_iterations: u64,
    /// Instructions written during this call.
    pub applied: InstructionCounts,
    /// Storage scale when the call returned.
    pub final_scale: u64,
    /// The scale that was asked for.
    pub scale_limit: u64,
    pub stop_reason: StopReason,
    /// Structural summary, when the storage can provide one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<StorageSummary>,
}

impl GenerationReport {
    /// Attach a storage summary.
    #[must_use]
    pub fn with_summary(mut self, summary: StorageSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "stop={} iterations={} scale={}/{} applied: entities={} attributes={} relations={}",
            self.stop_reason,
            self.iterations,
            self.final_scale,
            self.scale_limit,
            self.applied.entities,
            self.applied.attributes,
            self.applied.relations
        )?;
        if let Some(summary) = &self.summary {
            write!(f, "\n{}", summary)?;
        }
        Ok(())
    }
}

// =============================================================================
// DRIVER
// =============================================================================

/// Owns a schema and a storage, and grows the storage batch by batch.
pub struct DataGenerator<S> {
    schema: SchemaDefinition,
    storage: S,
    max_iterations: u64,
    max_idle_iterations: u64,
    observer: Option<Observer>,
}

impl<S> fmt::Debug for DataGenerator<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataGenerator")
            .field("strategies", &self.schema.strategy_count())
            .field("max_iterations", &self.max_iterations)
            .field("max_idle_iterations", &self.max_idle_iterations)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl<S: ConceptStorage + ConceptSink> DataGenerator<S> {
    #[must_use]
    pub fn new(schema: SchemaDefinition, storage: S) -> Self {
        Self {
            schema,
            storage,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_idle_iterations: DEFAULT_MAX_IDLE_ITERATIONS,
            observer: None,
        }
    }

    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    #[must_use]
    pub fn with_max_idle_iterations(mut self, max_idle_iterations: u64) -> Self {
        self.max_idle_iterations = max_idle_iterations.max(1);
        self
    }

    /// Install a callback that sees every applied instruction.
    #[must_use]
    pub fn with_observer(
        mut self,
        observer: impl FnMut(ConceptId, &Instruction) + 'static,
    ) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// Grow the storage until `current_scale() >= scale_limit`.
    ///
    /// Returns early, without error, when the iteration bound is hit or when
    /// `max_idle_iterations` batches in a row produce nothing. May be called
    /// again with a larger limit to continue the same run.
    pub fn generate(&mut self, scale_limit: u64) -> Result<GenerationReport, SynthError> {
        let mut iterations = 0;
        let mut idle_iterations = 0;
        let mut idle_streak = 0;
        let mut applied = InstructionCounts::default();
        let mut scale = self.storage.current_scale()?;

        tracing::info!(
            scale,
            scale_limit,
            strategies = self.schema.strategy_count(),
            policy = %self.schema.infeasible_policy(),
            "generation started"
        );

        let stop_reason = loop {
            if scale >= scale_limit {
                break StopReason::ScaleReached;
            }
            if iterations >= self.max_iterations {
                break StopReason::IterationLimit;
            }
            if idle_streak >= self.max_idle_iterations {
                tracing::warn!(
                    scale,
                    scale_limit,
                    idle_streak,
                    "no batch produced anything, giving up"
                );
                break StopReason::Idle;
            }

            iterations += 1;
            let (kind, type_label, instructions) = self.next_instructions()?;

            if instructions.is_empty() {
                idle_iterations += 1;
                idle_streak += 1;
            } else {
                idle_streak = 0;
            }

            for instruction in &instructions {
                let id = Ingestor::apply(&mut self.storage, instruction)?;
                applied.record(instruction.kind());
                if let Some(observer) = self.observer.as_mut() {
                    observer(id, instruction);
                }
            }

            scale = self.storage.current_scale()?;
            tracing::debug!(
                iteration = iterations,
                %kind,
                type_label = %type_label,
                produced = instructions.len(),
                scale,
                "batch applied"
            );
        };

        let report = GenerationReport {
            iterations,
            idle_iterations,
            applied,
            final_scale: scale,
            scale_limit,
            stop_reason,
            summary: None,
        };
        tracing::info!(
            stop_reason = %report.stop_reason,
            iterations,
            applied = applied.total(),
            scale,
            "generation finished"
        );
        Ok(report)
    }

    /// Draw one batch and drain it while the storage is borrowed read-only.
    fn next_instructions(
        &mut self,
    ) -> Result<(ConceptKind, String, Vec<Instruction>), SynthError> {
        let batch = self.schema.next_batch(&self.storage)?;
        let kind = batch.kind();
        let instructions = batch.collect::<Result<Vec<_>, _>>()?;
        let type_label = instructions
            .first()
            .map(|i| i.type_label().to_string())
            .unwrap_or_default();
        Ok((kind, type_label, instructions))
    }
}

impl DataGenerator<MemoryStorage> {
    /// Structural summary of the generated data.
    #[must_use]
    pub fn summary(&self) -> StorageSummary {
        StorageSummary::from_storage(&self.storage)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions;
    use crate::distribution::CountDistribution;
    use crate::schema::SchemaBuilder;
    use crate::strategy::EntityStrategy;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn people_only(seed: u64) -> SchemaDefinition {
        SchemaBuilder::new(seed)
            .entity(
                1.0,
                EntityStrategy::new("person", CountDistribution::constant(4)).expect("strategy"),
            )
            .expect("entity")
            .build()
            .expect("schema")
    }

    #[test]
    fn reaches_requested_scale() {
        let mut generator = DataGenerator::new(people_only(1), MemoryStorage::new());
        let report = generator.generate(10).expect("generate");

        assert_eq!(report.stop_reason, StopReason::ScaleReached);
        // Batches of 4 overshoot to the next multiple.
        assert_eq!(report.final_scale, 12);
        assert_eq!(report.iterations, 3);
        assert_eq!(report.applied.entities, 12);
        assert_eq!(generator.storage().len(), 12);
    }

    #[test]
    fn generate_continues_with_larger_limit() {
        let mut generator = DataGenerator::new(people_only(2), MemoryStorage::new());
        generator.generate(8).expect("first");
        let report = generator.generate(16).expect("second");

        assert_eq!(report.iterations, 2);
        assert_eq!(report.final_scale, 16);
    }

    #[test]
    fn already_large_storage_returns_immediately() {
        let mut generator = DataGenerator::new(people_only(3), MemoryStorage::new());
        generator.generate(4).expect("first");
        let report = generator.generate(2).expect("second");

        assert_eq!(report.iterations, 0);
        assert_eq!(report.stop_reason, StopReason::ScaleReached);
    }

    #[test]
    fn empty_batches_end_as_idle() {
        let schema = SchemaBuilder::new(4)
            .entity(
                1.0,
                EntityStrategy::new("ghost", CountDistribution::constant(0)).expect("strategy"),
            )
            .expect("entity")
            .build()
            .expect("schema");
        let mut generator =
            DataGenerator::new(schema, MemoryStorage::new()).with_max_idle_iterations(5);
        let report = generator.generate(100).expect("generate");

        assert_eq!(report.stop_reason, StopReason::Idle);
        assert_eq!(report.iterations, 5);
        assert_eq!(report.idle_iterations, 5);
        assert_eq!(report.final_scale, 0);
    }

    #[test]
    fn iteration_bound_is_respected() {
        let mut generator =
            DataGenerator::new(people_only(5), MemoryStorage::new()).with_max_iterations(2);
        let report = generator.generate(1_000).expect("generate");

        assert_eq!(report.stop_reason, StopReason::IterationLimit);
        assert_eq!(report.final_scale, 8);
    }

    #[test]
    fn observer_sees_every_applied_instruction() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut generator = DataGenerator::new(people_only(6), MemoryStorage::new())
            .with_observer(move |id, instruction| {
                sink.borrow_mut().push((id, instruction.type_label().to_string()));
            });
        let report = generator.generate(8).expect("generate");

        let seen = seen.borrow();
        assert_eq!(seen.len() as u64, report.applied.total());
        assert!(seen.iter().all(|(_, label)| label == "person"));
        let ids: Vec<u64> = seen.iter().map(|(id, _)| id.0).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn social_network_grows_with_summary() {
        let schema = definitions::build("social_network", 11).expect("definition");
        let mut generator = DataGenerator::new(schema, MemoryStorage::new());
        let report = generator.generate(300).expect("generate");
        let report = report.with_summary(generator.summary());

        assert_eq!(report.stop_reason, StopReason::ScaleReached);
        let summary = report.summary.as_ref().expect("summary");
        assert_eq!(summary.total() as u64, report.final_scale);
        assert!(summary.entities > 0);
    }

    #[test]
    fn same_seed_same_run() {
        let run = |seed| {
            let schema = definitions::build("road_network", seed).expect("definition");
            let mut generator = DataGenerator::new(schema, MemoryStorage::new());
            let report = generator.generate(200).expect("generate");
            (report.applied, generator.summary())
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn report_serializes_stop_reason_in_snake_case() {
        let report = GenerationReport {
            iterations: 1,
            idle_iterations: 0,
            applied: InstructionCounts::default(),
            final_scale: 0,
            scale_limit: 1,
            stop_reason: StopReason::ScaleReached,
            summary: None,
        };
        assert_eq!(report.stop_reason.to_string(), "scale_reached");
        assert!(report.to_string().starts_with("stop=scale_reached"));
    }
}
