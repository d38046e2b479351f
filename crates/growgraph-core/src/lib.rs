//! # growgraph-core
//!
//! The schema-driven synthetic graph data engine for Growgraph - THE LOGIC.
//!
//! A generation schema is a weighted set of type strategies. Each step samples
//! a strategy, asks it how many instances to make, and yields plain
//! [`Instruction`] values describing entities, attributes, and relations to
//! insert. Relations pick their role players from concepts already stored, so
//! the graph grows out of what it has already become.
//!
//! ## Architectural Constraints
//!
//! - The engine produces instructions; it never writes to a database itself
//! - Every random draw goes through one seeded generator owned by the schema
//! - Storage is only read while a batch is being generated
//! - Has NO async, NO network dependencies (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod context;
pub mod definitions;
pub mod distribution;
pub mod driver;
pub mod generator;
pub mod ingestor;
pub mod primitives;
pub mod provider;
pub mod sampler;
pub mod schema;
pub mod storage;
pub mod strategy;
pub mod system;
pub mod types;
pub mod values;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{AttributeValue, ConceptId, ConceptKind, Instruction, RoleBinding, SynthError};

// =============================================================================
// RE-EXPORTS: Generation Engine
// =============================================================================

pub use context::SampleContext;
pub use distribution::CountDistribution;
pub use driver::{DataGenerator, GenerationReport, InstructionCounts, StopReason};
pub use generator::{AttributeBatch, Batch, EntityBatch, InfeasiblePolicy, RelationBatch};
pub use ingestor::Ingestor;
pub use provider::{
    CentralConceptProvider, ConceptProvider, NotInRelationProvider, SequenceConceptProvider,
    StorageConceptProvider,
};
pub use sampler::WeightedSampler;
pub use schema::{SchemaBuilder, SchemaDefinition};
pub use storage::{ConceptSink, ConceptStorage, MemoryStorage};
pub use strategy::{
    AttributeStrategy, EntityStrategy, RelationStrategy, RolePlayerStrategy, TypeStrategy,
};
pub use values::{
    BooleanValues, CountingValues, FixedValues, KeyCounter, RandomStrings, ScalingGaussianValues,
    ValueProvider,
};

// =============================================================================
// RE-EXPORTS: System (from system module)
// =============================================================================

pub use system::StorageSummary;
