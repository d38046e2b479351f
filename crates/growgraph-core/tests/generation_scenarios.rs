//! # Generation Scenario Tests (A-D)
//!
//! Batch termination under starved providers and dry value pools.
//!
//! ## Scenarios
//! - A: Relation batch bounded by a two-identifier provider
//! - B: Relation batch cut short after one instance
//! - C: Attribute batch ends when its values run out
//! - D: Entity batch with a zero target
//!
//! Plus the relation-batch invariants: no gaps after the first infeasible
//! instance, and repeated role labels accumulate their bindings. The last tier
//! checks that a storage failure reaches the caller unchanged.

use growgraph_core::{
    AttributeBatch, AttributeStrategy, AttributeValue, Batch, ConceptId, ConceptSink,
    ConceptStorage, CountDistribution, DataGenerator, EntityBatch, EntityStrategy, FixedValues,
    InfeasiblePolicy, Instruction, MemoryStorage, RelationBatch, RelationStrategy, RoleBinding,
    RolePlayerStrategy, SampleContext, SchemaBuilder, SequenceConceptProvider,
    StorageConceptProvider, SynthError, TypeStrategy,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn storage_with(type_label: &str, n: usize) -> MemoryStorage {
    let mut storage = MemoryStorage::new();
    for _ in 0..n {
        storage.insert_entity(type_label).expect("insert");
    }
    storage
}

fn sequence(ids: &[u64]) -> Box<SequenceConceptProvider> {
    Box::new(SequenceConceptProvider::new(
        ids.iter().copied().map(ConceptId).collect(),
    ))
}

/// Two single-slot roles: one from a fixed sequence, one from storage.
fn pair_relation(first: &[u64], target: u64) -> RelationStrategy {
    RelationStrategy::new(
        "pairing",
        CountDistribution::constant(target),
        vec![
            RolePlayerStrategy::new("left", CountDistribution::constant(1), sequence(first))
                .expect("role"),
            RolePlayerStrategy::new(
                "right",
                CountDistribution::constant(1),
                Box::new(StorageConceptProvider::new("thing")),
            )
            .expect("role"),
        ],
    )
    .expect("relation")
}

fn run_relation(
    strategy: &mut RelationStrategy,
    storage: &MemoryStorage,
    policy: InfeasiblePolicy,
) -> Vec<Instruction> {
    let mut rng = StdRng::seed_from_u64(42);
    let ctx = SampleContext::new(&mut rng, storage);
    RelationBatch::new(strategy, ctx, policy)
        .expect("batch")
        .collect::<Result<Vec<_>, _>>()
        .expect("instructions")
}

// =============================================================================
// SCENARIO A
// =============================================================================

mod scenario_a {
    use super::*;

    /// A.1: Target 2, two identifiers available: both instances are emitted.
    #[test]
    fn emits_exactly_the_target() {
        let storage = storage_with("thing", 5);
        let mut strategy = pair_relation(&[100, 101], 2);

        let out = run_relation(&mut strategy, &storage, InfeasiblePolicy::AbortBatch);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|i| i.role_count("left") == 1));
        assert!(out.iter().all(|i| i.role_count("right") == 1));
    }

    /// A.2: A larger target still stops once the first provider is dry.
    #[test]
    fn sequence_ends_when_provider_runs_dry() {
        let storage = storage_with("thing", 5);
        let mut strategy = pair_relation(&[100, 101], 5);

        let out = run_relation(&mut strategy, &storage, InfeasiblePolicy::AbortBatch);
        assert_eq!(out.len(), 2);
    }
}

// =============================================================================
// SCENARIO B
// =============================================================================

mod scenario_b {
    use super::*;

    /// B.1: A provider that satisfies one draw yields one instance.
    #[test]
    fn single_available_player_yields_one_instance() {
        let storage = storage_with("thing", 5);
        let mut strategy = pair_relation(&[100], 2);

        let out = run_relation(&mut strategy, &storage, InfeasiblePolicy::AbortBatch);
        assert_eq!(out.len(), 1);
        assert!(matches!(
            &out[0],
            Instruction::Relation { role_bindings, .. } if role_bindings[0].player == ConceptId(100)
        ));
    }
}

// =============================================================================
// SCENARIO C
// =============================================================================

mod scenario_c {
    use super::*;

    /// C.1: Target 3 with two values available gives two attributes.
    #[test]
    fn attribute_batch_stops_when_values_run_out() {
        let storage = MemoryStorage::new();
        let mut strategy = AttributeStrategy::new(
            "colour",
            CountDistribution::constant(3),
            Box::new(FixedValues::new(vec![
                AttributeValue::String("red".to_string()),
                AttributeValue::String("blue".to_string()),
            ])),
        )
        .expect("strategy");

        let mut rng = StdRng::seed_from_u64(1);
        let ctx = SampleContext::new(&mut rng, &storage);
        let batch = AttributeBatch::new(&mut strategy, ctx).expect("batch");
        assert_eq!(batch.target(), 3);

        let out = batch.collect::<Result<Vec<_>, _>>().expect("instructions");
        assert_eq!(out.len(), 2);
    }
}

// =============================================================================
// SCENARIO D
// =============================================================================

mod scenario_d {
    use super::*;

    /// D.1: A zero target means no entity instructions at all.
    #[test]
    fn zero_target_entity_batch_is_empty() {
        let storage = MemoryStorage::new();
        let mut strategy =
            EntityStrategy::new("person", CountDistribution::constant(0)).expect("strategy");

        let mut rng = StdRng::seed_from_u64(1);
        let mut ctx = SampleContext::new(&mut rng, &storage);
        let mut batch = EntityBatch::new(&mut strategy, &mut ctx).expect("batch");

        assert!(!batch.has_next());
        assert!(batch.next().is_none());
    }
}

// =============================================================================
// RELATION BATCH INVARIANTS
// =============================================================================

mod relation_invariants {
    use super::*;

    /// Nothing is emitted after the first infeasible instance, even if the
    /// starved role could be filled again later.
    #[test]
    fn no_gaps_after_first_infeasible_instance() {
        let storage = storage_with("thing", 3);
        // Three players, but each instance wants two: one instance, then dry.
        let mut strategy = RelationStrategy::new(
            "grouping",
            CountDistribution::constant(10),
            vec![
                RolePlayerStrategy::new(
                    "member",
                    CountDistribution::constant(2),
                    sequence(&[1, 2, 3]),
                )
                .expect("role"),
            ],
        )
        .expect("relation");

        let mut rng = StdRng::seed_from_u64(3);
        let ctx = SampleContext::new(&mut rng, &storage);
        let mut batch =
            RelationBatch::new(&mut strategy, ctx, InfeasiblePolicy::AbortBatch).expect("batch");

        assert!(batch.next().is_some());
        assert!(batch.next().is_none());
        assert!(batch.next().is_none());
        assert_eq!(batch.emitted(), 1);
        assert!(batch.emitted() <= batch.target());
    }

    /// Two role-player strategies on the same label add up.
    #[test]
    fn repeated_role_label_accumulates_bindings() {
        let storage = storage_with("thing", 4);
        let mut strategy = RelationStrategy::new(
            "gathering",
            CountDistribution::constant(6),
            vec![
                RolePlayerStrategy::new(
                    "guest",
                    CountDistribution::constant(2),
                    Box::new(StorageConceptProvider::new("thing")),
                )
                .expect("role"),
                RolePlayerStrategy::new(
                    "guest",
                    CountDistribution::constant(3),
                    Box::new(StorageConceptProvider::new("thing")),
                )
                .expect("role"),
            ],
        )
        .expect("relation");

        let out = run_relation(&mut strategy, &storage, InfeasiblePolicy::AbortBatch);
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|i| i.role_count("guest") == 5));
    }

    /// A relation with a single filled slot is a valid instance.
    #[test]
    fn unary_relation_is_emitted() {
        let storage = storage_with("thing", 1);
        let mut strategy = RelationStrategy::new(
            "self-loop",
            CountDistribution::constant(2),
            vec![
                RolePlayerStrategy::new(
                    "self",
                    CountDistribution::constant(1),
                    Box::new(StorageConceptProvider::new("thing")),
                )
                .expect("role"),
            ],
        )
        .expect("relation");

        let out = run_relation(&mut strategy, &storage, InfeasiblePolicy::AbortBatch);
        assert_eq!(out.len(), 2);
        assert!(out.iter().all(|i| i.role_count("self") == 1));
    }

    /// Skipping an infeasible instance still never exceeds the target.
    #[test]
    fn skip_policy_stays_within_target() {
        let storage = storage_with("thing", 5);
        let mut strategy = pair_relation(&[100], 4);

        let out = run_relation(&mut strategy, &storage, InfeasiblePolicy::SkipInstance);
        assert_eq!(out.len(), 1);
    }
}

// =============================================================================
// STORAGE FAILURES
// =============================================================================

mod storage_failures {
    use super::*;

    /// Storage whose lookups fail. The scale is readable so a driver gets as
    /// far as its first batch.
    struct UnreachableStorage;

    fn down() -> SynthError {
        SynthError::Storage("down".to_string())
    }

    impl ConceptStorage for UnreachableStorage {
        fn count(&self, _type_label: &str) -> Result<u64, SynthError> {
            Err(down())
        }

        fn identifier_at(&self, _type_label: &str, _offset: u64) -> Result<ConceptId, SynthError> {
            Err(down())
        }

        fn identifiers_not_playing_role(
            &self,
            _type_label: &str,
            _relation_label: &str,
            _role_label: &str,
        ) -> Result<Vec<ConceptId>, SynthError> {
            Err(down())
        }

        fn current_scale(&self) -> Result<u64, SynthError> {
            Ok(0)
        }
    }

    impl ConceptSink for UnreachableStorage {
        fn insert_entity(&mut self, _type_label: &str) -> Result<ConceptId, SynthError> {
            Err(down())
        }

        fn insert_attribute(
            &mut self,
            _type_label: &str,
            _value: AttributeValue,
        ) -> Result<ConceptId, SynthError> {
            Err(down())
        }

        fn insert_relation(
            &mut self,
            _type_label: &str,
            _role_bindings: &[RoleBinding],
        ) -> Result<ConceptId, SynthError> {
            Err(down())
        }
    }

    fn linking() -> RelationStrategy {
        RelationStrategy::new(
            "link",
            CountDistribution::constant(3),
            vec![
                RolePlayerStrategy::new(
                    "end",
                    CountDistribution::constant(1),
                    Box::new(StorageConceptProvider::new("thing")),
                )
                .expect("role"),
            ],
        )
        .expect("relation")
    }

    fn is_down(err: &SynthError) -> bool {
        matches!(err, SynthError::Storage(msg) if msg == "down")
    }

    /// E.1: A relation batch yields the storage error once, then ends.
    #[test]
    fn relation_batch_yields_error_then_ends() {
        let storage = UnreachableStorage;
        let mut rng = StdRng::seed_from_u64(1);
        let ctx = SampleContext::new(&mut rng, &storage);
        let mut strategy = linking();

        let out: Vec<_> = RelationBatch::new(&mut strategy, ctx, InfeasiblePolicy::SkipInstance)
            .expect("batch")
            .collect();
        assert_eq!(out.len(), 1);
        assert!(out[0].as_ref().is_err_and(is_down));
    }

    /// E.2: Dispatch through `Batch` keeps the error intact.
    #[test]
    fn batch_dispatch_passes_error_through() {
        let storage = UnreachableStorage;
        let mut rng = StdRng::seed_from_u64(1);
        let ctx = SampleContext::new(&mut rng, &storage);
        let mut strategy = TypeStrategy::Relation(linking());

        let mut batch =
            Batch::new(&mut strategy, ctx, InfeasiblePolicy::AbortBatch).expect("batch");
        assert!(batch.next().expect("one item").is_err_and(|e| is_down(&e)));
        assert!(batch.next().is_none());
    }

    /// E.3: The driver stops with the storage error instead of a report.
    #[test]
    fn driver_stops_with_storage_error() {
        let schema = SchemaBuilder::new(0)
            .relation(1.0, linking())
            .expect("relation")
            .build()
            .expect("schema");
        let mut generator = DataGenerator::new(schema, UnreachableStorage);

        let result = generator.generate(10);
        assert!(result.is_err_and(|e| is_down(&e)));
    }
}
