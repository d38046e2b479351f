//! # Property-Based Tests
//!
//! Sampling and batch invariants checked with proptest.
//!
//! These tests ensure reproducibility and the counting rules of the generators.

use growgraph_core::{
    CentralConceptProvider, ConceptId, ConceptProvider, ConceptSink, CountDistribution,
    DataGenerator, InfeasiblePolicy, MemoryStorage, RelationBatch, RelationStrategy,
    RolePlayerStrategy, SampleContext, SequenceConceptProvider, StorageConceptProvider,
    WeightedSampler, definitions,
};
use proptest::collection::vec;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn things(n: usize) -> MemoryStorage {
    let mut storage = MemoryStorage::new();
    for _ in 0..n {
        storage.insert_entity("thing").expect("insert");
    }
    storage
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// Draw frequencies converge to each weight's share of the total.
    #[test]
    fn sampler_frequencies_follow_weights(
        weights in vec(1u32..10, 1..6),
        seed in any::<u64>()
    ) {
        let mut sampler = WeightedSampler::new();
        for (i, w) in weights.iter().enumerate() {
            sampler.add(f64::from(*w), i).expect("add");
        }

        let draws = 20_000;
        let mut hits = vec![0u32; weights.len()];
        let mut rng = StdRng::seed_from_u64(seed);
        for _ in 0..draws {
            let i = *sampler.sample(&mut rng).expect("non-empty");
            hits[i] += 1;
        }

        let total: u32 = weights.iter().sum();
        for (w, h) in weights.iter().zip(&hits) {
            let expected = f64::from(*w) / f64::from(total);
            let observed = f64::from(*h) / f64::from(draws);
            prop_assert!((expected - observed).abs() < 0.02);
        }
    }

    /// Two identical schemas grow identical data from the same seed.
    #[test]
    fn same_seed_same_growth(
        seed in any::<u64>(),
        pick in 0usize..definitions::DEFINITIONS.len(),
    ) {
        let name = definitions::names().nth(pick).expect("definition");
        let run = || {
            let schema = definitions::build(name, seed).expect("schema");
            let mut generator = DataGenerator::new(schema, MemoryStorage::new());
            let report = generator.generate(150).expect("generate");
            (report.applied, generator.summary())
        };
        prop_assert_eq!(run(), run());
    }
}

proptest! {
    /// A constant distribution always yields its value, and a peek does not
    /// consume it.
    #[test]
    fn constant_distribution_is_constant(c in 0u64..10_000) {
        let storage = MemoryStorage::new();
        let mut rng = StdRng::seed_from_u64(c);
        let mut ctx = SampleContext::new(&mut rng, &storage);
        let mut dist = CountDistribution::constant(c);

        for _ in 0..5 {
            let peeked = dist.peek(&mut ctx).expect("peek");
            prop_assert_eq!(peeked, c);
            prop_assert_eq!(dist.sample(&mut ctx).expect("sample"), peeked);
        }
    }

    /// Central draws cycle through the cache; a reset starts a fresh cycle.
    #[test]
    fn central_provider_cycles_then_restarts(k in 1u64..8, m in 1usize..40) {
        let storage = MemoryStorage::new();
        let mut rng = StdRng::seed_from_u64(k);
        let mut ctx = SampleContext::new(&mut rng, &storage);

        let ids: Vec<ConceptId> = (0..2 * k).map(ConceptId).collect();
        let mut provider = CentralConceptProvider::new(
            CountDistribution::constant(k),
            Box::new(SequenceConceptProvider::new(ids.clone())),
        );

        let k = k as usize;
        for i in 0..m {
            prop_assert_eq!(provider.next(&mut ctx).expect("next"), ids[i % k]);
        }

        provider.reset_uniqueness();
        for i in 0..m {
            prop_assert_eq!(provider.next(&mut ctx).expect("next"), ids[k + i % k]);
        }
    }

    /// Every instance binds exactly `r1 + r2` players under a shared label.
    #[test]
    fn repeated_role_counts_add_up(r1 in 1u64..5, r2 in 1u64..5, target in 1u64..10) {
        let storage = things(3);
        let mut strategy = RelationStrategy::new(
            "meeting",
            CountDistribution::constant(target),
            vec![
                RolePlayerStrategy::new(
                    "attendee",
                    CountDistribution::constant(r1),
                    Box::new(StorageConceptProvider::new("thing")),
                ).expect("role"),
                RolePlayerStrategy::new(
                    "attendee",
                    CountDistribution::constant(r2),
                    Box::new(StorageConceptProvider::new("thing")),
                ).expect("role"),
            ],
        ).expect("relation");

        let mut rng = StdRng::seed_from_u64(target);
        let ctx = SampleContext::new(&mut rng, &storage);
        let out = RelationBatch::new(&mut strategy, ctx, InfeasiblePolicy::AbortBatch)
            .expect("batch")
            .collect::<Result<Vec<_>, _>>()
            .expect("instructions");

        prop_assert_eq!(out.len() as u64, target);
        for instruction in &out {
            prop_assert_eq!(instruction.role_count("attendee") as u64, r1 + r2);
        }
    }

    /// Emitted instances never exceed the target, and a starved provider
    /// ends the batch at the first instance it cannot fill.
    #[test]
    fn relation_output_is_a_prefix(pool in 0u64..20, per_instance in 1u64..4, target in 0u64..10) {
        let storage = MemoryStorage::new();
        let mut strategy = RelationStrategy::new(
            "group",
            CountDistribution::constant(target),
            vec![RolePlayerStrategy::new(
                "member",
                CountDistribution::constant(per_instance),
                Box::new(SequenceConceptProvider::new((0..pool).map(ConceptId).collect())),
            ).expect("role")],
        ).expect("relation");

        let mut rng = StdRng::seed_from_u64(pool);
        let ctx = SampleContext::new(&mut rng, &storage);
        let out = RelationBatch::new(&mut strategy, ctx, InfeasiblePolicy::AbortBatch)
            .expect("batch")
            .collect::<Result<Vec<_>, _>>()
            .expect("instructions");

        prop_assert_eq!(out.len() as u64, target.min(pool / per_instance));
    }
}
