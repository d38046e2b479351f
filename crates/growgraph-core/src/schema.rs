//! # Schema Definition
//!
//! Assembles type strategies into category pools behind a two-level
//! weighted sampler: first a category (entity, relation, attribute), then a
//! strategy within it.
//!
//! The definition owns the run's only random source, seeded once. Every
//! sampler, distribution and provider draw of a run goes through it.

use crate::context::SampleContext;
use crate::generator::{Batch, InfeasiblePolicy};
use crate::sampler::WeightedSampler;
use crate::storage::ConceptStorage;
use crate::strategy::{AttributeStrategy, EntityStrategy, RelationStrategy, TypeStrategy};
use crate::values::KeyCounter;
use crate::{ConceptKind, SynthError};
use rand::SeedableRng;
use rand::rngs::StdRng;

// =============================================================================
// BUILDER
// =============================================================================

/// Collects strategies and category weights for a [`SchemaDefinition`].
#[derive(Debug)]
pub struct SchemaBuilder {
    seed: u64,
    entities: WeightedSampler<TypeStrategy>,
    relations: WeightedSampler<TypeStrategy>,
    attributes: WeightedSampler<TypeStrategy>,
    /// Entity, relation, attribute.
    category_weights: [f64; 3],
    policy: InfeasiblePolicy,
    key_counter: KeyCounter,
}

impl SchemaBuilder {
    /// Start a schema whose run is seeded with `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            entities: WeightedSampler::new(),
            relations: WeightedSampler::new(),
            attributes: WeightedSampler::new(),
            category_weights: [1.0; 3],
            policy: InfeasiblePolicy::default(),
            key_counter: KeyCounter::new(),
        }
    }

    /// The schema's shared key counter, for strategies that need
    /// run-wide unique keys.
    #[must_use]
    pub fn key_counter(&self) -> KeyCounter {
        self.key_counter.clone()
    }

    pub fn entity(mut self, weight: f64, strategy: EntityStrategy) -> Result<Self, SynthError> {
        self.entities.add(weight, TypeStrategy::Entity(strategy))?;
        Ok(self)
    }

    /// Add an attribute strategy. An owned attribute also registers its
    /// implicit `@has-<attribute>` relation, with the same weight, in the
    /// relation pool.
    pub fn attribute(
        mut self,
        weight: f64,
        strategy: AttributeStrategy,
    ) -> Result<Self, SynthError> {
        let ownership = strategy.ownership_relation()?;
        self.attributes.add(weight, TypeStrategy::Attribute(strategy))?;
        if let Some(relation) = ownership {
            self.relations.add(weight, TypeStrategy::Relation(relation))?;
        }
        Ok(self)
    }

    pub fn relation(mut self, weight: f64, strategy: RelationStrategy) -> Result<Self, SynthError> {
        self.relations.add(weight, TypeStrategy::Relation(strategy))?;
        Ok(self)
    }

    /// Outer sampler weights. Defaults to 1.0 each.
    #[must_use]
    pub fn category_weights(mut self, entity: f64, relation: f64, attribute: f64) -> Self {
        self.category_weights = [entity, relation, attribute];
        self
    }

    #[must_use]
    pub fn infeasible_policy(mut self, policy: InfeasiblePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Assemble the definition. Empty pools are left out of the outer
    /// sampler; no strategies at all is `SynthError::EmptySchema`.
    pub fn build(self) -> Result<SchemaDefinition, SynthError> {
        let [entity_weight, relation_weight, attribute_weight] = self.category_weights;
        let pools = [
            (ConceptKind::Entity, entity_weight, self.entities),
            (ConceptKind::Relation, relation_weight, self.relations),
            (ConceptKind::Attribute, attribute_weight, self.attributes),
        ];

        let mut categories = WeightedSampler::new();
        for (kind, weight, pool) in pools {
            if pool.is_empty() {
                continue;
            }
            tracing::debug!(%kind, weight, strategies = pool.len(), "category pool");
            categories.add(weight, pool)?;
        }
        if categories.is_empty() {
            return Err(SynthError::EmptySchema);
        }

        Ok(SchemaDefinition {
            rng: StdRng::seed_from_u64(self.seed),
            categories,
            policy: self.policy,
            key_counter: self.key_counter,
        })
    }
}

// =============================================================================
// DEFINITION
// =============================================================================

/// A complete, seeded generation schema.
#[derive(Debug)]
pub struct SchemaDefinition {
    rng: StdRng,
    categories: WeightedSampler<WeightedSampler<TypeStrategy>>,
    policy: InfeasiblePolicy,
    key_counter: KeyCounter,
}

fn pick<'s>(
    categories: &'s mut WeightedSampler<WeightedSampler<TypeStrategy>>,
    rng: &mut StdRng,
) -> Result<&'s mut TypeStrategy, SynthError> {
    categories
        .sample_mut(rng)
        .and_then(|pool| pool.sample_mut(rng))
        .ok_or(SynthError::EmptySchema)
}

impl SchemaDefinition {
    /// Draw the strategy to act on next: a category, then a strategy in it.
    pub fn sample_next_strategy(&mut self) -> Result<&mut TypeStrategy, SynthError> {
        pick(&mut self.categories, &mut self.rng)
    }

    /// Draw the next strategy and start its batch against `storage`.
    pub fn next_batch<'s>(
        &'s mut self,
        storage: &'s dyn ConceptStorage,
    ) -> Result<Batch<'s>, SynthError> {
        let Self {
            rng,
            categories,
            policy,
            ..
        } = self;
        let strategy = pick(categories, rng)?;
        tracing::trace!(
            kind = %strategy.kind(),
            type_label = strategy.type_label(),
            "sampled strategy"
        );
        Batch::new(strategy, SampleContext::new(rng, storage), *policy)
    }

    /// Total number of registered strategies across all categories.
    #[must_use]
    pub fn strategy_count(&self) -> usize {
        self.categories.iter().map(|(_, pool)| pool.len()).sum()
    }

    /// Kind and label of every registered strategy, by category.
    #[must_use]
    pub fn strategy_labels(&self) -> Vec<(ConceptKind, String)> {
        self.categories
            .iter()
            .flat_map(|(_, pool)| pool.iter())
            .map(|(_, strategy)| (strategy.kind(), strategy.type_label().to_string()))
            .collect()
    }

    #[must_use]
    pub fn infeasible_policy(&self) -> InfeasiblePolicy {
        self.policy
    }

    pub fn set_infeasible_policy(&mut self, policy: InfeasiblePolicy) {
        self.policy = policy;
    }

    /// The shared key counter handed to strategies at build time.
    #[must_use]
    pub fn key_counter(&self) -> &KeyCounter {
        &self.key_counter
    }
}

// =============================================================================
// TESTS
// =============================================================================
