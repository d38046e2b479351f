//! # Concept Providers
//!
//! Sources of existing concept identifiers for relation role players.
//!
//! A provider answers three questions against the live storage:
//! - `has_next`: can it hand out at least one identifier?
//! - `has_next_n(n)`: can it hand out `n` more without re-querying storage?
//! - `next`: the next identifier.
//!
//! `reset_uniqueness()` marks the start of a new relation batch. The relation
//! generator calls it on every role provider exactly once per batch; stateful
//! providers use it to take a fresh snapshot or a fresh hub set.

use crate::context::SampleContext;
use crate::distribution::CountDistribution;
use crate::{ConceptId, SynthError};
use rand::Rng;
use std::fmt;

// =============================================================================
// PROVIDER TRAIT
// =============================================================================

/// A stateful sequence over existing concept identifiers.
pub trait ConceptProvider: fmt::Debug {
    /// Whether at least one identifier is available.
    fn has_next(&mut self, ctx: &mut SampleContext<'_>) -> Result<bool, SynthError>;

    /// Whether `n` more identifiers are available.
    fn has_next_n(&mut self, n: u64, ctx: &mut SampleContext<'_>) -> Result<bool, SynthError>;

    /// The next identifier.
    ///
    /// Returns `SynthError::ProviderExhausted` if `has_next` would be false.
    fn next(&mut self, ctx: &mut SampleContext<'_>) -> Result<ConceptId, SynthError>;

    /// Start a new batch. Stateless providers ignore this.
    fn reset_uniqueness(&mut self) {}
}

// =============================================================================
// STORAGE-BACKED PROVIDER
// =============================================================================

/// Any stored concept of a type, drawn at a uniformly random offset.
///
/// Unbounded: the same identifier may recur.
#[derive(Debug, Clone)]
pub struct StorageConceptProvider {
    type_label: String,
}

impl StorageConceptProvider {
    /// Provider over all stored concepts of `type_label`.
    #[must_use]
    pub fn new(type_label: impl Into<String>) -> Self {
        Self {
            type_label: type_label.into(),
        }
    }
}

impl ConceptProvider for StorageConceptProvider {
    fn has_next(&mut self, ctx: &mut SampleContext<'_>) -> Result<bool, SynthError> {
        Ok(ctx.storage().count(&self.type_label)? > 0)
    }

    fn has_next_n(&mut self, n: u64, ctx: &mut SampleContext<'_>) -> Result<bool, SynthError> {
        Ok(n == 0 || self.has_next(ctx)?)
    }

    fn next(&mut self, ctx: &mut SampleContext<'_>) -> Result<ConceptId, SynthError> {
        let storage = ctx.storage();
        let count = storage.count(&self.type_label)?;
        if count == 0 {
            return Err(SynthError::ProviderExhausted(format!(
                "no stored {} concepts",
                self.type_label
            )));
        }
        let offset = ctx.rng().gen_range(0..count);
        storage.identifier_at(&self.type_label, offset)
    }
}

// =============================================================================
// NOT-IN-RELATION PROVIDER
// =============================================================================

/// Concepts of a type that do not yet play a role in a relation type.
///
/// The candidate set is a snapshot taken on first use after construction or
/// `reset_uniqueness()`; draws pick a uniformly random offset into it.
#[derive(Debug, Clone)]
pub struct NotInRelationProvider {
    type_label: String,
    relation_label: String,
    role_label: String,
    snapshot: Option<Vec<ConceptId>>,
}

impl NotInRelationProvider {
    /// Provider over `type_label` concepts not playing `role_label` in
    /// `relation_label`.
    #[must_use]
    pub fn new(
        type_label: impl Into<String>,
        relation_label: impl Into<String>,
        role_label: impl Into<String>,
    ) -> Self {
        Self {
            type_label: type_label.into(),
            relation_label: relation_label.into(),
            role_label: role_label.into(),
            snapshot: None,
        }
    }

    fn candidates(&mut self, ctx: &SampleContext<'_>) -> Result<&[ConceptId], SynthError> {
        if self.snapshot.is_none() {
            let ids = ctx.storage().identifiers_not_playing_role(
                &self.type_label,
                &self.relation_label,
                &self.role_label,
            )?;
            tracing::trace!(
                type_label = %self.type_label,
                relation = %self.relation_label,
                role = %self.role_label,
                candidates = ids.len(),
                "not-in-relation snapshot"
            );
            self.snapshot = Some(ids);
        }
        Ok(self.snapshot.as_deref().unwrap_or_default())
    }
}

impl ConceptProvider for NotInRelationProvider {
    fn has_next(&mut self, ctx: &mut SampleContext<'_>) -> Result<bool, SynthError> {
        Ok(!self.candidates(ctx)?.is_empty())
    }

    fn has_next_n(&mut self, n: u64, ctx: &mut SampleContext<'_>) -> Result<bool, SynthError> {
        Ok(self.candidates(ctx)?.len() as u64 >= n)
    }

    fn next(&mut self, ctx: &mut SampleContext<'_>) -> Result<ConceptId, SynthError> {
        let len = self.candidates(ctx)?.len();
        if len == 0 {
            return Err(SynthError::ProviderExhausted(format!(
                "every {} already plays {} in {}",
                self.type_label, self.role_label, self.relation_label
            )));
        }
        let offset = ctx.rng().gen_range(0..len);
        let candidates = self.candidates(ctx)?;
        candidates.get(offset).copied().ok_or_else(|| {
            SynthError::ProviderExhausted(format!("snapshot offset {} out of range", offset))
        })
    }

    fn reset_uniqueness(&mut self) {
        self.snapshot = None;
    }
}

// =============================================================================
// CENTRAL-CONCEPT PROVIDER
// =============================================================================

/// A small set of hub concepts, reused round-robin for a whole batch.
///
/// On first use after construction or `reset_uniqueness()` it samples `k` from
/// its distribution and, only if the inner provider can supply `k`, caches
/// that many identifiers. Otherwise the cache stays empty for the batch.
#[derive(Debug)]
pub struct CentralConceptProvider {
    inner: Box<dyn ConceptProvider>,
    central_count: CountDistribution,
    cache: Vec<ConceptId>,
    cursor: usize,
    needs_refill: bool,
}

impl CentralConceptProvider {
    /// Hubs drawn from `inner`, `central_count` of them per batch.
    #[must_use]
    pub fn new(central_count: CountDistribution, inner: Box<dyn ConceptProvider>) -> Self {
        Self {
            inner,
            central_count,
            cache: Vec::new(),
            cursor: 0,
            needs_refill: true,
        }
    }

    /// The hubs of the current batch, in hand-out order.
    #[must_use]
    pub fn central_concepts(&self) -> &[ConceptId] {
        &self.cache
    }

    fn ensure_filled(&mut self, ctx: &mut SampleContext<'_>) -> Result<(), SynthError> {
        if !self.needs_refill {
            return Ok(());
        }
        self.needs_refill = false;
        self.cache.clear();
        self.cursor = 0;

        let k = self.central_count.sample(ctx)?;
        if self.inner.has_next_n(k, ctx)? {
            let mut filled = 0;
            while filled < k && self.inner.has_next(ctx)? {
                let id = self.inner.next(ctx)?;
                self.cache.push(id);
                filled += 1;
            }
        }
        tracing::trace!(requested = k, filled = self.cache.len(), "central cache refill");
        Ok(())
    }
}

impl ConceptProvider for CentralConceptProvider {
    fn has_next(&mut self, ctx: &mut SampleContext<'_>) -> Result<bool, SynthError> {
        self.ensure_filled(ctx)?;
        Ok(!self.cache.is_empty())
    }

    /// Cyclic reuse never runs dry, so any `n` is satisfiable once the cache
    /// holds something.
    fn has_next_n(&mut self, _n: u64, ctx: &mut SampleContext<'_>) -> Result<bool, SynthError> {
        self.has_next(ctx)
    }

    fn next(&mut self, ctx: &mut SampleContext<'_>) -> Result<ConceptId, SynthError> {
        self.ensure_filled(ctx)?;
        let id = self
            .cache
            .get(self.cursor)
            .copied()
            .ok_or_else(|| SynthError::ProviderExhausted("central cache is empty".to_string()))?;
        self.cursor = (self.cursor + 1) % self.cache.len();
        Ok(id)
    }

    fn reset_uniqueness(&mut self) {
        self.needs_refill = true;
        self.inner.reset_uniqueness();
    }
}

// =============================================================================
// SEQUENCE PROVIDER
// =============================================================================

/// A fixed list of identifiers, each handed out once, in order.
#[derive(Debug, Clone)]
pub struct SequenceConceptProvider {
    ids: Vec<ConceptId>,
    position: usize,
}

impl SequenceConceptProvider {
    /// Provider over `ids`, in order.
    #[must_use]
    pub fn new(ids: Vec<ConceptId>) -> Self {
        Self { ids, position: 0 }
    }

    /// Identifiers not yet handed out.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.ids.len().saturating_sub(self.position)
    }
}

impl ConceptProvider for SequenceConceptProvider {
    fn has_next(&mut self, _ctx: &mut SampleContext<'_>) -> Result<bool, SynthError> {
        Ok(self.remaining() > 0)
    }

    fn has_next_n(&mut self, n: u64, _ctx: &mut SampleContext<'_>) -> Result<bool, SynthError> {
        Ok(self.remaining() as u64 >= n)
    }

    fn next(&mut self, _ctx: &mut SampleContext<'_>) -> Result<ConceptId, SynthError> {
        let id = self
            .ids
            .get(self.position)
            .copied()
            .ok_or_else(|| SynthError::ProviderExhausted("sequence consumed".to_string()))?;
        self.position += 1;
        Ok(id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
