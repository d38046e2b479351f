//! # Concept Storage
//!
//! The live record of what has been generated so far.
//!
//! The engine only ever reads storage, through the [`ConceptStorage`] trait,
//! and only between batches does anything write to it (through
//! [`ConceptSink`]). Any backend that can answer these four questions can
//! drive the generators: a database-backed index, a cache, or the bundled
//! [`MemoryStorage`].
//!
//! All data structures in `MemoryStorage` use `BTreeMap` so that a seeded run
//! against it is reproducible.

use crate::{AttributeValue, ConceptId, ConceptKind, RoleBinding, SynthError};
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// STORAGE TRAITS
// =============================================================================

/// Read side of concept storage, as consumed by providers and scaling
/// distributions.
///
/// Implementations own any locking or transaction discipline. Errors are
/// handed back to the caller of the generator unmodified.
pub trait ConceptStorage {
    /// Number of stored concepts of the given type.
    fn count(&self, type_label: &str) -> Result<u64, SynthError>;

    /// The identifier at `offset` in the type's stable ordering.
    fn identifier_at(&self, type_label: &str, offset: u64) -> Result<ConceptId, SynthError>;

    /// Identifiers of `type_label` that do not currently play `role_label`
    /// in any relation of type `relation_label`.
    fn identifiers_not_playing_role(
        &self,
        type_label: &str,
        relation_label: &str,
        role_label: &str,
    ) -> Result<Vec<ConceptId>, SynthError>;

    /// The live scale of the dataset (total concept count).
    fn current_scale(&self) -> Result<u64, SynthError>;
}

/// Write side of concept storage, used to close the loop after a batch.
pub trait ConceptSink {
    /// Record a new entity and return its identifier.
    fn insert_entity(&mut self, type_label: &str) -> Result<ConceptId, SynthError>;

    /// Record a new attribute value and return its identifier.
    fn insert_attribute(
        &mut self,
        type_label: &str,
        value: AttributeValue,
    ) -> Result<ConceptId, SynthError>;

    /// Record a new relation and the roles its players now fill.
    fn insert_relation(
        &mut self,
        type_label: &str,
        role_bindings: &[RoleBinding],
    ) -> Result<ConceptId, SynthError>;
}

// =============================================================================
// MEMORY STORAGE
// =============================================================================

/// Kind and type of a stored concept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredConcept {
    /// Meta-type of the concept.
    pub kind: ConceptKind,
    /// Type label of the concept.
    pub type_label: String,
}

/// In-memory concept storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    /// Concept records: ConceptId -> kind and type
    concepts: BTreeMap<ConceptId, StoredConcept>,

    /// Per-type identifiers, in insertion order
    by_type: BTreeMap<String, Vec<ConceptId>>,

    /// Attribute values: ConceptId -> value
    values: BTreeMap<ConceptId, AttributeValue>,

    /// Relation role bindings: relation ConceptId -> bindings
    relations: BTreeMap<ConceptId, Vec<RoleBinding>>,

    /// Role participation: (relation type, role) -> players
    role_players: BTreeMap<(String, String), BTreeSet<ConceptId>>,

    /// Number of role slots each concept fills across all relations
    degree: BTreeMap<ConceptId, u64>,

    /// Next available ConceptId
    next_id: u64,
}

impl MemoryStorage {
    /// Create a new empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a concept's kind and type.
    #[must_use]
    pub fn concept(&self, id: ConceptId) -> Option<&StoredConcept> {
        self.concepts.get(&id)
    }

    /// The value of an attribute concept.
    #[must_use]
    pub fn value(&self, id: ConceptId) -> Option<&AttributeValue> {
        self.values.get(&id)
    }

    /// The role bindings of a relation concept.
    #[must_use]
    pub fn role_bindings(&self, id: ConceptId) -> Option<&[RoleBinding]> {
        self.relations.get(&id).map(Vec::as_slice)
    }

    /// Number of role slots the concept fills across all relations.
    #[must_use]
    pub fn degree(&self, id: ConceptId) -> u64 {
        self.degree.get(&id).copied().unwrap_or(0)
    }

    /// All concepts in identifier order.
    pub fn concepts(&self) -> impl Iterator<Item = (ConceptId, &StoredConcept)> + '_ {
        self.concepts.iter().map(|(id, c)| (*id, c))
    }

    /// Total number of stored concepts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    /// Whether nothing has been stored yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Number of stored concepts of the given kind.
    #[must_use]
    pub fn count_kind(&self, kind: ConceptKind) -> usize {
        self.concepts.values().filter(|c| c.kind == kind).count()
    }

    /// Total number of role slots filled across all relations.
    #[must_use]
    pub fn total_role_players(&self) -> u64 {
        self.relations.values().map(|b| b.len() as u64).sum()
    }

    /// Whether the concept has ever played the given role in the given
    /// relation type.
    #[must_use]
    pub fn plays_role(&self, id: ConceptId, relation_label: &str, role_label: &str) -> bool {
        self.role_players
            .get(&(relation_label.to_string(), role_label.to_string()))
            .is_some_and(|players| players.contains(&id))
    }

    fn record(&mut self, kind: ConceptKind, type_label: &str) -> ConceptId {
        let id = ConceptId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);

        self.concepts.insert(
            id,
            StoredConcept {
                kind,
                type_label: type_label.to_string(),
            },
        );
        self.by_type
            .entry(type_label.to_string())
            .or_default()
            .push(id);
        id
    }
}

impl ConceptStorage for MemoryStorage {
    fn count(&self, type_label: &str) -> Result<u64, SynthError> {
        Ok(self.by_type.get(type_label).map_or(0, |ids| ids.len() as u64))
    }

    fn identifier_at(&self, type_label: &str, offset: u64) -> Result<ConceptId, SynthError> {
        self.by_type
            .get(type_label)
            .and_then(|ids| usize::try_from(offset).ok().and_then(|o| ids.get(o)))
            .copied()
            .ok_or_else(|| {
                SynthError::Storage(format!(
                    "no {} concept at offset {}",
                    type_label, offset
                ))
            })
    }

    fn identifiers_not_playing_role(
        &self,
        type_label: &str,
        relation_label: &str,
        role_label: &str,
    ) -> Result<Vec<ConceptId>, SynthError> {
        let Some(ids) = self.by_type.get(type_label) else {
            return Ok(Vec::new());
        };
        let key = (relation_label.to_string(), role_label.to_string());
        let players = self.role_players.get(&key);

        Ok(ids
            .iter()
            .filter(|id| players.is_none_or(|p| !p.contains(*id)))
            .copied()
            .collect())
    }

    fn current_scale(&self) -> Result<u64, SynthError> {
        Ok(self.concepts.len() as u64)
    }
}

impl ConceptSink for MemoryStorage {
    fn insert_entity(&mut self, type_label: &str) -> Result<ConceptId, SynthError> {
        Ok(self.record(ConceptKind::Entity, type_label))
    }

    fn insert_attribute(
        &mut self,
        type_label: &str,
        value: AttributeValue,
    ) -> Result<ConceptId, SynthError> {
        let id = self.record(ConceptKind::Attribute, type_label);
        self.values.insert(id, value);
        Ok(id)
    }

    fn insert_relation(
        &mut self,
        type_label: &str,
        role_bindings: &[RoleBinding],
    ) -> Result<ConceptId, SynthError> {
        // All players must exist before anything is written
        if let Some(missing) = role_bindings
            .iter()
            .find(|b| !self.concepts.contains_key(&b.player))
        {
            return Err(SynthError::InvalidInstruction(format!(
                "role player {} of {} does not exist",
                missing.player, type_label
            )));
        }

        let id = self.record(ConceptKind::Relation, type_label);
        for binding in role_bindings {
            self.role_players
                .entry((type_label.to_string(), binding.role.clone()))
                .or_default()
                .insert(binding.player);
            let degree = self.degree.entry(binding.player).or_insert(0);
            *degree = degree.saturating_add(1);
        }
        self.relations.insert(id, role_bindings.to_vec());
        Ok(id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
