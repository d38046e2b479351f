//! # Storage Summary
//!
//! Counts that show whether a run is growing the structure it should:
//! how many concepts of each kind exist, how many role slots are filled, how
//! many concepts were never linked, and how concentrated the links are.
//!
//! These are progress indicators only. Graph-theoretic metrics such as
//! assortativity or transitivity are not computed here.

use crate::ConceptKind;
use crate::storage::MemoryStorage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Snapshot of a [`MemoryStorage`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSummary {
    /// Number of entities.
    pub entities: usize,
    /// Number of relations.
    pub relations: usize,
    /// Number of attributes.
    pub attributes: usize,
    /// Role slots filled across all relations.
    pub role_players: u64,
    /// Entities that fill no role in any relation.
    pub orphan_entities: usize,
    /// Attributes that fill no role in any relation.
    pub orphan_attributes: usize,
    /// Role players per relation (0 if no relations).
    pub mean_role_players: f64,
    /// Highest number of role slots filled by a single concept.
    pub max_degree: u64,
    /// Concept count per type label.
    pub per_type: BTreeMap<String, usize>,
}

impl StorageSummary {
    /// Summary of an empty storage.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Compute the summary of `storage`.
    #[must_use]
    pub fn from_storage(storage: &MemoryStorage) -> Self {
        let mut summary = Self::empty();

        for (id, concept) in storage.concepts() {
            *summary
                .per_type
                .entry(concept.type_label.clone())
                .or_insert(0) += 1;

            let degree = storage.degree(id);
            summary.max_degree = summary.max_degree.max(degree);

            match concept.kind {
                ConceptKind::Entity => {
                    summary.entities += 1;
                    if degree == 0 {
                        summary.orphan_entities += 1;
                    }
                }
                ConceptKind::Attribute => {
                    summary.attributes += 1;
                    if degree == 0 {
                        summary.orphan_attributes += 1;
                    }
                }
                ConceptKind::Relation => summary.relations += 1,
            }
        }

        summary.role_players = storage.total_role_players();
        summary.mean_role_players = if summary.relations > 0 {
            summary.role_players as f64 / summary.relations as f64
        } else {
            0.0
        };
        summary
    }

    /// Total concepts of all kinds.
    #[must_use]
    pub fn total(&self) -> usize {
        self.entities + self.relations + self.attributes
    }
}

impl fmt::Display for StorageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entities={} relations={} attributes={} role_players={} orphans={}/{} mean_roles={:.2} max_degree={}",
            self.entities,
            self.relations,
            self.attributes,
            self.role_players,
            self.orphan_entities,
            self.orphan_attributes,
            self.mean_role_players,
            self.max_degree
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================
