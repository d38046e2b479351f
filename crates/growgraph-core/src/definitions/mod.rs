//! # Built-in Definitions
//!
//! Ready-made schema definitions, looked up by name.
//!
//! | Name | Shape |
//! |------|-------|
//! | `social_network` | people, pages, friendships and likes |
//! | `road_network` | roads joined by intersections around hub roads |
//! | `generic_uniform_network` | three shapes, interactions and ownership hubs |
//! | `attributes` | attribute values only, one per value provider |
//! | `biochemical_network` | chemicals and enzymes in ever wider interactions |
//! | `financial` | traders bound by transactions that own quantities |

mod attributes;
mod biochemical_network;
mod financial;
mod generic_uniform;
mod road_network;
mod social_network;

use crate::SynthError;
use crate::distribution::CountDistribution;
use crate::provider::{CentralConceptProvider, NotInRelationProvider, StorageConceptProvider};
use crate::schema::SchemaDefinition;
use crate::strategy::RolePlayerStrategy;

/// Name and one-line description of every built-in definition.
pub const DEFINITIONS: [(&str, &str); 6] = [
    (
        "social_network",
        "people and pages; heavy-tailed friendships, likes, owned names",
    ),
    (
        "road_network",
        "roads joined at intersections around a rotating set of hub roads",
    ),
    (
        "generic_uniform_network",
        "blobs, squares and circles with interactions, ownership and sizing hubs",
    ),
    (
        "attributes",
        "attribute values only, exercising every value provider",
    ),
    (
        "biochemical_network",
        "chemicals and enzymes; interactions widen as the network grows",
    ),
    (
        "financial",
        "traders joined by transactions, each owning one quantity",
    ),
];

/// Names of every built-in definition.
pub fn names() -> impl Iterator<Item = &'static str> {
    DEFINITIONS.iter().map(|(name, _)| *name)
}

/// Whether `name` is a built-in definition.
#[must_use]
pub fn is_known(name: &str) -> bool {
    names().any(|n| n == name)
}

/// Build the named definition, seeded with `seed`.
pub fn build(name: &str, seed: u64) -> Result<SchemaDefinition, SynthError> {
    match name {
        "social_network" => social_network::definition(seed),
        "road_network" => road_network::definition(seed),
        "generic_uniform_network" => generic_uniform::definition(seed),
        "attributes" => attributes::definition(seed),
        "biochemical_network" => biochemical_network::definition(seed),
        "financial" => financial::definition(seed),
        other => Err(SynthError::UnknownDefinition(other.to_string())),
    }
}

// =============================================================================
// ROLE HELPERS
// =============================================================================

/// A role filled from any stored concept of `type_label`.
fn storage_role(
    role: &str,
    type_label: &str,
    count: CountDistribution,
) -> Result<RolePlayerStrategy, SynthError> {
    RolePlayerStrategy::new(role, count, Box::new(StorageConceptProvider::new(type_label)))
}

/// A single player of `type_label` that does not yet play `role` in
/// `relation`.
fn unowned_role(
    role: &str,
    type_label: &str,
    relation: &str,
) -> Result<RolePlayerStrategy, SynthError> {
    RolePlayerStrategy::new(
        role,
        CountDistribution::constant(1),
        Box::new(NotInRelationProvider::new(type_label, relation, role)),
    )
}

/// A role filled once per instance from `hubs` central concepts of
/// `type_label` that do not yet play `role` in `relation`.
fn hub_role(
    role: &str,
    type_label: &str,
    relation: &str,
    hubs: CountDistribution,
) -> Result<RolePlayerStrategy, SynthError> {
    let candidates = NotInRelationProvider::new(type_label, relation, role);
    RolePlayerStrategy::new(
        role,
        CountDistribution::constant(1),
        Box::new(CentralConceptProvider::new(hubs, Box::new(candidates))),
    )
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ConceptKind;
    use crate::driver::{DataGenerator, StopReason};
    use crate::storage::{ConceptStorage, MemoryStorage};

    #[test]
    fn every_listed_definition_builds() {
        for name in names() {
            let schema = build(name, 7).expect(name);
            assert!(schema.strategy_count() > 0, "{name} has no strategies");
        }
    }

    #[test]
    fn unknown_definition_is_reported() {
        let result = build("lattice", 0);
        assert!(matches!(result, Err(SynthError::UnknownDefinition(n)) if n == "lattice"));
        assert!(!is_known("lattice"));
        assert!(is_known("road_network"));
        assert!(is_known("financial"));
    }

    fn grow(name: &str, seed: u64, scale: u64) -> DataGenerator<MemoryStorage> {
        let schema = build(name, seed).expect(name);
        let mut generator = DataGenerator::new(schema, MemoryStorage::new());
        let report = generator.generate(scale).expect("generate");
        assert_eq!(report.stop_reason, StopReason::ScaleReached, "{name}");
        generator
    }

    #[test]
    fn biochemical_network_binds_ids_to_both_owners() {
        let generator = grow("biochemical_network", 3, 1_500);
        let storage = generator.storage();

        for type_label in ["chemical", "enzyme", "biochem-id", "@has-biochem-id"] {
            assert!(storage.count(type_label).expect("count") > 0, "no {type_label}");
        }
    }

    #[test]
    fn financial_grows_traders_with_the_dataset() {
        let generator = grow("financial", 3, 400);
        let storage = generator.storage();

        assert!(storage.count("quantity").expect("count") > 0);
        assert!(storage.count("trader").expect("count") > 0);
    }

    #[test]
    fn attributes_definition_has_only_attributes() {
        let schema = build("attributes", 0).expect("attributes");
        assert!(
            schema
                .strategy_labels()
                .iter()
                .all(|(kind, _)| *kind == ConceptKind::Attribute)
        );
    }
}
