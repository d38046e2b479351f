//! # Type Strategies
//!
//! Declarative bundles describing what to generate for one type:
//! - `EntityStrategy`: type label and instance count
//! - `AttributeStrategy`: type label, instance count, value provider and an
//!   optional owner binding
//! - `RelationStrategy`: type label, instance count and one or more
//!   `RolePlayerStrategy` entries
//!
//! Strategies hold no behavior beyond validation and accessors; the instance
//! generators interpret them. Only the cursor state inside their providers
//! changes during a run.

use crate::distribution::CountDistribution;
use crate::primitives::{MAX_LABEL_LENGTH, OWNERSHIP_PREFIX};
use crate::provider::{ConceptProvider, NotInRelationProvider, StorageConceptProvider};
use crate::values::ValueProvider;
use crate::{ConceptKind, SynthError};

/// Reject empty and over-long labels.
fn check_label(what: &str, label: &str) -> Result<(), SynthError> {
    if label.is_empty() {
        return Err(SynthError::InvalidStrategy(format!("{} label is empty", what)));
    }
    if label.len() > MAX_LABEL_LENGTH {
        return Err(SynthError::InvalidStrategy(format!(
            "{} label exceeds {} bytes",
            what, MAX_LABEL_LENGTH
        )));
    }
    Ok(())
}

// =============================================================================
// ENTITY
// =============================================================================

/// How many entities of one type to create per batch.
#[derive(Debug)]
pub struct EntityStrategy {
    pub(crate) type_label: String,
    pub(crate) count: CountDistribution,
}

impl EntityStrategy {
    pub fn new(
        type_label: impl Into<String>,
        count: CountDistribution,
    ) -> Result<Self, SynthError> {
        let type_label = type_label.into();
        check_label("entity type", &type_label)?;
        Ok(Self { type_label, count })
    }

    #[must_use]
    pub fn type_label(&self) -> &str {
        &self.type_label
    }
}

// =============================================================================
// ATTRIBUTE
// =============================================================================

/// Binds an attribute type to the entity type that owns its values.
#[derive(Debug, Clone)]
pub struct AttributeOwnership {
    /// Type label of the owner.
    pub owner_type: String,
    /// Instance count of the implicit ownership relation.
    pub count: CountDistribution,
}

/// How many attribute values of one type to create per batch, and where the
/// values come from.
#[derive(Debug)]
pub struct AttributeStrategy {
    pub(crate) type_label: String,
    pub(crate) count: CountDistribution,
    pub(crate) values: Box<dyn ValueProvider>,
    ownership: Option<AttributeOwnership>,
}

impl AttributeStrategy {
    pub fn new(
        type_label: impl Into<String>,
        count: CountDistribution,
        values: Box<dyn ValueProvider>,
    ) -> Result<Self, SynthError> {
        let type_label = type_label.into();
        check_label("attribute type", &type_label)?;
        Ok(Self {
            type_label,
            count,
            values,
            ownership: None,
        })
    }

    /// Declare that `owner_type` concepts own these values.
    ///
    /// `count` is the instance count of the implicit `@has-<attribute>`
    /// relation a schema builder registers alongside this strategy.
    pub fn owned_by(
        mut self,
        owner_type: impl Into<String>,
        count: CountDistribution,
    ) -> Result<Self, SynthError> {
        let owner_type = owner_type.into();
        check_label("owner type", &owner_type)?;
        self.ownership = Some(AttributeOwnership { owner_type, count });
        Ok(self)
    }

    #[must_use]
    pub fn type_label(&self) -> &str {
        &self.type_label
    }

    #[must_use]
    pub fn ownership(&self) -> Option<&AttributeOwnership> {
        self.ownership.as_ref()
    }

    /// Label of the implicit ownership relation, e.g. `@has-name`.
    #[must_use]
    pub fn ownership_label(&self) -> String {
        format!("{}{}", OWNERSHIP_PREFIX, self.type_label)
    }

    /// The implicit ownership relation, if this attribute has an owner.
    ///
    /// Owners are any stored `owner_type` concept; values are attribute
    /// concepts not owned through this relation when the batch starts. One
    /// batch may bind the same value more than once.
    pub fn ownership_relation(&self) -> Result<Option<RelationStrategy>, SynthError> {
        let Some(ownership) = &self.ownership else {
            return Ok(None);
        };

        let relation = self.ownership_label();
        let owner_role = format!("{}-owner", relation);
        let value_role = format!("{}-value", relation);

        let owner = RolePlayerStrategy::new(
            owner_role,
            CountDistribution::constant(1),
            Box::new(StorageConceptProvider::new(ownership.owner_type.clone())),
        )?;
        let value = RolePlayerStrategy::new(
            value_role.clone(),
            CountDistribution::constant(1),
            Box::new(NotInRelationProvider::new(
                self.type_label.clone(),
                relation.clone(),
                value_role,
            )),
        )?;

        RelationStrategy::new(relation, ownership.count.clone(), vec![owner, value]).map(Some)
    }
}

// =============================================================================
// RELATION
// =============================================================================

/// How one role of a relation is filled: the role label, how many players
/// per relation instance, and where they come from.
#[derive(Debug)]
pub struct RolePlayerStrategy {
    pub(crate) role_label: String,
    pub(crate) count: CountDistribution,
    pub(crate) provider: Box<dyn ConceptProvider>,
}

impl RolePlayerStrategy {
    pub fn new(
        role_label: impl Into<String>,
        count: CountDistribution,
        provider: Box<dyn ConceptProvider>,
    ) -> Result<Self, SynthError> {
        let role_label = role_label.into();
        check_label("role", &role_label)?;
        Ok(Self {
            role_label,
            count,
            provider,
        })
    }

    #[must_use]
    pub fn role_label(&self) -> &str {
        &self.role_label
    }
}

/// How many relations of one type to create per batch, and how each role is
/// filled.
///
/// The same role label may appear in several role-player strategies; each
/// instance then carries the bindings of all of them under that label.
#[derive(Debug)]
pub struct RelationStrategy {
    pub(crate) type_label: String,
    pub(crate) count: CountDistribution,
    pub(crate) role_players: Vec<RolePlayerStrategy>,
}

impl RelationStrategy {
    /// Returns `SynthError::InvalidStrategy` when `role_players` is empty.
    pub fn new(
        type_label: impl Into<String>,
        count: CountDistribution,
        role_players: Vec<RolePlayerStrategy>,
    ) -> Result<Self, SynthError> {
        let type_label = type_label.into();
        check_label("relation type", &type_label)?;
        if role_players.is_empty() {
            return Err(SynthError::InvalidStrategy(format!(
                "relation {} has no role-player strategies",
                type_label
            )));
        }
        Ok(Self {
            type_label,
            count,
            role_players,
        })
    }

    #[must_use]
    pub fn type_label(&self) -> &str {
        &self.type_label
    }

    #[must_use]
    pub fn role_players(&self) -> &[RolePlayerStrategy] {
        &self.role_players
    }
}

// =============================================================================
// TYPE STRATEGY
// =============================================================================

/// One sampled unit of work: a strategy of any kind.
#[derive(Debug)]
pub enum TypeStrategy {
    Entity(EntityStrategy),
    Attribute(AttributeStrategy),
    Relation(RelationStrategy),
}

impl TypeStrategy {
    #[must_use]
    pub fn type_label(&self) -> &str {
        match self {
            TypeStrategy::Entity(s) => s.type_label(),
            TypeStrategy::Attribute(s) => s.type_label(),
            TypeStrategy::Relation(s) => s.type_label(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ConceptKind {
        match self {
            TypeStrategy::Entity(_) => ConceptKind::Entity,
            TypeStrategy::Attribute(_) => ConceptKind::Attribute,
            TypeStrategy::Relation(_) => ConceptKind::Relation,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
