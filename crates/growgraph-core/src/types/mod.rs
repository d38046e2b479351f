//! # Core Type Definitions
//!
//! This module contains the data shapes shared by every part of the engine:
//! - Concept identifiers (`ConceptId`) and concept kinds (`ConceptKind`)
//! - Typed attribute values (`AttributeValue`)
//! - The instructions the generators produce (`Instruction`, `RoleBinding`)
//! - Error types (`SynthError`)
//!
//! Instructions are opaque data to the engine. Turning them into statements
//! for a concrete database, and recording the result, is the caller's job.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

// =============================================================================
// CONCEPT IDENTIFIERS
// =============================================================================

/// Identifier of a concept that already exists in concept storage.
///
/// Identifiers are handed out by the storage backend; the engine only ever
/// reads them back through concept providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConceptId(pub u64);

impl ConceptId {
    /// Get the raw identifier value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConceptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}

/// The three meta-types a generated concept can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptKind {
    /// A standalone typed thing.
    Entity,
    /// A typed value.
    Attribute,
    /// A typed link between role players.
    Relation,
}

impl ConceptKind {
    /// Lowercase name of the kind.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ConceptKind::Entity => "entity",
            ConceptKind::Attribute => "attribute",
            ConceptKind::Relation => "relation",
        }
    }
}

impl fmt::Display for ConceptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// ATTRIBUTE VALUES
// =============================================================================

/// A typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Signed 64-bit integer.
    Long(i64),
    /// 64-bit float.
    Double(f64),
    /// UTF-8 string.
    String(String),
    /// Boolean.
    Boolean(bool),
}

impl AttributeValue {
    /// Name of the value's data type.
    #[must_use]
    pub fn data_type(&self) -> &'static str {
        match self {
            AttributeValue::Long(_) => "long",
            AttributeValue::Double(_) => "double",
            AttributeValue::String(_) => "string",
            AttributeValue::Boolean(_) => "boolean",
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Long(v) => write!(f, "{}", v),
            AttributeValue::Double(v) => write!(f, "{}", v),
            AttributeValue::String(v) => write!(f, "\"{}\"", v),
            AttributeValue::Boolean(v) => write!(f, "{}", v),
        }
    }
}

// =============================================================================
// INSTRUCTIONS
// =============================================================================

/// One filled role slot of a relation instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    /// The role label.
    pub role: String,
    /// The concept playing the role.
    pub player: ConceptId,
}

impl RoleBinding {
    /// Create a new role binding.
    #[must_use]
    pub fn new(role: impl Into<String>, player: ConceptId) -> Self {
        Self {
            role: role.into(),
            player,
        }
    }
}

/// A creation instruction produced by an instance generator.
///
/// Serialized with a `kind` tag so downstream loaders can dispatch on it:
/// `{"kind":"relation","type":"friendship","role_bindings":[...]}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Instruction {
    /// Create one entity of the given type.
    Entity {
        #[serde(rename = "type")]
        type_label: String,
    },
    /// Create one attribute of the given type holding `value`.
    Attribute {
        #[serde(rename = "type")]
        type_label: String,
        value: AttributeValue,
    },
    /// Create one relation of the given type with the given role players.
    Relation {
        #[serde(rename = "type")]
        type_label: String,
        role_bindings: Vec<RoleBinding>,
    },
}

impl Instruction {
    /// The type label the instruction creates an instance of.
    #[must_use]
    pub fn type_label(&self) -> &str {
        match self {
            Instruction::Entity { type_label }
            | Instruction::Attribute { type_label, .. }
            | Instruction::Relation { type_label, .. } => type_label,
        }
    }

    /// The meta-type of the concept this instruction creates.
    #[must_use]
    pub fn kind(&self) -> ConceptKind {
        match self {
            Instruction::Entity { .. } => ConceptKind::Entity,
            Instruction::Attribute { .. } => ConceptKind::Attribute,
            Instruction::Relation { .. } => ConceptKind::Relation,
        }
    }

    /// Number of role bindings that carry the given role label.
    ///
    /// Always zero for entities and attributes.
    #[must_use]
    pub fn role_count(&self, role: &str) -> usize {
        match self {
            Instruction::Relation { role_bindings, .. } => {
                role_bindings.iter().filter(|b| b.role == role).count()
            }
            _ => 0,
        }
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur while assembling or running a generator.
///
/// - Configuration mistakes surface at construction time
/// - Provider exhaustion is NOT an error; batches simply end early
/// - Storage failures are passed through unmodified, never retried
#[derive(Debug, Error)]
pub enum SynthError {
    /// A weighted sampler was given a non-positive or non-finite weight.
    #[error("Invalid sampler weight: {0} (must be positive and finite)")]
    InvalidWeight(f64),

    /// A probability distribution was built with unusable parameters.
    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    /// A type strategy was built with unusable parameters.
    #[error("Invalid strategy: {0}")]
    InvalidStrategy(String),

    /// A schema definition was built without any strategy.
    #[error("Schema definition has no strategies")]
    EmptySchema,

    /// No built-in definition is registered under this name.
    #[error("Unknown definition: {0}")]
    UnknownDefinition(String),

    /// `next()` was called on a provider that had nothing left to give.
    #[error("Provider exhausted: {0}")]
    ProviderExhausted(String),

    /// The concept storage collaborator failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An instruction was rejected before being written to storage.
    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

impl SynthError {
    /// Whether this error points at a mistake in schema or strategy assembly.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SynthError::InvalidWeight(_)
                | SynthError::InvalidDistribution(_)
                | SynthError::InvalidStrategy(_)
                | SynthError::EmptySchema
                | SynthError::UnknownDefinition(_)
        )
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_count_counts_repeated_labels() {
        let ins = Instruction::Relation {
            type_label: "friendship".to_string(),
            role_bindings: vec![
                RoleBinding::new("friend", ConceptId(1)),
                RoleBinding::new("friend", ConceptId(2)),
            ],
        };
        assert_eq!(ins.role_count("friend"), 2);
        assert_eq!(ins.role_count("enemy"), 0);
        assert_eq!(ins.kind(), ConceptKind::Relation);
        assert_eq!(ins.type_label(), "friendship");
    }

    #[test]
    fn entity_instruction_has_no_roles() {
        let ins = Instruction::Entity {
            type_label: "person".to_string(),
        };
        assert_eq!(ins.role_count("friend"), 0);
    }

    #[test]
    fn configuration_errors_are_classified() {
        assert!(SynthError::InvalidWeight(0.0).is_configuration());
        assert!(SynthError::EmptySchema.is_configuration());
        assert!(!SynthError::Storage("down".to_string()).is_configuration());
    }

    #[test]
    fn concept_id_display() {
        assert_eq!(ConceptId(42).to_string(), "V42");
        assert_eq!(AttributeValue::String("ab".into()).to_string(), "\"ab\"");
    }
}
