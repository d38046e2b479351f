//! # Ingestor Module
//!
//! Instruction validation and write-back into concept storage.
//!
//! - Validate instructions before storage mutation
//! - Reject malformed input
//! - No enrichment: an instruction is written exactly as produced

use crate::primitives::{MAX_LABEL_LENGTH, MAX_VALUE_LENGTH};
use crate::storage::ConceptSink;
use crate::{AttributeValue, ConceptId, Instruction, SynthError};

fn check_label(what: &str, label: &str) -> Result<(), SynthError> {
    if label.is_empty() {
        return Err(SynthError::InvalidInstruction(format!("empty {} label", what)));
    }
    if label.len() > MAX_LABEL_LENGTH {
        return Err(SynthError::InvalidInstruction(format!(
            "{} label exceeds {} bytes",
            what, MAX_LABEL_LENGTH
        )));
    }
    Ok(())
}

/// The Ingestor closes the generation loop: it checks each instruction and
/// writes it to a [`ConceptSink`].
pub struct Ingestor;

impl Ingestor {
    /// Validate an instruction.
    ///
    /// An instruction is valid if:
    /// - Its type label is non-empty and within length limits
    /// - A relation has at least one role binding, each with a valid role label
    /// - A double value is finite
    /// - A string value is within length limits
    ///
    /// Returns `SynthError::InvalidInstruction` if validation fails.
    pub fn validate(instruction: &Instruction) -> Result<(), SynthError> {
        check_label("type", instruction.type_label())?;

        match instruction {
            Instruction::Entity { .. } => Ok(()),
            Instruction::Attribute { value, .. } => match value {
                AttributeValue::Double(v) if !v.is_finite() => Err(
                    SynthError::InvalidInstruction(format!("non-finite value {}", v)),
                ),
                AttributeValue::String(s) if s.len() > MAX_VALUE_LENGTH => {
                    Err(SynthError::InvalidInstruction(format!(
                        "string value exceeds {} bytes",
                        MAX_VALUE_LENGTH
                    )))
                }
                _ => Ok(()),
            },
            Instruction::Relation {
                type_label,
                role_bindings,
            } => {
                if role_bindings.is_empty() {
                    return Err(SynthError::InvalidInstruction(format!(
                        "relation {} has no role bindings",
                        type_label
                    )));
                }
                for binding in role_bindings {
                    check_label("role", &binding.role)?;
                }
                Ok(())
            }
        }
    }

    /// Validate an instruction and write it to `sink`.
    ///
    /// Returns the identifier of the new concept.
    pub fn apply<S: ConceptSink>(
        sink: &mut S,
        instruction: &Instruction,
    ) -> Result<ConceptId, SynthError> {
        Self::validate(instruction)?;

        match instruction {
            Instruction::Entity { type_label } => sink.insert_entity(type_label),
            Instruction::Attribute { type_label, value } => {
                sink.insert_attribute(type_label, value.clone())
            }
            Instruction::Relation {
                type_label,
                role_bindings,
            } => sink.insert_relation(type_label, role_bindings),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ConceptStorage, MemoryStorage};
    use crate::{ConceptKind, RoleBinding};

    #[test]
    fn test_validate_rejects_empty_label() {
        let instruction = Instruction::Entity {
            type_label: String::new(),
        };
        assert!(matches!(
            Ingestor::validate(&instruction),
            Err(SynthError::InvalidInstruction(_))
        ));
    }

    #[test]
    fn test_validate_rejects_long_label() {
        let instruction = Instruction::Entity {
            type_label: "x".repeat(MAX_LABEL_LENGTH + 1),
        };
        assert!(Ingestor::validate(&instruction).is_err());
    }

    #[test]
    fn test_validate_rejects_unbound_relation() {
        let instruction = Instruction::Relation {
            type_label: "likes".to_string(),
            role_bindings: Vec::new(),
        };
        assert!(Ingestor::validate(&instruction).is_err());
    }

    #[test]
    fn test_validate_rejects_non_finite_double() {
        let instruction = Instruction::Attribute {
            type_label: "decimal".to_string(),
            value: AttributeValue::Double(f64::NAN),
        };
        assert!(Ingestor::validate(&instruction).is_err());
    }

    #[test]
    fn test_apply_writes_each_kind() {
        let mut storage = MemoryStorage::new();

        let person = Ingestor::apply(
            &mut storage,
            &Instruction::Entity {
                type_label: "person".to_string(),
            },
        )
        .expect("entity");
        let name = Ingestor::apply(
            &mut storage,
            &Instruction::Attribute {
                type_label: "name".to_string(),
                value: AttributeValue::String("ada".to_string()),
            },
        )
        .expect("attribute");
        let owns = Ingestor::apply(
            &mut storage,
            &Instruction::Relation {
                type_label: "@has-name".to_string(),
                role_bindings: vec![
                    RoleBinding::new("@has-name-owner", person),
                    RoleBinding::new("@has-name-value", name),
                ],
            },
        )
        .expect("relation");

        assert_eq!(storage.current_scale().expect("scale"), 3);
        assert_eq!(
            storage.concept(owns).map(|c| c.kind),
            Some(ConceptKind::Relation)
        );
        assert!(storage.plays_role(name, "@has-name", "@has-name-value"));
    }

    #[test]
    fn test_apply_rejects_before_writing() {
        let mut storage = MemoryStorage::new();
        let result = Ingestor::apply(
            &mut storage,
            &Instruction::Entity {
                type_label: String::new(),
            },
        );
        assert!(result.is_err());
        assert!(storage.is_empty());
    }
}
