//! Whole-model consistency checks run after conversion

use crate::index::Model;
use crate::prelude::is_prelude_shape;
use crate::shape::{ShapeBody, Traitable};
use crate::ShapeId;
use std::collections::HashMap;
use std::fmt;

/// Severity of a validation event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Error => write!(f, "ERROR"),
        }
    }
}

/// One diagnostic produced while assembling a model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationEvent {
    pub severity: Severity,

    /// Shape the event is attached to
    pub shape: ShapeId,

    pub message: String,
}

impl fmt::Display for ValidationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.shape, self.message)
    }
}

/// Model assembly failed; carries every diagnostic that was reported
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyError {
    pub events: Vec<ValidationEvent>,
}

impl fmt::Display for AssemblyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation event(s)", self.events.len())?;
        for event in &self.events {
            write!(f, "\n  {}", event)?;
        }
        Ok(())
    }
}

impl std::error::Error for AssemblyError {}

/// Final consistency check over a converted model
pub trait ModelAssembler {
    /// Validate the model, returning it unchanged on success
    fn assemble(&self, model: Model) -> std::result::Result<Model, AssemblyError>;
}

/// Default assembler
///
/// Reports references to shapes that are neither in the model nor in the
/// prelude, and shape ids that differ only by case within a namespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelValidator;

impl ModelValidator {
    pub fn new() -> Self {
        Self
    }

    /// Collect every event for the model without failing
    pub fn validate(&self, model: &Model) -> Vec<ValidationEvent> {
        let mut events = Vec::new();
        self.check_references(model, &mut events);
        self.check_id_collisions(model, &mut events);
        events
    }

    fn check_references(&self, model: &Model, events: &mut Vec<ValidationEvent>) {
        for shape in model.shapes() {
            for member in shape.members() {
                if member.id.container() != shape.id {
                    events.push(error(
                        &member.id,
                        format!("member is not contained in {}", shape.id),
                    ));
                }
                if !is_defined(model, &member.target) {
                    events.push(error(
                        &member.id,
                        format!("member targets unknown shape {}", member.target),
                    ));
                }
            }

            if !matches!(
                shape.body,
                ShapeBody::Operation(_) | ShapeBody::Resource(_) | ShapeBody::Service(_)
            ) {
                continue;
            }

            for target in shape.references() {
                if !is_defined(model, target) {
                    events.push(error(
                        shape.id(),
                        format!("{} refers to unknown shape {}", shape.kind(), target),
                    ));
                }
            }
        }
    }

    fn check_id_collisions(&self, model: &Model, events: &mut Vec<ValidationEvent>) {
        let mut seen: HashMap<String, &ShapeId> = HashMap::new();

        for shape in model.shapes() {
            let key = shape.id.to_string().to_lowercase();
            match seen.get(&key) {
                Some(first) => events.push(error(
                    &shape.id,
                    format!("shape id conflicts with {} (ids are case-insensitive)", first),
                )),
                None => {
                    seen.insert(key, &shape.id);
                }
            }
        }
    }
}

impl ModelAssembler for ModelValidator {
    fn assemble(&self, model: Model) -> std::result::Result<Model, AssemblyError> {
        let events = self.validate(&model);
        if events.iter().any(|e| e.severity == Severity::Error) {
            return Err(AssemblyError { events });
        }
        Ok(model)
    }
}

fn is_defined(model: &Model, id: &ShapeId) -> bool {
    model.contains(id) || is_prelude_shape(id)
}

fn error(shape: &ShapeId, message: String) -> ValidationEvent {
    ValidationEvent {
        severity: Severity::Error,
        shape: shape.clone(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::ShapeIndex;
    use crate::shape::{MemberShape, OperationShape, Shape, ShapeKind};

    fn id(name: &str) -> ShapeId {
        ShapeId::new("ns.foo", name)
    }

    #[test]
    fn test_valid_model_passes() {
        let mut index = ShapeIndex::new();
        let mut pet = Shape::structure(id("Pet"));
        pet.add_member(MemberShape::new(
            id("Pet").with_member("name"),
            ShapeId::prelude("String"),
        ))
        .unwrap();
        index.insert(pet).unwrap();

        let model = index.freeze();
        assert!(ModelValidator::new().assemble(model).is_ok());
    }

    #[test]
    fn test_dangling_references_reported() {
        let mut index = ShapeIndex::new();
        let mut pet = Shape::structure(id("Pet"));
        pet.add_member(MemberShape::new(id("Pet").with_member("owner"), id("Owner")))
            .unwrap();
        index.insert(pet).unwrap();

        let op = OperationShape {
            input: Some(id("GetPetInput")),
            ..Default::default()
        };
        index
            .insert(Shape::with_body(id("GetPet"), ShapeBody::Operation(op)))
            .unwrap();

        let err = ModelValidator::new().assemble(index.freeze()).unwrap_err();
        assert_eq!(err.events.len(), 2);
        assert_eq!(err.events[0].shape, id("Pet").with_member("owner"));
        assert_eq!(err.events[1].shape, id("GetPet"));
    }

    #[test]
    fn test_case_insensitive_collision() {
        let mut index = ShapeIndex::new();
        index
            .insert(Shape::simple(id("Pet"), ShapeKind::String).unwrap())
            .unwrap();
        index
            .insert(Shape::simple(id("pet"), ShapeKind::String).unwrap())
            .unwrap();

        let events = ModelValidator::new().validate(&index.freeze());
        assert_eq!(events.len(), 1);
        assert!(events[0].message.contains("ns.foo#Pet"));
    }
}
