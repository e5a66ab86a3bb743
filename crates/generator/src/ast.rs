//! Smithy JSON AST serialization

use oas2smithy_common::{MemberShape, Model, Result, Shape, ShapeBody, ShapeId, Traitable, Traits};
use serde_json::{json, Map, Value};

/// Version written to the `smithy` key
pub const SMITHY_VERSION: &str = "1.0";

/// Serializes a [`Model`] to the Smithy JSON AST
///
/// Shapes are written in model order. Prelude shapes are never part of a
/// model and so never appear in the output.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAstSerializer;

impl JsonAstSerializer {
    pub fn new() -> Self {
        Self
    }

    /// The whole model as a JSON value
    pub fn to_value(&self, model: &Model) -> Value {
        let shapes: Map<String, Value> = model
            .shapes()
            .map(|shape| (shape.id.to_string(), shape_node(shape)))
            .collect();

        json!({
            "smithy": SMITHY_VERSION,
            "shapes": shapes,
        })
    }

    /// Pretty-printed JSON text
    pub fn to_string_pretty(&self, model: &Model) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value(model))?)
    }
}

fn shape_node(shape: &Shape) -> Value {
    let mut node = Map::new();
    node.insert("type".to_string(), json!(shape.kind().keyword()));

    match &shape.body {
        ShapeBody::Simple(_) => {}
        ShapeBody::List(member) | ShapeBody::Set(member) => {
            node.insert("member".to_string(), member_node(member));
        }
        ShapeBody::Map { key, value } => {
            node.insert("key".to_string(), member_node(key));
            node.insert("value".to_string(), member_node(value));
        }
        ShapeBody::Structure(members) => {
            let members: Map<String, Value> = members
                .iter()
                .map(|(name, member)| (name.clone(), member_node(member)))
                .collect();
            node.insert("members".to_string(), Value::Object(members));
        }
        ShapeBody::Operation(op) => {
            insert_target(&mut node, "input", op.input.as_ref());
            insert_target(&mut node, "output", op.output.as_ref());
            insert_targets(&mut node, "errors", op.errors.iter());
        }
        ShapeBody::Resource(resource) => {
            if !resource.identifiers.is_empty() {
                let identifiers: Map<String, Value> = resource
                    .identifiers
                    .iter()
                    .map(|(name, target)| (name.clone(), target_node(target)))
                    .collect();
                node.insert("identifiers".to_string(), Value::Object(identifiers));
            }
            insert_target(&mut node, "create", resource.create.as_ref());
            insert_target(&mut node, "read", resource.read.as_ref());
            insert_target(&mut node, "update", resource.update.as_ref());
            insert_target(&mut node, "delete", resource.delete.as_ref());
            insert_target(&mut node, "list", resource.list.as_ref());
            insert_targets(&mut node, "operations", resource.operations.iter());
            insert_targets(&mut node, "resources", resource.resources.iter());
        }
        ShapeBody::Service(service) => {
            node.insert("version".to_string(), json!(service.version));
            insert_targets(&mut node, "operations", service.operations.iter());
            insert_targets(&mut node, "resources", service.resources.iter());
        }
    }

    if !shape.traits.is_empty() {
        node.insert("traits".to_string(), traits_node(&shape.traits));
    }
    Value::Object(node)
}

fn member_node(member: &MemberShape) -> Value {
    let mut node = Map::new();
    node.insert("target".to_string(), json!(member.target.to_string()));
    if !member.traits.is_empty() {
        node.insert("traits".to_string(), traits_node(&member.traits));
    }
    Value::Object(node)
}

fn traits_node(traits: &Traits) -> Value {
    Value::Object(
        traits
            .iter()
            .map(|value| (value.id().to_string(), value.to_node()))
            .collect(),
    )
}

fn target_node(target: &ShapeId) -> Value {
    json!({ "target": target.to_string() })
}

fn insert_target(node: &mut Map<String, Value>, key: &str, target: Option<&ShapeId>) {
    if let Some(target) = target {
        node.insert(key.to_string(), target_node(target));
    }
}

fn insert_targets<'a>(
    node: &mut Map<String, Value>,
    key: &str,
    targets: impl ExactSizeIterator<Item = &'a ShapeId>,
) {
    if targets.len() > 0 {
        node.insert(
            key.to_string(),
            Value::Array(targets.map(target_node).collect()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oas2smithy_common::{MemberShape, ShapeIndex, ShapeKind, Trait, Traitable};

    fn id(name: &str) -> ShapeId {
        ShapeId::new("ns.foo", name)
    }

    #[test]
    fn test_structure_node() {
        let mut pet = Shape::structure(id("Pet"));
        let mut name = MemberShape::new(id("Pet").with_member("name"), ShapeId::prelude("String"));
        name.apply_trait(Trait::Required).unwrap();
        pet.add_member(name).unwrap();
        pet.apply_trait(Trait::Documentation("A pet".to_string())).unwrap();

        let mut index = ShapeIndex::new();
        index.insert(pet).unwrap();
        index
            .insert(Shape::simple(id("Name"), ShapeKind::String).unwrap())
            .unwrap();

        let value = JsonAstSerializer::new().to_value(&index.freeze());
        assert_eq!(
            value,
            json!({
                "smithy": "1.0",
                "shapes": {
                    "ns.foo#Pet": {
                        "type": "structure",
                        "members": {
                            "name": {
                                "target": "smithy.api#String",
                                "traits": {"smithy.api#required": {}}
                            }
                        },
                        "traits": {"smithy.api#documentation": "A pet"}
                    },
                    "ns.foo#Name": {"type": "string"}
                }
            })
        );
    }
}
