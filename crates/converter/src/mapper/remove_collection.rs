//! Post-build cleanup of the `collection` trait

use super::ShapeMapper;
use crate::context::ConversionContext;
use oas2smithy_common::{trait_ids, Model, Result, ShapeId, ShapeKind, Trait, Traitable};
use tracing::debug;

/// Strips `collection` from GET operations bound to resources without identifiers
///
/// A resource without identifiers never resolves to a single instance, so
/// marking its reads as collection operations carries no information.
/// Registered at the lowest priority so it runs before any other
/// post-build mapper.
pub struct RemoveCollectionTrait;

fn is_get(shape: &dyn Traitable) -> bool {
    matches!(
        shape.traits().get(trait_ids::HTTP),
        Some(Trait::Http { method, .. }) if method == "GET"
    )
}

impl ShapeMapper for RemoveCollectionTrait {
    fn name(&self) -> &'static str {
        "remove-collection-trait"
    }

    fn priority(&self) -> i8 {
        i8::MIN
    }

    fn after(&self, model: Model, _ctx: &ConversionContext<'_>) -> Result<Model> {
        let targets: Vec<ShapeId> = model
            .shapes_of_kind(ShapeKind::Resource)
            .filter_map(|shape| shape.as_resource())
            .filter(|resource| resource.identifiers.is_empty())
            .flat_map(|resource| resource.all_operations().cloned().collect::<Vec<_>>())
            .filter(|id| {
                model
                    .get(id)
                    .is_some_and(|op| is_get(op) && op.has_trait(trait_ids::COLLECTION))
            })
            .collect();

        if targets.is_empty() {
            return Ok(model);
        }

        let mut index = model.into_index();
        for id in targets {
            if let Some(mut operation) = index.get(&id).cloned() {
                operation.traits.remove(trait_ids::COLLECTION);
                debug!(shape = %id, "removed collection trait");
                index.replace(operation);
            }
        }

        Ok(index.freeze())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterConfig;
    use crate::openapi::OpenApiParser;
    use indexmap::{IndexMap, IndexSet};
    use oas2smithy_common::{OperationShape, ResourceShape, Shape, ShapeBody, ShapeIndex};

    fn id(name: &str) -> ShapeId {
        ShapeId::new("ns.foo", name)
    }

    fn operation(name: &str, method: &str) -> Shape {
        let mut op = Shape::with_body(id(name), ShapeBody::Operation(OperationShape::default()));
        op.apply_trait(Trait::Http {
            method: method.to_string(),
            uri: "/things".to_string(),
            code: None,
        })
        .unwrap();
        op.apply_trait(Trait::Collection).unwrap();
        op
    }

    fn resource(name: &str, identifiers: &[&str], operations: &[&str]) -> Shape {
        let resource = ResourceShape {
            identifiers: identifiers
                .iter()
                .map(|i| (i.to_string(), ShapeId::prelude("String")))
                .collect::<IndexMap<_, _>>(),
            operations: operations.iter().map(|o| id(o)).collect::<IndexSet<_>>(),
            ..Default::default()
        };
        Shape::with_body(id(name), ShapeBody::Resource(resource))
    }

    #[test]
    fn test_strips_only_gets_on_identifierless_resources() {
        let mut index = ShapeIndex::new();
        index.insert(operation("listThings", "GET")).unwrap();
        index.insert(operation("createThings", "POST")).unwrap();
        index.insert(operation("listPets", "GET")).unwrap();
        index
            .insert(resource("ResourceThings", &[], &["listThings", "createThings"]))
            .unwrap();
        index
            .insert(resource("ResourcePets", &["petId"], &["listPets"]))
            .unwrap();

        let doc = OpenApiParser::from_json(r#"{"openapi": "3.0.0", "info": {"title": "t", "version": "1"}}"#)
            .unwrap()
            .into_document();
        let config = ConverterConfig::default();
        let ctx = ConversionContext::new(&doc, &config);

        let model = RemoveCollectionTrait.after(index.freeze(), &ctx).unwrap();

        let has_collection = |name: &str| model.get(&id(name)).unwrap().has_trait(trait_ids::COLLECTION);
        assert!(!has_collection("listThings"));
        assert!(has_collection("createThings"));
        assert!(has_collection("listPets"));
    }
}
