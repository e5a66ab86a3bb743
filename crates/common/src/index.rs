//! Per-run shape accumulator and the frozen model it produces

use crate::prelude::prelude_shape;
use crate::shape::{Shape, ShapeKind, Traitable};
use crate::{ConverterError, Result, ShapeId};
use indexmap::IndexMap;
use std::borrow::Cow;
use tracing::debug;

/// Mutable shape collection for one conversion run
///
/// Shapes keep insertion order, which makes every later traversal of the
/// model deterministic. Prelude shapes are resolvable without being stored.
#[derive(Debug, Clone, Default)]
pub struct ShapeIndex {
    shapes: IndexMap<ShapeId, Shape>,
}

impl ShapeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a shape
    ///
    /// Inserting a shape identical to the one already stored under the
    /// same id is a no-op; inserting a different one is an error.
    pub fn insert(&mut self, shape: Shape) -> Result<()> {
        if shape.id.is_prelude() {
            return Err(ConverterError::InvalidShape(format!(
                "cannot redefine prelude shape {}",
                shape.id
            )));
        }

        match self.shapes.get(&shape.id) {
            Some(existing) if *existing == shape => {
                debug!(shape = %shape.id, "shape already present");
                Ok(())
            }
            Some(_) => Err(ConverterError::DuplicateShape(shape.id.to_string())),
            None => {
                self.shapes.insert(shape.id.clone(), shape);
                Ok(())
            }
        }
    }

    /// Store a shape, overwriting any previous shape with the same id
    ///
    /// Reserved for mapper-driven rebuilds.
    pub fn replace(&mut self, shape: Shape) -> Option<Shape> {
        self.shapes.insert(shape.id.clone(), shape)
    }

    pub fn remove(&mut self, id: &ShapeId) -> Option<Shape> {
        self.shapes.shift_remove(id)
    }

    /// Shape stored in this index (prelude excluded)
    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.shapes.contains_key(id)
    }

    /// Look a shape up in the index, falling back to the prelude
    pub fn resolve(&self, id: &ShapeId) -> Option<Cow<'_, Shape>> {
        self.shapes
            .get(id)
            .map(Cow::Borrowed)
            .or_else(|| prelude_shape(id).map(Cow::Owned))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Freeze the index into the final model
    pub fn freeze(self) -> Model {
        Model {
            shapes: self.shapes,
        }
    }
}

/// Immutable result of a conversion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    shapes: IndexMap<ShapeId, Shape>,
}

impl Model {
    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.get(id)
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.shapes.contains_key(id)
    }

    /// Shapes in insertion order
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.values()
    }

    pub fn shapes_of_kind(&self, kind: ShapeKind) -> impl Iterator<Item = &Shape> {
        self.shapes.values().filter(move |s| s.kind() == kind)
    }

    /// The first service shape, if any
    pub fn service(&self) -> Option<&Shape> {
        self.shapes_of_kind(ShapeKind::Service).next()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Reopen the model for a rebuild
    pub fn into_index(self) -> ShapeIndex {
        ShapeIndex {
            shapes: self.shapes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Trait;

    fn string_shape(name: &str) -> Shape {
        Shape::simple(ShapeId::new("ns.foo", name), ShapeKind::String).unwrap()
    }

    #[test]
    fn test_insert_identical_is_noop() {
        let mut index = ShapeIndex::new();
        index.insert(string_shape("Name")).unwrap();
        index.insert(string_shape("Name")).unwrap();
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_insert_different_shape_same_id_fails() {
        let mut index = ShapeIndex::new();
        index.insert(string_shape("Name")).unwrap();

        let mut other = string_shape("Name");
        other.apply_trait(Trait::Pattern("^x$".into())).unwrap();

        assert!(matches!(
            index.insert(other),
            Err(ConverterError::DuplicateShape(id)) if id == "ns.foo#Name"
        ));
    }

    #[test]
    fn test_resolve_falls_back_to_prelude() {
        let index = ShapeIndex::new();
        let resolved = index.resolve(&ShapeId::prelude("Long")).unwrap();
        assert_eq!(resolved.kind(), ShapeKind::Long);
        assert!(!index.contains(&ShapeId::prelude("Long")));
    }

    #[test]
    fn test_prelude_cannot_be_inserted() {
        let mut index = ShapeIndex::new();
        let shape = Shape::simple(ShapeId::prelude("String"), ShapeKind::String).unwrap();
        assert!(index.insert(shape).is_err());
    }

    #[test]
    fn test_freeze_and_reopen() {
        let mut index = ShapeIndex::new();
        index.insert(string_shape("A")).unwrap();
        index.insert(string_shape("B")).unwrap();

        let model = index.freeze();
        let names: Vec<_> = model.shapes().map(|s| s.id.name().to_string()).collect();
        assert_eq!(names, vec!["A", "B"]);

        let mut reopened = model.into_index();
        reopened.remove(&ShapeId::new("ns.foo", "A"));
        assert_eq!(reopened.freeze().len(), 1);
    }
}
