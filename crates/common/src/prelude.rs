//! Shared primitive shapes resolvable in every namespace

use crate::shape::{Shape, ShapeBody, ShapeKind};
use crate::shape_id::{ShapeId, PRELUDE_NAMESPACE};
use crate::traits::Traits;

const PRELUDE: &[(&str, ShapeKind)] = &[
    ("Blob", ShapeKind::Blob),
    ("Boolean", ShapeKind::Boolean),
    ("String", ShapeKind::String),
    ("Byte", ShapeKind::Byte),
    ("Short", ShapeKind::Short),
    ("Integer", ShapeKind::Integer),
    ("Long", ShapeKind::Long),
    ("Float", ShapeKind::Float),
    ("Double", ShapeKind::Double),
    ("BigInteger", ShapeKind::BigInteger),
    ("BigDecimal", ShapeKind::BigDecimal),
    ("Timestamp", ShapeKind::Timestamp),
];

/// Prelude id for a scalar kind, if the prelude defines one
pub fn prelude_id(kind: ShapeKind) -> Option<ShapeId> {
    PRELUDE
        .iter()
        .find(|(_, k)| *k == kind)
        .map(|(name, _)| ShapeId::prelude(name))
}

/// The prelude shape with the given id
pub fn prelude_shape(id: &ShapeId) -> Option<Shape> {
    if id.namespace() != PRELUDE_NAMESPACE || id.member().is_some() {
        return None;
    }

    PRELUDE
        .iter()
        .find(|(name, _)| *name == id.name())
        .map(|(_, kind)| Shape {
            id: id.clone(),
            traits: Traits::new(),
            body: ShapeBody::Simple(*kind),
        })
}

pub fn is_prelude_shape(id: &ShapeId) -> bool {
    prelude_shape(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Traitable;

    #[test]
    fn test_prelude_roundtrip() {
        let id = prelude_id(ShapeKind::Timestamp).unwrap();
        assert_eq!(id.to_string(), "smithy.api#Timestamp");
        assert_eq!(prelude_shape(&id).unwrap().kind(), ShapeKind::Timestamp);
    }

    #[test]
    fn test_non_prelude_ids() {
        assert!(prelude_id(ShapeKind::Structure).is_none());
        assert!(!is_prelude_shape(&ShapeId::new("ns.foo", "String")));
        assert!(!is_prelude_shape(&ShapeId::prelude("Document")));
    }
}
