//! Shapes: the nodes of the semantic model

use crate::traits::{Trait, Traits};
use crate::{ConverterError, Result, ShapeId};
use indexmap::{IndexMap, IndexSet};
use std::fmt;

/// Closed set of shape kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Boolean,
    Byte,
    Short,
    Integer,
    Long,
    Float,
    Double,
    BigDecimal,
    BigInteger,
    Blob,
    String,
    Timestamp,
    List,
    Set,
    Map,
    Structure,
    Member,
    Operation,
    Resource,
    Service,
}

impl ShapeKind {
    /// Keyword used for the kind in the IDL and the JSON AST
    pub fn keyword(&self) -> &'static str {
        match self {
            ShapeKind::Boolean => "boolean",
            ShapeKind::Byte => "byte",
            ShapeKind::Short => "short",
            ShapeKind::Integer => "integer",
            ShapeKind::Long => "long",
            ShapeKind::Float => "float",
            ShapeKind::Double => "double",
            ShapeKind::BigDecimal => "bigDecimal",
            ShapeKind::BigInteger => "bigInteger",
            ShapeKind::Blob => "blob",
            ShapeKind::String => "string",
            ShapeKind::Timestamp => "timestamp",
            ShapeKind::List => "list",
            ShapeKind::Set => "set",
            ShapeKind::Map => "map",
            ShapeKind::Structure => "structure",
            ShapeKind::Member => "member",
            ShapeKind::Operation => "operation",
            ShapeKind::Resource => "resource",
            ShapeKind::Service => "service",
        }
    }

    /// Simple kinds carry no members and no nested references
    pub fn is_simple(&self) -> bool {
        matches!(
            self,
            ShapeKind::Boolean
                | ShapeKind::Byte
                | ShapeKind::Short
                | ShapeKind::Integer
                | ShapeKind::Long
                | ShapeKind::Float
                | ShapeKind::Double
                | ShapeKind::BigDecimal
                | ShapeKind::BigInteger
                | ShapeKind::Blob
                | ShapeKind::String
                | ShapeKind::Timestamp
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ShapeKind::Byte
                | ShapeKind::Short
                | ShapeKind::Integer
                | ShapeKind::Long
                | ShapeKind::Float
                | ShapeKind::Double
                | ShapeKind::BigDecimal
                | ShapeKind::BigInteger
        )
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Anything that carries an id, a kind and a trait map
///
/// Implemented by both top-level shapes and members so trait derivation
/// can treat them uniformly.
pub trait Traitable {
    fn id(&self) -> &ShapeId;

    fn kind(&self) -> ShapeKind;

    fn traits(&self) -> &Traits;

    fn traits_mut(&mut self) -> &mut Traits;

    /// Apply a trait, reporting a conflicting value as an error on this shape
    fn apply_trait(&mut self, value: Trait) -> Result<()> {
        let id = self.id().clone();
        self.traits_mut()
            .apply(value)
            .map_err(|conflict| ConverterError::ConflictingTrait {
                shape: id.to_string(),
                trait_id: conflict.trait_id,
            })
    }

    fn has_trait(&self, trait_id: &str) -> bool {
        self.traits().contains(trait_id)
    }
}

/// Member of an aggregate shape, pointing at its target shape
#[derive(Debug, Clone, PartialEq)]
pub struct MemberShape {
    /// Member id, `Container$name`
    pub id: ShapeId,

    /// Shape the member refers to
    pub target: ShapeId,

    pub traits: Traits,
}

impl MemberShape {
    pub fn new(id: ShapeId, target: ShapeId) -> Self {
        Self {
            id,
            target,
            traits: Traits::new(),
        }
    }

    /// Member name (the part after `$`)
    pub fn name(&self) -> &str {
        self.id.member().unwrap_or_else(|| self.id.name())
    }
}

impl Traitable for MemberShape {
    fn id(&self) -> &ShapeId {
        &self.id
    }

    fn kind(&self) -> ShapeKind {
        ShapeKind::Member
    }

    fn traits(&self) -> &Traits {
        &self.traits
    }

    fn traits_mut(&mut self) -> &mut Traits {
        &mut self.traits
    }
}

/// Operation references
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationShape {
    pub input: Option<ShapeId>,
    pub output: Option<ShapeId>,
    pub errors: IndexSet<ShapeId>,
}

/// Lifecycle bindings, identifiers and children of a resource
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceShape {
    /// Identifier name to target shape, outermost first
    pub identifiers: IndexMap<String, ShapeId>,

    pub create: Option<ShapeId>,
    pub read: Option<ShapeId>,
    pub update: Option<ShapeId>,
    pub delete: Option<ShapeId>,
    pub list: Option<ShapeId>,

    /// Operations bound to the resource outside the lifecycle slots
    pub operations: IndexSet<ShapeId>,

    /// Child resources
    pub resources: IndexSet<ShapeId>,
}

impl ResourceShape {
    /// Every operation bound to the resource, lifecycle slots first
    pub fn all_operations(&self) -> impl Iterator<Item = &ShapeId> {
        [
            &self.create,
            &self.read,
            &self.update,
            &self.delete,
            &self.list,
        ]
        .into_iter()
        .flatten()
        .chain(self.operations.iter())
    }
}

/// Root of the model
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceShape {
    pub version: String,
    pub resources: IndexSet<ShapeId>,

    /// Operations not bound to any resource
    pub operations: IndexSet<ShapeId>,
}

/// Kind-specific content of a shape
#[derive(Debug, Clone, PartialEq)]
pub enum ShapeBody {
    /// Scalar kinds (`Boolean` .. `Timestamp`)
    Simple(ShapeKind),

    List(MemberShape),
    Set(MemberShape),

    Map {
        key: MemberShape,
        value: MemberShape,
    },

    Structure(IndexMap<String, MemberShape>),
    Operation(OperationShape),
    Resource(ResourceShape),
    Service(ServiceShape),
}

/// A top-level shape
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub traits: Traits,
    pub body: ShapeBody,
}

impl Shape {
    /// Create a scalar shape
    ///
    /// Aggregate kinds are rejected since they need members.
    pub fn simple(id: ShapeId, kind: ShapeKind) -> Result<Self> {
        if !kind.is_simple() {
            return Err(ConverterError::UnsupportedSchemaType {
                shape: id.to_string(),
                schema_type: kind.to_string(),
            });
        }

        Ok(Self::with_body(id, ShapeBody::Simple(kind)))
    }

    pub fn with_body(id: ShapeId, body: ShapeBody) -> Self {
        Self {
            id,
            traits: Traits::new(),
            body,
        }
    }

    /// Structure with no members yet
    pub fn structure(id: ShapeId) -> Self {
        Self::with_body(id, ShapeBody::Structure(IndexMap::new()))
    }

    /// Members in declaration order
    pub fn members(&self) -> Vec<&MemberShape> {
        match &self.body {
            ShapeBody::List(member) | ShapeBody::Set(member) => vec![member],
            ShapeBody::Map { key, value } => vec![key, value],
            ShapeBody::Structure(members) => members.values().collect(),
            _ => Vec::new(),
        }
    }

    pub fn member(&self, name: &str) -> Option<&MemberShape> {
        self.members().into_iter().find(|m| m.name() == name)
    }

    /// Add a member to a structure
    ///
    /// A member whose name is already taken is rejected.
    pub fn add_member(&mut self, member: MemberShape) -> Result<()> {
        match &mut self.body {
            ShapeBody::Structure(members) => {
                if members.contains_key(member.name()) {
                    return Err(ConverterError::DuplicateMember {
                        shape: self.id.to_string(),
                        member: member.name().to_string(),
                    });
                }
                members.insert(member.name().to_string(), member);
                Ok(())
            }
            _ => Err(ConverterError::InvalidShape(format!(
                "cannot add member {} to non-structure shape {}",
                member.id, self.id
            ))),
        }
    }

    pub fn as_operation(&self) -> Option<&OperationShape> {
        match &self.body {
            ShapeBody::Operation(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_operation_mut(&mut self) -> Option<&mut OperationShape> {
        match &mut self.body {
            ShapeBody::Operation(op) => Some(op),
            _ => None,
        }
    }

    pub fn as_resource(&self) -> Option<&ResourceShape> {
        match &self.body {
            ShapeBody::Resource(resource) => Some(resource),
            _ => None,
        }
    }

    pub fn as_service(&self) -> Option<&ServiceShape> {
        match &self.body {
            ShapeBody::Service(service) => Some(service),
            _ => None,
        }
    }

    /// Every shape id this shape refers to, excluding its own members' ids
    pub fn references(&self) -> Vec<&ShapeId> {
        match &self.body {
            ShapeBody::Simple(_) => Vec::new(),
            ShapeBody::List(_) | ShapeBody::Set(_) | ShapeBody::Map { .. } | ShapeBody::Structure(_) => {
                self.members().into_iter().map(|m| &m.target).collect()
            }
            ShapeBody::Operation(op) => op
                .input
                .iter()
                .chain(op.output.iter())
                .chain(op.errors.iter())
                .collect(),
            ShapeBody::Resource(resource) => resource
                .identifiers
                .values()
                .chain(resource.all_operations())
                .chain(resource.resources.iter())
                .collect(),
            ShapeBody::Service(service) => service
                .resources
                .iter()
                .chain(service.operations.iter())
                .collect(),
        }
    }
}

impl Traitable for Shape {
    fn id(&self) -> &ShapeId {
        &self.id
    }

    fn kind(&self) -> ShapeKind {
        match &self.body {
            ShapeBody::Simple(kind) => *kind,
            ShapeBody::List(_) => ShapeKind::List,
            ShapeBody::Set(_) => ShapeKind::Set,
            ShapeBody::Map { .. } => ShapeKind::Map,
            ShapeBody::Structure(_) => ShapeKind::Structure,
            ShapeBody::Operation(_) => ShapeKind::Operation,
            ShapeBody::Resource(_) => ShapeKind::Resource,
            ShapeBody::Service(_) => ShapeKind::Service,
        }
    }

    fn traits(&self) -> &Traits {
        &self.traits
    }

    fn traits_mut(&mut self) -> &mut Traits {
        &mut self.traits
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::trait_ids;

    fn id(name: &str) -> ShapeId {
        ShapeId::new("ns.foo", name)
    }

    #[test]
    fn test_simple_rejects_aggregate_kinds() {
        assert!(Shape::simple(id("Name"), ShapeKind::String).is_ok());
        assert!(Shape::simple(id("Pets"), ShapeKind::List).is_err());
    }

    #[test]
    fn test_structure_members_keep_order() {
        let mut pet = Shape::structure(id("Pet"));
        for name in ["name", "id", "tag"] {
            pet.add_member(MemberShape::new(
                id("Pet").with_member(name),
                ShapeId::prelude("String"),
            ))
            .unwrap();
        }

        let names: Vec<_> = pet.members().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["name", "id", "tag"]);
        assert_eq!(pet.kind(), ShapeKind::Structure);
        assert!(pet.member("tag").is_some());
    }

    #[test]
    fn test_add_member_rejects_taken_name() {
        let mut pet = Shape::structure(id("Pet"));
        pet.add_member(MemberShape::new(id("Pet").with_member("id"), ShapeId::prelude("String")))
            .unwrap();

        let err = pet
            .add_member(MemberShape::new(id("Pet").with_member("id"), ShapeId::prelude("Long")))
            .unwrap_err();
        assert!(matches!(
            err,
            ConverterError::DuplicateMember { ref shape, ref member } if shape == "ns.foo#Pet" && member == "id"
        ));
        assert_eq!(pet.member("id").unwrap().target, ShapeId::prelude("String"));
    }

    #[test]
    fn test_add_member_to_list_fails() {
        let member = MemberShape::new(id("Pets").with_member("member"), id("Pet"));
        let mut pets = Shape::with_body(id("Pets"), ShapeBody::List(member.clone()));
        assert!(pets.add_member(member).is_err());
    }

    #[test]
    fn test_apply_trait_reports_shape() {
        let mut shape = Shape::simple(id("Name"), ShapeKind::String).unwrap();
        shape.apply_trait(Trait::Pattern("^a$".into())).unwrap();

        let err = shape.apply_trait(Trait::Pattern("^b$".into())).unwrap_err();
        match err {
            ConverterError::ConflictingTrait { shape, trait_id } => {
                assert_eq!(shape, "ns.foo#Name");
                assert_eq!(trait_id, trait_ids::PATTERN);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_resource_references() {
        let resource = ResourceShape {
            identifiers: IndexMap::from([("petId".to_string(), ShapeId::prelude("String"))]),
            read: Some(id("getPet")),
            operations: IndexSet::from([id("listPets")]),
            ..Default::default()
        };
        let shape = Shape::with_body(id("ResourcePets"), ShapeBody::Resource(resource));

        let refs: Vec<String> = shape.references().iter().map(|r| r.to_string()).collect();
        assert_eq!(
            refs,
            vec!["smithy.api#String", "ns.foo#getPet", "ns.foo#listPets"]
        );
    }
}
