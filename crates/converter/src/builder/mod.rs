//! Shape graph construction
//!
//! [`ShapeGraphBuilder`] turns schemas into shapes, recursing into inline
//! properties and array items. Every shape it produces goes through the
//! [`TraitPipeline`] and then the per-shape hook of the [`MapperPipeline`]
//! before it is stored in the [`ShapeIndex`].
//!
//! ## Naming
//!
//! - a top-level schema keeps the id it is built under (`ns#Pet`)
//! - an inline schema nested in `ns#Pet` under property `category` becomes
//!   `ns#Pet_Category`; array items use the name `Member`
//! - an inline scalar nested anywhere targets the prelude shape of its kind,
//!   and the traits derived for it are carried by the member instead
//! - a `$ref` names `ns#<last path segment>` and builds nothing

mod operation;

use crate::context::ConversionContext;
use crate::mapper::MapperPipeline;
use crate::openapi::{RefOr, Schema};
use crate::traits::{TraitPipeline, TraitSource};
use indexmap::IndexMap;
use oas2smithy_common::{
    prelude_id, sanitize_identifier, to_pascal_case, ConverterError, MemberShape, Result, Shape,
    ShapeBody, ShapeId, ShapeIndex, ShapeKind, Trait, Traitable,
};
use serde_json::Value;
use tracing::debug;

/// Outcome of building one schema
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltShape {
    /// `$ref` to a shape defined elsewhere in the namespace
    Reference(ShapeId),

    /// Shape built by this call, reused from the index, or a prelude shape
    /// carrying the traits derived for an inline scalar
    Defined(Shape),
}

impl BuiltShape {
    pub fn id(&self) -> &ShapeId {
        match self {
            BuiltShape::Reference(id) => id,
            BuiltShape::Defined(shape) => &shape.id,
        }
    }
}

/// Builds shapes for one conversion run
pub struct ShapeGraphBuilder<'a> {
    ctx: ConversionContext<'a>,
    traits: &'a TraitPipeline,
    mappers: &'a MapperPipeline,

    /// Headers and body schema each shared error shape was built from
    error_payloads: IndexMap<ShapeId, Value>,
}

impl<'a> ShapeGraphBuilder<'a> {
    pub fn new(
        ctx: ConversionContext<'a>,
        traits: &'a TraitPipeline,
        mappers: &'a MapperPipeline,
    ) -> Self {
        Self {
            ctx,
            traits,
            mappers,
            error_payloads: IndexMap::new(),
        }
    }

    pub fn context(&self) -> &ConversionContext<'a> {
        &self.ctx
    }

    /// Build the shape for `schema`
    ///
    /// With an `enclosing` shape the id becomes `Enclosing_TargetName` and
    /// scalars resolve to the prelude. Returns `None` when a mapper drops
    /// the shape.
    ///
    /// # Example
    /// ```rust,ignore
    /// let pet = builder.build_shape(&ctx.shape_id("Pet"), &schema, None, &mut index)?;
    /// ```
    pub fn build_shape(
        &self,
        target: &ShapeId,
        schema: &RefOr<Schema>,
        enclosing: Option<&ShapeId>,
        index: &mut ShapeIndex,
    ) -> Result<Option<BuiltShape>> {
        self.build_at(target, schema, enclosing, index, 0)
    }

    fn build_at(
        &self,
        target: &ShapeId,
        schema: &RefOr<Schema>,
        enclosing: Option<&ShapeId>,
        index: &mut ShapeIndex,
        depth: usize,
    ) -> Result<Option<BuiltShape>> {
        match schema {
            RefOr::Reference { ref_path } => {
                let id = self.ctx.shape_id_for_ref(&target.to_string(), ref_path)?;
                Ok(Some(BuiltShape::Reference(id)))
            }
            RefOr::Item(schema) => self.build_schema(target, schema, enclosing, index, depth),
        }
    }

    fn build_schema(
        &self,
        target: &ShapeId,
        schema: &Schema,
        enclosing: Option<&ShapeId>,
        index: &mut ShapeIndex,
        depth: usize,
    ) -> Result<Option<BuiltShape>> {
        let id = match enclosing {
            Some(parent) => self
                .ctx
                .shape_id(&format!("{}_{}", parent.name(), target.name())),
            None => target.clone(),
        };

        let max_depth = self.ctx.config.max_schema_depth;
        if depth > max_depth {
            return Err(ConverterError::CyclicSchema {
                shape: id.to_string(),
                depth: max_depth,
            });
        }
        if schema.is_composition() {
            return Err(ConverterError::UnsupportedComposition(id.to_string()));
        }

        let kind = self.schema_kind(&id, schema)?;
        let id = match (enclosing, prelude_id(kind)) {
            (Some(_), Some(prelude)) => prelude,
            _ => id,
        };

        if let Some(existing) = index.get(&id) {
            debug!(shape = %id, "reusing existing shape");
            return Ok(Some(BuiltShape::Defined(existing.clone())));
        }

        let body = match kind {
            ShapeKind::List | ShapeKind::Set => {
                let items = schema
                    .items
                    .as_deref()
                    .ok_or_else(|| ConverterError::MissingItems(id.to_string()))?;
                let member =
                    self.build_member(id.with_member("member"), "Member", items, &id, index, depth + 1)?;
                match (kind, member) {
                    (_, None) => return Ok(None),
                    (ShapeKind::Set, Some(member)) => ShapeBody::Set(member),
                    (_, Some(member)) => ShapeBody::List(member),
                }
            }
            ShapeKind::Structure => {
                ShapeBody::Structure(self.build_properties(&id, schema, index, depth)?)
            }
            scalar => ShapeBody::Simple(scalar),
        };

        let mut shape = Shape::with_body(id, body);
        self.traits
            .apply(&mut shape, &TraitSource::Schema(schema), &self.ctx)?;

        let Some(shape) = self.mappers.update_shape(shape, schema, &self.ctx) else {
            return Ok(None);
        };

        if !shape.id.is_prelude() {
            index.insert(shape.clone())?;
        }
        Ok(Some(BuiltShape::Defined(shape)))
    }

    fn build_properties(
        &self,
        id: &ShapeId,
        schema: &Schema,
        index: &mut ShapeIndex,
        depth: usize,
    ) -> Result<IndexMap<String, MemberShape>> {
        let mut members = IndexMap::new();

        for (name, property) in &schema.properties {
            let member_name = sanitize_identifier(name);
            let Some(mut member) = self.build_member(
                id.with_member(member_name.as_str()),
                &to_pascal_case(name),
                property,
                id,
                index,
                depth + 1,
            )?
            else {
                continue;
            };

            if schema.required.iter().any(|r| r == name) {
                member.apply_trait(Trait::Required)?;
            }
            if members.contains_key(&member_name) {
                return Err(ConverterError::DuplicateMember {
                    shape: id.to_string(),
                    member: member_name,
                });
            }
            members.insert(member_name, member);
        }

        Ok(members)
    }

    /// Build a member of `container` whose target comes from `schema`
    ///
    /// `nested_name` names the target when it is an inline aggregate.
    pub(crate) fn build_member(
        &self,
        member_id: ShapeId,
        nested_name: &str,
        schema: &RefOr<Schema>,
        container: &ShapeId,
        index: &mut ShapeIndex,
        depth: usize,
    ) -> Result<Option<MemberShape>> {
        let target = self.ctx.shape_id(nested_name);
        let Some(built) = self.build_at(&target, schema, Some(container), index, depth)? else {
            return Ok(None);
        };

        let mut member = MemberShape::new(member_id, built.id().clone());
        if let BuiltShape::Defined(shape) = &built {
            if shape.id.is_prelude() {
                for value in shape.traits.iter() {
                    member.apply_trait(value.clone())?;
                }
            }
        }

        Ok(Some(member))
    }

    /// Shape kind for a schema's declared type and format
    fn schema_kind(&self, id: &ShapeId, schema: &Schema) -> Result<ShapeKind> {
        let format = schema.format.as_deref();

        let kind = match schema.schema_type.as_deref() {
            None | Some("object") => ShapeKind::Structure,
            Some("number") => match format {
                Some("float") => ShapeKind::Float,
                _ => ShapeKind::Double,
            },
            Some("integer") => match format {
                Some("int32") => ShapeKind::Integer,
                _ => ShapeKind::Long,
            },
            Some("string") => match format {
                Some("byte") => ShapeKind::Byte,
                Some("binary") => ShapeKind::Blob,
                Some("date") | Some("date-time") => ShapeKind::Timestamp,
                _ => ShapeKind::String,
            },
            Some("boolean") => ShapeKind::Boolean,
            Some("array") => {
                if schema.unique_items && !self.ctx.config.unique_items_as_list {
                    ShapeKind::Set
                } else {
                    ShapeKind::List
                }
            }
            Some(other) => {
                return Err(ConverterError::UnsupportedSchemaType {
                    shape: id.to_string(),
                    schema_type: other.to_string(),
                })
            }
        };

        Ok(kind)
    }
}

/// `PetList` -> `petList`
/// `base`, or `base` + `suffix` (then a counter) when `taken` rejects it
pub(crate) fn unique_member_name(base: &str, suffix: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }

    let suffixed = format!("{}{}", base, suffix);
    if !taken(&suffixed) {
        return suffixed;
    }

    let mut n = 2;
    loop {
        let candidate = format!("{}{}", suffixed, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

pub(crate) fn lower_camel(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}
