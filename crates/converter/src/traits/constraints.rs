//! Value constraint traits derived from schema keywords

use super::{applicable, SourceKind, TraitMapper, TraitSource};
use crate::context::ConversionContext;
use oas2smithy_common::{ShapeKind, Trait, Traitable};
use serde_json::Value;
use tracing::warn;

/// Canned regular expression for an IPv4 dotted quad
pub const IPV4_PATTERN: &str =
    r"^(([01]?\d\d?|2[0-4]\d|25[0-5])\.){3}([01]?\d\d?|2[0-4]\d|25[0-5])$";

const NUMERIC_KINDS: [ShapeKind; 8] = [
    ShapeKind::Byte,
    ShapeKind::Short,
    ShapeKind::Integer,
    ShapeKind::Long,
    ShapeKind::Float,
    ShapeKind::Double,
    ShapeKind::BigDecimal,
    ShapeKind::BigInteger,
];

/// Patterns implied by string formats
fn format_pattern(format: &str) -> Option<&'static str> {
    match format {
        "ipv4" => Some(IPV4_PATTERN),
        _ => None,
    }
}

/// `enum` from the schema's allowed values
pub struct EnumTraitMapper;

impl TraitMapper for EnumTraitMapper {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Schema]
    }

    fn derive(
        &self,
        shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::Schema(schema) = source else {
            return None;
        };
        if schema.enum_values.is_empty() || !applicable(shape, "enum", &[ShapeKind::String]) {
            return None;
        }

        let values = schema
            .enum_values
            .iter()
            .filter(|v| !v.is_null())
            .map(|v| match v {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect();

        Some(Trait::Enum(values))
    }
}

/// `length` from minLength/maxLength, or minItems/maxItems
pub struct LengthTraitMapper;

impl TraitMapper for LengthTraitMapper {
    fn name(&self) -> &'static str {
        "length"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Schema]
    }

    fn derive(
        &self,
        shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::Schema(schema) = source else {
            return None;
        };

        let (min, max) = if schema.min_length.is_some() || schema.max_length.is_some() {
            (schema.min_length, schema.max_length)
        } else {
            (schema.min_items, schema.max_items)
        };
        if min.is_none() && max.is_none() {
            return None;
        }

        let kinds = [
            ShapeKind::List,
            ShapeKind::Set,
            ShapeKind::Map,
            ShapeKind::String,
            ShapeKind::Blob,
        ];
        applicable(shape, "length", &kinds).then_some(Trait::Length { min, max })
    }
}

/// `pattern` from an explicit regex or a string format with a canned one
pub struct PatternTraitMapper;

impl TraitMapper for PatternTraitMapper {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Schema]
    }

    fn derive(
        &self,
        shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::Schema(schema) = source else {
            return None;
        };

        let pattern = match (&schema.pattern, schema.format.as_deref()) {
            (Some(pattern), _) => pattern.clone(),
            (None, Some(format)) => match format_pattern(format) {
                Some(pattern) => pattern.to_string(),
                None => {
                    if matches!(format, "email" | "ipv6" | "uri" | "hostname") {
                        warn!(shape = %shape.id(), format, "no pattern available for string format");
                    }
                    return None;
                }
            },
            (None, None) => return None,
        };

        applicable(shape, "pattern", &[ShapeKind::String]).then_some(Trait::Pattern(pattern))
    }
}

/// `range` from minimum/maximum
pub struct RangeTraitMapper;

impl TraitMapper for RangeTraitMapper {
    fn name(&self) -> &'static str {
        "range"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Schema]
    }

    fn derive(
        &self,
        shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::Schema(schema) = source else {
            return None;
        };
        if schema.minimum.is_none() && schema.maximum.is_none() {
            return None;
        }

        let exclusive = |flag: &Option<Value>| !matches!(flag, None | Some(Value::Bool(false)));
        if exclusive(&schema.exclusive_minimum) || exclusive(&schema.exclusive_maximum) {
            warn!(shape = %shape.id(), "exclusive bounds are not supported; range kept inclusive");
        }

        if !applicable(shape, "range", &NUMERIC_KINDS) {
            return None;
        }

        Some(Trait::Range {
            min: schema.minimum.clone(),
            max: schema.maximum.clone(),
        })
    }
}

/// `required` on members built from required parameters and headers
///
/// Structure properties get the trait from the parent's `required` list
/// while the structure is built.
pub struct RequiredTraitMapper;

impl TraitMapper for RequiredTraitMapper {
    fn name(&self) -> &'static str {
        "required"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Parameter, SourceKind::Header]
    }

    fn derive(
        &self,
        _shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let required = match source {
            TraitSource::Parameter(param) => param.required,
            TraitSource::Header { header, .. } => header.required,
            _ => false,
        };
        required.then_some(Trait::Required)
    }
}

/// `uniqueItems` when unique arrays are kept as lists
pub struct UniqueItemsTraitMapper;

impl TraitMapper for UniqueItemsTraitMapper {
    fn name(&self) -> &'static str {
        "uniqueItems"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Schema]
    }

    fn derive(
        &self,
        shape: &dyn Traitable,
        source: &TraitSource<'_>,
        ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::Schema(schema) = source else {
            return None;
        };

        let wanted = schema.is_array()
            && schema.unique_items
            && ctx.config.unique_items_as_list
            && shape.kind() == ShapeKind::List;
        wanted.then_some(Trait::UniqueItems)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::openapi::{Parameter, Schema};
    use oas2smithy_common::{MemberShape, Shape, ShapeBody, ShapeId};

    fn simple(kind: ShapeKind) -> Shape {
        Shape::simple(ShapeId::new("ns.foo", "Value"), kind).unwrap()
    }

    fn schema(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    fn list() -> Shape {
        let member = MemberShape::new(
            ShapeId::new("ns.foo", "Tags").with_member("member"),
            ShapeId::prelude("String"),
        );
        Shape::with_body(ShapeId::new("ns.foo", "Tags"), ShapeBody::List(member))
    }

    #[test]
    fn test_enum_only_on_strings() {
        let doc = empty_document();
        let config = config();
        let ctx = ConversionContext::new(&doc, &config);
        let schema = schema(r#"{"type": "string", "enum": ["available", "pending", "sold"]}"#);
        let source = TraitSource::Schema(&schema);

        assert_eq!(
            EnumTraitMapper.derive(&simple(ShapeKind::String), &source, &ctx),
            Some(Trait::Enum(vec![
                "available".into(),
                "pending".into(),
                "sold".into()
            ]))
        );
        assert_eq!(EnumTraitMapper.derive(&simple(ShapeKind::Integer), &source, &ctx), None);
    }

    #[test]
    fn test_length_prefers_string_bounds() {
        let doc = empty_document();
        let config = config();
        let ctx = ConversionContext::new(&doc, &config);

        let text = schema(r#"{"type": "string", "minLength": 1, "maxLength": 64}"#);
        assert_eq!(
            LengthTraitMapper.derive(&simple(ShapeKind::String), &TraitSource::Schema(&text), &ctx),
            Some(Trait::Length {
                min: Some(1),
                max: Some(64)
            })
        );

        let items = schema(r#"{"type": "array", "maxItems": 10}"#);
        assert_eq!(
            LengthTraitMapper.derive(&list(), &TraitSource::Schema(&items), &ctx),
            Some(Trait::Length {
                min: None,
                max: Some(10)
            })
        );

        assert_eq!(
            LengthTraitMapper.derive(&simple(ShapeKind::Long), &TraitSource::Schema(&text), &ctx),
            None
        );
    }

    #[test]
    fn test_pattern_sources() {
        let doc = empty_document();
        let config = config();
        let ctx = ConversionContext::new(&doc, &config);
        let string = simple(ShapeKind::String);

        let explicit = schema(r#"{"type": "string", "pattern": "^[a-z]+$", "format": "ipv4"}"#);
        assert_eq!(
            PatternTraitMapper.derive(&string, &TraitSource::Schema(&explicit), &ctx),
            Some(Trait::Pattern("^[a-z]+$".into()))
        );

        let ipv4 = schema(r#"{"type": "string", "format": "ipv4"}"#);
        assert_eq!(
            PatternTraitMapper.derive(&string, &TraitSource::Schema(&ipv4), &ctx),
            Some(Trait::Pattern(IPV4_PATTERN.into()))
        );

        let email = schema(r#"{"type": "string", "format": "email"}"#);
        assert_eq!(
            PatternTraitMapper.derive(&string, &TraitSource::Schema(&email), &ctx),
            None
        );
    }

    #[test]
    fn test_range_on_numbers_only() {
        let doc = empty_document();
        let config = config();
        let ctx = ConversionContext::new(&doc, &config);
        let bounds = schema(r#"{"type": "integer", "minimum": 1, "maximum": 100, "exclusiveMaximum": true}"#);
        let source = TraitSource::Schema(&bounds);

        let derived = RangeTraitMapper.derive(&simple(ShapeKind::Integer), &source, &ctx);
        assert_eq!(
            derived,
            Some(Trait::Range {
                min: Some(1.into()),
                max: Some(100.into())
            })
        );
        assert_eq!(RangeTraitMapper.derive(&simple(ShapeKind::String), &source, &ctx), None);
    }

    #[test]
    fn test_required_parameter() {
        let doc = empty_document();
        let config = config();
        let ctx = ConversionContext::new(&doc, &config);
        let member = MemberShape::new(
            ShapeId::new("ns.foo", "In").with_member("petId"),
            ShapeId::prelude("String"),
        );

        let required: Parameter =
            serde_json::from_str(r#"{"name": "petId", "in": "path", "required": true}"#).unwrap();
        let optional: Parameter = serde_json::from_str(r#"{"name": "q", "in": "query"}"#).unwrap();

        assert_eq!(
            RequiredTraitMapper.derive(&member, &TraitSource::Parameter(&required), &ctx),
            Some(Trait::Required)
        );
        assert_eq!(
            RequiredTraitMapper.derive(&member, &TraitSource::Parameter(&optional), &ctx),
            None
        );
    }

    #[test]
    fn test_unique_items_needs_list_flag() {
        let doc = empty_document();
        let unique = schema(r#"{"type": "array", "uniqueItems": true, "items": {"type": "string"}}"#);
        let source = TraitSource::Schema(&unique);

        let default_config = config();
        let ctx = ConversionContext::new(&doc, &default_config);
        assert_eq!(UniqueItemsTraitMapper.derive(&list(), &source, &ctx), None);

        let mut list_config = config();
        list_config.unique_items_as_list = true;
        let ctx = ConversionContext::new(&doc, &list_config);
        assert_eq!(
            UniqueItemsTraitMapper.derive(&list(), &source, &ctx),
            Some(Trait::UniqueItems)
        );
    }
}
