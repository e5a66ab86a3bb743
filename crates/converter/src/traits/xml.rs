//! XML serialization traits from the schema `xml` object

use super::{applicable, SourceKind, TraitMapper, TraitSource};
use crate::context::ConversionContext;
use oas2smithy_common::{ShapeKind, Trait, Traitable};

const SCALAR_KINDS: [ShapeKind; 12] = [
    ShapeKind::Boolean,
    ShapeKind::Byte,
    ShapeKind::Short,
    ShapeKind::Integer,
    ShapeKind::Long,
    ShapeKind::Float,
    ShapeKind::Double,
    ShapeKind::BigDecimal,
    ShapeKind::BigInteger,
    ShapeKind::Blob,
    ShapeKind::String,
    ShapeKind::Timestamp,
];

/// `xmlAttribute` on scalars marked `attribute: true`
pub struct XmlAttributeTraitMapper;

impl TraitMapper for XmlAttributeTraitMapper {
    fn name(&self) -> &'static str {
        "xmlAttribute"
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
        schema.xml.as_ref().filter(|xml| xml.attribute)?;

        applicable(shape, "xmlAttribute", &SCALAR_KINDS).then_some(Trait::XmlAttribute)
    }
}

/// `xmlFlattened` on lists and sets that are not wrapped
pub struct XmlFlattenedTraitMapper;

impl TraitMapper for XmlFlattenedTraitMapper {
    fn name(&self) -> &'static str {
        "xmlFlattened"
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
        let xml = schema.xml.as_ref()?;

        let flattened = !xml.wrapped && matches!(shape.kind(), ShapeKind::List | ShapeKind::Set);
        flattened.then_some(Trait::XmlFlattened)
    }
}

/// `xmlName` from `xml.name`
pub struct XmlNameTraitMapper;

impl TraitMapper for XmlNameTraitMapper {
    fn name(&self) -> &'static str {
        "xmlName"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Schema]
    }

    fn derive(
        &self,
        _shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::Schema(schema) = source else {
            return None;
        };

        schema
            .xml
            .as_ref()
            .and_then(|xml| xml.name.clone())
            .filter(|name| !name.is_empty())
            .map(Trait::XmlName)
    }
}

/// `xmlNamespace` from `xml.namespace` and `xml.prefix`
pub struct XmlNamespaceTraitMapper;

impl TraitMapper for XmlNamespaceTraitMapper {
    fn name(&self) -> &'static str {
        "xmlNamespace"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Schema]
    }

    fn derive(
        &self,
        _shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::Schema(schema) = source else {
            return None;
        };
        let xml = schema.xml.as_ref()?;

        xml.namespace.as_ref().map(|uri| Trait::XmlNamespace {
            uri: uri.clone(),
            prefix: xml.prefix.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::openapi::Schema;
    use oas2smithy_common::{MemberShape, Shape, ShapeBody, ShapeId};

    fn schema(json: &str) -> Schema {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_attribute_only_on_scalars() {
        let doc = empty_document();
        let config = config();
        let ctx = ConversionContext::new(&doc, &config);
        let attr = schema(r#"{"type": "integer", "xml": {"attribute": true, "name": "id"}}"#);
        let source = TraitSource::Schema(&attr);

        let scalar = Shape::simple(ShapeId::new("ns.foo", "Id"), ShapeKind::Integer).unwrap();
        assert_eq!(XmlAttributeTraitMapper.derive(&scalar, &source, &ctx), Some(Trait::XmlAttribute));
        assert_eq!(XmlNameTraitMapper.derive(&scalar, &source, &ctx), Some(Trait::XmlName("id".into())));

        let structure = Shape::structure(ShapeId::new("ns.foo", "Pet"));
        assert_eq!(XmlAttributeTraitMapper.derive(&structure, &source, &ctx), None);
    }

    #[test]
    fn test_flattened_and_namespace() {
        let doc = empty_document();
        let config = config();
        let ctx = ConversionContext::new(&doc, &config);
        let member = MemberShape::new(
            ShapeId::new("ns.foo", "Tags").with_member("member"),
            ShapeId::prelude("String"),
        );
        let list = Shape::with_body(ShapeId::new("ns.foo", "Tags"), ShapeBody::List(member));

        let unwrapped = schema(r#"{"type": "array", "xml": {"namespace": "http://example.com/schema", "prefix": "ex"}}"#);
        let source = TraitSource::Schema(&unwrapped);
        assert_eq!(XmlFlattenedTraitMapper.derive(&list, &source, &ctx), Some(Trait::XmlFlattened));
        assert_eq!(
            XmlNamespaceTraitMapper.derive(&list, &source, &ctx),
            Some(Trait::XmlNamespace {
                uri: "http://example.com/schema".into(),
                prefix: Some("ex".into())
            })
        );

        let wrapped = schema(r#"{"type": "array", "xml": {"wrapped": true}}"#);
        assert_eq!(
            XmlFlattenedTraitMapper.derive(&list, &TraitSource::Schema(&wrapped), &ctx),
            None
        );
    }
}
