//! Documentation and metadata traits copied from descriptive fields

use super::{applicable, SourceKind, TraitMapper, TraitSource};
use crate::context::ConversionContext;
use crate::openapi::ExternalDocs;
use indexmap::IndexMap;
use oas2smithy_common::{ShapeKind, Trait, Traitable};

fn non_empty(text: Option<&String>) -> Option<String> {
    text.map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// `deprecated` from the `deprecated` flag
pub struct DeprecatedTraitMapper;

impl TraitMapper for DeprecatedTraitMapper {
    fn name(&self) -> &'static str {
        "deprecated"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[
            SourceKind::Schema,
            SourceKind::Parameter,
            SourceKind::Header,
            SourceKind::Operation,
        ]
    }

    fn derive(
        &self,
        _shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let deprecated = match source {
            TraitSource::Schema(schema) => schema.deprecated,
            TraitSource::Parameter(param) => param.deprecated,
            TraitSource::Header { header, .. } => header.deprecated,
            TraitSource::Operation(op) => op.deprecated,
            _ => false,
        };

        deprecated.then_some(Trait::Deprecated {
            message: None,
            since: None,
        })
    }
}

/// `documentation` from descriptions
///
/// Operations fall back to their summary; the service takes the API
/// description.
pub struct DocumentationTraitMapper;

impl TraitMapper for DocumentationTraitMapper {
    fn name(&self) -> &'static str {
        "documentation"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[
            SourceKind::Schema,
            SourceKind::Parameter,
            SourceKind::Header,
            SourceKind::Operation,
            SourceKind::Document,
        ]
    }

    fn derive(
        &self,
        _shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let text = match source {
            TraitSource::Schema(schema) => non_empty(schema.description.as_ref()),
            TraitSource::Parameter(param) => non_empty(param.description.as_ref()),
            TraitSource::Header { header, .. } => non_empty(header.description.as_ref()),
            TraitSource::Operation(op) => non_empty(op.description.as_ref())
                .or_else(|| non_empty(op.summary.as_ref())),
            TraitSource::Document(doc) => non_empty(doc.info.description.as_ref()),
            _ => None,
        };

        text.map(Trait::Documentation)
    }
}

/// `externalDocumentation` from `externalDocs`
pub struct ExternalDocumentationTraitMapper;

impl TraitMapper for ExternalDocumentationTraitMapper {
    fn name(&self) -> &'static str {
        "externalDocumentation"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Schema, SourceKind::Operation, SourceKind::Document]
    }

    fn derive(
        &self,
        _shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let docs: &ExternalDocs = match source {
            TraitSource::Schema(schema) => schema.external_docs.as_ref()?,
            TraitSource::Operation(op) => op.external_docs.as_ref()?,
            TraitSource::Document(doc) => doc.external_docs.as_ref()?,
            _ => return None,
        };

        let label = non_empty(docs.description.as_ref()).unwrap_or_else(|| "Documentation".to_string());
        Some(Trait::ExternalDocumentation(IndexMap::from([(
            label,
            docs.url.clone(),
        )])))
    }
}

/// `tags` from operation tags
pub struct TagsTraitMapper;

impl TraitMapper for TagsTraitMapper {
    fn name(&self) -> &'static str {
        "tags"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Operation]
    }

    fn derive(
        &self,
        _shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        match source {
            TraitSource::Operation(op) if !op.tags.is_empty() => Some(Trait::Tags(op.tags.clone())),
            _ => None,
        }
    }
}

/// `title` from the API title, for services and resources
pub struct TitleTraitMapper;

impl TraitMapper for TitleTraitMapper {
    fn name(&self) -> &'static str {
        "title"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Document]
    }

    fn derive(
        &self,
        shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::Document(doc) = source else {
            return None;
        };

        let title = non_empty(Some(&doc.info.title))?;
        applicable(shape, "title", &[ShapeKind::Service, ShapeKind::Resource])
            .then_some(Trait::Title(title))
    }
}
