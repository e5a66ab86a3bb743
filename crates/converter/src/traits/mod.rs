//! Trait derivation
//!
//! A [`TraitMapper`] is a pure rule `(shape, source) -> Option<Trait>`. Each
//! mapper names the [`SourceKind`]s it derives from and the
//! [`TraitPipeline`] only calls it with a matching [`TraitSource`].
//!
//! ## Ordering
//!
//! Mappers run in registration order and are never re-sorted. Rules must
//! not depend on each other's output; two rules deriving different values
//! for the same trait id surface as a `ConflictingTrait` error.
//!
//! The built-in order is:
//!
//! 1. auth, collection, deprecated, documentation, enum, error,
//!    externalDocumentation
//! 2. httpError, httpHeader, httpLabel, httpPayload, httpQuery, http,
//!    idempotent
//! 3. length, pattern, protocols, range, readonly, required, tags, title,
//!    uniqueItems
//! 4. xmlAttribute, xmlFlattened, xmlName, xmlNamespace
//!
//! Examples are not derived; an extension can add a mapper for them.

mod auth;
mod constraints;
mod docs;
mod http;
mod xml;

pub use auth::{auth_scheme_name, AuthTraitMapper, ProtocolsTraitMapper};
pub use constraints::{
    EnumTraitMapper, LengthTraitMapper, PatternTraitMapper, RangeTraitMapper,
    RequiredTraitMapper, UniqueItemsTraitMapper,
};
pub use docs::{
    DeprecatedTraitMapper, DocumentationTraitMapper, ExternalDocumentationTraitMapper,
    TagsTraitMapper, TitleTraitMapper,
};
pub(crate) use http::{is_success, numeric_status};
pub use http::{
    CollectionTraitMapper, ErrorTraitMapper, HttpErrorTraitMapper, HttpHeaderTraitMapper,
    HttpLabelTraitMapper, HttpPayloadTraitMapper, HttpQueryTraitMapper, HttpTraitMapper,
    IdempotentTraitMapper, ReadonlyTraitMapper,
};
pub use xml::{
    XmlAttributeTraitMapper, XmlFlattenedTraitMapper, XmlNameTraitMapper,
    XmlNamespaceTraitMapper,
};

use crate::context::ConversionContext;
use crate::openapi::{
    Header, HttpMethod, OpenApiDocument, Operation, Parameter, RequestBody, Response, Schema,
};
use oas2smithy_common::{Result, ShapeKind, Trait, Traitable};
use tracing::{debug, warn};

/// Discriminant of a [`TraitSource`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Schema,
    Parameter,
    Header,
    RequestBody,
    Response,
    Operation,
    HttpBinding,
    Document,
}

/// HTTP method and path an operation is served on
#[derive(Debug, Clone, Copy)]
pub struct HttpBinding<'a> {
    pub method: HttpMethod,
    pub path: &'a str,
    pub operation: &'a Operation,

    /// Whether the operation ended up with an input shape
    pub has_input: bool,
}

/// Input object a trait is derived from
#[derive(Debug, Clone, Copy)]
pub enum TraitSource<'a> {
    Schema(&'a Schema),
    Parameter(&'a Parameter),
    Header { name: &'a str, header: &'a Header },
    RequestBody(&'a RequestBody),
    Response { status: &'a str, response: &'a Response },
    Operation(&'a Operation),
    HttpBinding(HttpBinding<'a>),
    Document(&'a OpenApiDocument),
}

impl TraitSource<'_> {
    pub fn kind(&self) -> SourceKind {
        match self {
            TraitSource::Schema(_) => SourceKind::Schema,
            TraitSource::Parameter(_) => SourceKind::Parameter,
            TraitSource::Header { .. } => SourceKind::Header,
            TraitSource::RequestBody(_) => SourceKind::RequestBody,
            TraitSource::Response { .. } => SourceKind::Response,
            TraitSource::Operation(_) => SourceKind::Operation,
            TraitSource::HttpBinding(_) => SourceKind::HttpBinding,
            TraitSource::Document(_) => SourceKind::Document,
        }
    }
}

/// A single trait derivation rule
pub trait TraitMapper {
    /// Name used in log output
    fn name(&self) -> &'static str;

    /// Source variants this rule derives from
    fn sources(&self) -> &'static [SourceKind];

    /// Derive a trait for `shape`, or nothing
    fn derive(
        &self,
        shape: &dyn Traitable,
        source: &TraitSource<'_>,
        ctx: &ConversionContext<'_>,
    ) -> Option<Trait>;
}

/// Ordered list of trait mappers
pub struct TraitPipeline {
    mappers: Vec<Box<dyn TraitMapper>>,
}

impl TraitPipeline {
    pub fn new(mappers: Vec<Box<dyn TraitMapper>>) -> Self {
        Self { mappers }
    }

    /// The built-in rules in their documented order
    pub fn builtin() -> Self {
        Self::new(builtin_mappers())
    }

    /// Append a mapper after every registered one
    pub fn push(&mut self, mapper: Box<dyn TraitMapper>) {
        self.mappers.push(mapper);
    }

    pub fn extend(&mut self, mappers: impl IntoIterator<Item = Box<dyn TraitMapper>>) {
        self.mappers.extend(mappers);
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    /// Mapper names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.mappers.iter().map(|m| m.name()).collect()
    }

    /// Run every mapper that handles `source` and apply what it derives
    pub fn apply<S: Traitable>(
        &self,
        shape: &mut S,
        source: &TraitSource<'_>,
        ctx: &ConversionContext<'_>,
    ) -> Result<()> {
        let kind = source.kind();

        for mapper in self.mappers.iter().filter(|m| m.sources().contains(&kind)) {
            if let Some(derived) = mapper.derive(&*shape, source, ctx) {
                debug!(shape = %shape.id(), mapper = mapper.name(), trait_id = derived.id(), "trait derived");
                shape.apply_trait(derived)?;
            }
        }

        Ok(())
    }
}

impl Default for TraitPipeline {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Built-in mappers in registration order
pub fn builtin_mappers() -> Vec<Box<dyn TraitMapper>> {
    vec![
        Box::new(AuthTraitMapper),
        Box::new(CollectionTraitMapper),
        Box::new(DeprecatedTraitMapper),
        Box::new(DocumentationTraitMapper),
        Box::new(EnumTraitMapper),
        Box::new(ErrorTraitMapper),
        Box::new(ExternalDocumentationTraitMapper),
        Box::new(HttpErrorTraitMapper),
        Box::new(HttpHeaderTraitMapper),
        Box::new(HttpLabelTraitMapper),
        Box::new(HttpPayloadTraitMapper),
        Box::new(HttpQueryTraitMapper),
        Box::new(HttpTraitMapper),
        Box::new(IdempotentTraitMapper),
        Box::new(LengthTraitMapper),
        Box::new(PatternTraitMapper),
        Box::new(ProtocolsTraitMapper),
        Box::new(RangeTraitMapper),
        Box::new(ReadonlyTraitMapper),
        Box::new(RequiredTraitMapper),
        Box::new(TagsTraitMapper),
        Box::new(TitleTraitMapper),
        Box::new(UniqueItemsTraitMapper),
        Box::new(XmlAttributeTraitMapper),
        Box::new(XmlFlattenedTraitMapper),
        Box::new(XmlNameTraitMapper),
        Box::new(XmlNamespaceTraitMapper),
    ]
}

/// Whether a trait may go on `shape`; logs and returns false otherwise
pub(crate) fn applicable(shape: &dyn Traitable, trait_name: &str, kinds: &[ShapeKind]) -> bool {
    if kinds.contains(&shape.kind()) {
        return true;
    }

    warn!(
        shape = %shape.id(),
        kind = %shape.kind(),
        trait_name,
        "trait does not apply to this shape kind; omitted"
    );
    false
}
