//! HTTP binding and error traits

use super::{SourceKind, TraitMapper, TraitSource};
use crate::context::ConversionContext;
use crate::openapi::{HttpMethod, ParameterLocation};
use oas2smithy_common::{trait_ids, ErrorFault, ShapeKind, Trait, Traitable};

/// Numeric status code of a response key (`"404"` -> 404)
pub(crate) fn numeric_status(status: &str) -> Option<u16> {
    status.parse().ok()
}

pub(crate) fn is_success(code: u16) -> bool {
    (200..300).contains(&code)
}

/// `error` trait on error structures
pub struct ErrorTraitMapper;

impl TraitMapper for ErrorTraitMapper {
    fn name(&self) -> &'static str {
        "error"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Response]
    }

    fn derive(
        &self,
        shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::Response { status, .. } = source else {
            return None;
        };
        if shape.kind() != ShapeKind::Structure {
            return None;
        }

        if *status == "default" {
            return Some(Trait::Error(ErrorFault::Client));
        }

        match numeric_status(status)? {
            400..=499 => Some(Trait::Error(ErrorFault::Client)),
            500..=599 => Some(Trait::Error(ErrorFault::Server)),
            _ => None,
        }
    }
}

/// `httpError` carrying the numeric status of an error response
pub struct HttpErrorTraitMapper;

impl TraitMapper for HttpErrorTraitMapper {
    fn name(&self) -> &'static str {
        "httpError"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Response]
    }

    fn derive(
        &self,
        shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::Response { status, .. } = source else {
            return None;
        };
        if shape.kind() != ShapeKind::Structure {
            return None;
        }

        numeric_status(status)
            .filter(|code| (400..600).contains(code))
            .map(Trait::HttpError)
    }
}

/// `httpHeader` for header parameters and response headers
pub struct HttpHeaderTraitMapper;

impl TraitMapper for HttpHeaderTraitMapper {
    fn name(&self) -> &'static str {
        "httpHeader"
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
        match source {
            TraitSource::Parameter(param) if param.location == ParameterLocation::Header => {
                Some(Trait::HttpHeader(param.name.clone()))
            }
            TraitSource::Header { name, .. } => Some(Trait::HttpHeader(name.to_string())),
            _ => None,
        }
    }
}

/// `httpLabel` for path parameters
pub struct HttpLabelTraitMapper;

impl TraitMapper for HttpLabelTraitMapper {
    fn name(&self) -> &'static str {
        "httpLabel"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Parameter]
    }

    fn derive(
        &self,
        _shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        match source {
            TraitSource::Parameter(param) if param.location == ParameterLocation::Path => {
                Some(Trait::HttpLabel)
            }
            _ => None,
        }
    }
}

/// `httpQuery` for query parameters
pub struct HttpQueryTraitMapper;

impl TraitMapper for HttpQueryTraitMapper {
    fn name(&self) -> &'static str {
        "httpQuery"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Parameter]
    }

    fn derive(
        &self,
        _shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        match source {
            TraitSource::Parameter(param) if param.location == ParameterLocation::Query => {
                Some(Trait::HttpQuery(param.name.clone()))
            }
            _ => None,
        }
    }
}

/// `httpPayload` on the body member of a request or a successful response
pub struct HttpPayloadTraitMapper;

impl TraitMapper for HttpPayloadTraitMapper {
    fn name(&self) -> &'static str {
        "httpPayload"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Response, SourceKind::RequestBody]
    }

    fn derive(
        &self,
        shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        if shape.kind() != ShapeKind::Member {
            return None;
        }

        let bound = [
            trait_ids::HTTP_HEADER,
            trait_ids::HTTP_LABEL,
            trait_ids::HTTP_QUERY,
        ]
        .iter()
        .any(|id| shape.has_trait(id));
        if bound {
            return None;
        }

        match source {
            TraitSource::RequestBody(_) => Some(Trait::HttpPayload),
            TraitSource::Response { status, .. } => numeric_status(status)
                .filter(|code| is_success(*code))
                .map(|_| Trait::HttpPayload),
            _ => None,
        }
    }
}

/// `http` binding: method, URI pattern and the first 2xx status declared
pub struct HttpTraitMapper;

impl TraitMapper for HttpTraitMapper {
    fn name(&self) -> &'static str {
        "http"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::HttpBinding]
    }

    fn derive(
        &self,
        shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::HttpBinding(binding) = source else {
            return None;
        };
        if shape.kind() != ShapeKind::Operation {
            return None;
        }

        let code = binding
            .operation
            .responses
            .keys()
            .filter_map(|status| numeric_status(status))
            .find(|code| is_success(*code));

        Some(Trait::Http {
            method: binding.method.to_string(),
            uri: binding.path.to_string(),
            code,
        })
    }
}

/// `collection` for list-style GETs and input-less POSTs on fixed paths
///
/// Pruned again for operations on identifier-less resources after the
/// build completes.
pub struct CollectionTraitMapper;

impl TraitMapper for CollectionTraitMapper {
    fn name(&self) -> &'static str {
        "collection"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::HttpBinding]
    }

    fn derive(
        &self,
        _shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::HttpBinding(binding) = source else {
            return None;
        };

        let collection = match binding.method {
            HttpMethod::Get => {
                let last = binding.path.rsplit('/').find(|s| !s.is_empty());
                !last.is_some_and(|segment| segment.contains('{'))
            }
            HttpMethod::Post => !binding.has_input && !binding.path.contains('{'),
            _ => false,
        };

        collection.then_some(Trait::Collection)
    }
}

/// `idempotent` for POST, PUT and DELETE
pub struct IdempotentTraitMapper;

impl TraitMapper for IdempotentTraitMapper {
    fn name(&self) -> &'static str {
        "idempotent"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::HttpBinding]
    }

    fn derive(
        &self,
        _shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::HttpBinding(binding) = source else {
            return None;
        };

        matches!(
            binding.method,
            HttpMethod::Post | HttpMethod::Put | HttpMethod::Delete
        )
        .then_some(Trait::Idempotent)
    }
}

/// `readonly` for GET
pub struct ReadonlyTraitMapper;

impl TraitMapper for ReadonlyTraitMapper {
    fn name(&self) -> &'static str {
        "readonly"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::HttpBinding]
    }

    fn derive(
        &self,
        _shape: &dyn Traitable,
        source: &TraitSource<'_>,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        match source {
            TraitSource::HttpBinding(binding) if binding.method == HttpMethod::Get => {
                Some(Trait::Readonly)
            }
            _ => None,
        }
    }
}
