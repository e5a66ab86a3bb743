//! Auth and protocol traits

use super::{applicable, SourceKind, TraitMapper, TraitSource};
use crate::context::ConversionContext;
use crate::openapi::{OpenApiDocument, SecurityScheme, SecuritySchemeType};
use indexmap::IndexSet;
use oas2smithy_common::{Protocol, ShapeKind, Trait, Traitable};
use tracing::warn;

/// Auth scheme name for a security scheme, if the scheme is supported
///
/// | OpenAPI scheme  | auth scheme      |
/// |-----------------|------------------|
/// | http `basic`    | `http-basic`     |
/// | http `digest`   | `http-digest`    |
/// | http `bearer`   | `http-bearer`    |
/// | apiKey          | `http-x-api-key` |
pub fn auth_scheme_name(scheme: &SecurityScheme) -> Option<&'static str> {
    match scheme.scheme_type {
        SecuritySchemeType::ApiKey => Some("http-x-api-key"),
        SecuritySchemeType::Http => match scheme.scheme.as_deref().map(str::to_ascii_lowercase).as_deref() {
            Some("basic") => Some("http-basic"),
            Some("digest") => Some("http-digest"),
            Some("bearer") => Some("http-bearer"),
            _ => None,
        },
        _ => None,
    }
}

fn supported_schemes(doc: &OpenApiDocument) -> IndexSet<&'static str> {
    doc.security_schemes()
        .into_iter()
        .filter_map(|(name, scheme)| {
            let translated = auth_scheme_name(scheme);
            if translated.is_none() {
                warn!(scheme = name, scheme_type = ?scheme.scheme_type, "unsupported security scheme dropped");
            }
            translated
        })
        .collect()
}

/// `auth` from operation security, falling back to the API-wide requirements
pub struct AuthTraitMapper;

impl TraitMapper for AuthTraitMapper {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn sources(&self) -> &'static [SourceKind] {
        &[SourceKind::Operation]
    }

    fn derive(
        &self,
        shape: &dyn Traitable,
        source: &TraitSource<'_>,
        ctx: &ConversionContext<'_>,
    ) -> Option<Trait> {
        let TraitSource::Operation(op) = source else {
            return None;
        };
        if shape.kind() != ShapeKind::Operation {
            return None;
        }

        let requirements = op.security.as_ref().or(ctx.document.security.as_ref())?;
        let schemes = ctx.document.security_schemes();

        let mut auth: IndexSet<String> = IndexSet::new();
        for name in requirements.iter().flat_map(|req| req.keys()) {
            match schemes.iter().find(|(declared, _)| *declared == name.as_str()) {
                Some((_, scheme)) => match auth_scheme_name(scheme) {
                    Some(translated) => {
                        auth.insert(translated.to_string());
                    }
                    None => warn!(shape = %shape.id(), scheme = %name, "unsupported security scheme dropped"),
                },
                None => warn!(shape = %shape.id(), scheme = %name, "security requirement names an undeclared scheme"),
            }
        }

        (!auth.is_empty()).then(|| Trait::Auth(auth.into_iter().collect()))
    }
}

/// Protocol name for a media type (`application/json` -> `rest-json`)
fn protocol_name(media_type: &str) -> Option<String> {
    let essence = media_type.split(';').next()?.trim();
    let subtype = essence.split('/').nth(1)?;
    let subtype = subtype.rsplit('+').next()?.trim();
    (!subtype.is_empty()).then(|| format!("rest-{}", subtype.to_ascii_lowercase()))
}

/// `protocols` with one entry per content type family used by the API
pub struct ProtocolsTraitMapper;

impl TraitMapper for ProtocolsTraitMapper {
    fn name(&self) -> &'static str {
        "protocols"
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

        let mut names: IndexSet<String> = IndexSet::new();
        for (_, op) in doc.paths.values().flat_map(|item| item.operations()) {
            if let Some(body) = op.request_body.as_ref().and_then(|b| doc.resolve(b).ok()) {
                names.extend(body.content.keys().filter_map(|m| protocol_name(m)));
            }
            for response in op.responses.values().filter_map(|r| doc.resolve(r).ok()) {
                names.extend(response.content.keys().filter_map(|m| protocol_name(m)));
            }
        }

        if names.is_empty() || !applicable(shape, "protocols", &[ShapeKind::Service]) {
            return None;
        }

        let auth: Vec<String> = supported_schemes(doc)
            .into_iter()
            .map(str::to_string)
            .collect();

        Some(Trait::Protocols(
            names
                .into_iter()
                .map(|name| Protocol {
                    name,
                    auth: auth.clone(),
                })
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use oas2smithy_common::{OperationShape, ServiceShape, Shape, ShapeBody, ShapeId};

    const SECURED: &str = r##"{
        "openapi": "3.0.0",
        "info": {"title": "Secured", "version": "1.0"},
        "security": [{"basicAuth": []}],
        "paths": {
            "/pets": {
                "get": {
                    "operationId": "listPets",
                    "responses": {"200": {"description": "ok", "content": {"application/json": {}}}}
                },
                "post": {
                    "operationId": "createPet",
                    "security": [{"apiKey": []}, {"bearer": []}, {"oauth": []}, {"missing": []}],
                    "requestBody": {"content": {"application/xml": {}, "application/json": {}}},
                    "responses": {"201": {"description": "created"}}
                },
                "delete": {
                    "operationId": "deletePets",
                    "security": [],
                    "responses": {"204": {"description": "gone"}}
                }
            }
        },
        "components": {
            "securitySchemes": {
                "basicAuth": {"type": "http", "scheme": "basic"},
                "bearer": {"type": "http", "scheme": "bearer"},
                "apiKey": {"type": "apiKey", "name": "X-Api-Key", "in": "header"},
                "oauth": {"type": "oauth2"}
            }
        }
    }"##;

    fn operation() -> Shape {
        Shape::with_body(
            ShapeId::new("ns.foo", "op"),
            ShapeBody::Operation(OperationShape::default()),
        )
    }

    #[test]
    fn test_scheme_table() {
        let scheme: SecurityScheme =
            serde_json::from_str(r#"{"type": "http", "scheme": "Digest"}"#).unwrap();
        assert_eq!(auth_scheme_name(&scheme), Some("http-digest"));

        let scheme: SecurityScheme = serde_json::from_str(r#"{"type": "openIdConnect"}"#).unwrap();
        assert_eq!(auth_scheme_name(&scheme), None);
    }

    #[test]
    fn test_operation_security_overrides_api_default() {
        let doc = document(SECURED);
        let config = config();
        let ctx = ConversionContext::new(&doc, &config);
        let pets = &doc.paths["/pets"];

        let list = pets.get.as_ref().unwrap();
        assert_eq!(
            AuthTraitMapper.derive(&operation(), &TraitSource::Operation(list), &ctx),
            Some(Trait::Auth(vec!["http-basic".into()]))
        );

        let create = pets.post.as_ref().unwrap();
        assert_eq!(
            AuthTraitMapper.derive(&operation(), &TraitSource::Operation(create), &ctx),
            Some(Trait::Auth(vec!["http-x-api-key".into(), "http-bearer".into()]))
        );

        let delete = pets.delete.as_ref().unwrap();
        assert_eq!(
            AuthTraitMapper.derive(&operation(), &TraitSource::Operation(delete), &ctx),
            None
        );
    }

    #[test]
    fn test_protocols_per_content_type() {
        let doc = document(SECURED);
        let config = config();
        let ctx = ConversionContext::new(&doc, &config);
        let service = Shape::with_body(
            ShapeId::new("ns.foo", "TestService"),
            ShapeBody::Service(ServiceShape::default()),
        );

        let auth = vec![
            "http-basic".to_string(),
            "http-bearer".to_string(),
            "http-x-api-key".to_string(),
        ];
        assert_eq!(
            ProtocolsTraitMapper.derive(&service, &TraitSource::Document(&doc), &ctx),
            Some(Trait::Protocols(vec![
                Protocol {
                    name: "rest-json".into(),
                    auth: auth.clone(),
                },
                Protocol {
                    name: "rest-xml".into(),
                    auth,
                },
            ]))
        );
    }

    #[test]
    fn test_protocol_name() {
        assert_eq!(protocol_name("application/json"), Some("rest-json".into()));
        assert_eq!(
            protocol_name("application/vnd.api+json; charset=utf-8"),
            Some("rest-json".into())
        );
        assert_eq!(protocol_name("text/plain"), Some("rest-plain".into()));
        assert_eq!(protocol_name("*"), None);
    }
}
