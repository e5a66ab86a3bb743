//! Per-run conversion context

use crate::config::ConverterConfig;
use crate::openapi::OpenApiDocument;
use oas2smithy_common::{sanitize_identifier, ConverterError, Result, ShapeId};

/// Read-only state shared by every step of one conversion run
#[derive(Debug, Clone, Copy)]
pub struct ConversionContext<'a> {
    /// Document being converted
    pub document: &'a OpenApiDocument,

    pub config: &'a ConverterConfig,
}

impl<'a> ConversionContext<'a> {
    pub fn new(document: &'a OpenApiDocument, config: &'a ConverterConfig) -> Self {
        Self { document, config }
    }

    /// Id of a shape in the run's namespace
    pub fn shape_id(&self, name: &str) -> ShapeId {
        ShapeId::new(self.config.namespace.as_str(), sanitize_identifier(name))
    }

    /// Id of the service shape
    pub fn service_id(&self) -> ShapeId {
        self.shape_id(&self.config.service_name)
    }

    /// Id named by a local `$ref` (its last path segment)
    ///
    /// References into other documents are rejected.
    pub fn shape_id_for_ref(&self, shape: &str, ref_path: &str) -> Result<ShapeId> {
        let unsupported = || ConverterError::UnsupportedReference {
            shape: shape.to_string(),
            reference: ref_path.to_string(),
        };

        if !ref_path.starts_with('#') {
            return Err(unsupported());
        }

        ref_path
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && *name != "#")
            .map(|name| self.shape_id(name))
            .ok_or_else(unsupported)
    }
}
