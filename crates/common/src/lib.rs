//! Common types for the OpenAPI to Smithy converter
//!
//! This crate defines the semantic model shared by the converter, the
//! generator and the CLI: shape ids, shapes, traits, the per-run
//! [`ShapeIndex`], the frozen [`Model`] and the [`ModelAssembler`] contract
//! used to validate a finished model.

pub mod assembler;
pub mod index;
pub mod prelude;
pub mod shape;
pub mod shape_id;
pub mod traits;

pub use assembler::{AssemblyError, ModelAssembler, ModelValidator, Severity, ValidationEvent};
pub use index::{Model, ShapeIndex};
pub use prelude::{is_prelude_shape, prelude_id, prelude_shape};
pub use shape::{
    MemberShape, OperationShape, ResourceShape, ServiceShape, Shape, ShapeBody, ShapeKind,
    Traitable,
};
pub use shape_id::{is_identifier, sanitize_identifier, to_pascal_case, ShapeId, PRELUDE_NAMESPACE};
pub use traits::{trait_ids, ErrorFault, Protocol, Trait, TraitConflict, Traits};

use thiserror::Error;

/// Errors raised while converting a document into a model
#[derive(Error, Debug)]
pub enum ConverterError {
    /// Schema `type` has no shape kind
    #[error("Unsupported schema type '{schema_type}' for shape {shape}")]
    UnsupportedSchemaType { shape: String, schema_type: String },

    /// `oneOf`/`anyOf`/`allOf` on a schema
    #[error("Schema composition is not supported (shape {0})")]
    UnsupportedComposition(String),

    /// Reference outside the current document
    #[error("Unsupported reference '{reference}' for shape {shape}")]
    UnsupportedReference { shape: String, reference: String },

    /// Inline schema nesting exceeded the configured depth
    #[error("Schema nesting deeper than {depth} levels at shape {shape}; the schema is likely cyclic")]
    CyclicSchema { shape: String, depth: usize },

    #[error("Array schema for shape {0} has no items")]
    MissingItems(String),

    /// Request body media types declare different schemas
    #[error("Operation {0} declares different request body schemas per media type")]
    AmbiguousContent(String),

    /// Local component reference that does not exist
    #[error("Unresolved reference '{0}'")]
    UnresolvedReference(String),

    #[error("Conflicting values for trait {trait_id} on shape {shape}")]
    ConflictingTrait { shape: String, trait_id: String },

    #[error("Shape {shape} already has a member named {member}")]
    DuplicateMember { shape: String, member: String },

    #[error("A different shape with id {0} already exists")]
    DuplicateShape(String),

    #[error("Invalid shape: {0}")]
    InvalidShape(String),

    #[error("Invalid shape id '{0}'")]
    InvalidShapeId(String),

    #[error("Invalid value for setting '{key}': expected {expected}")]
    InvalidSetting { key: String, expected: String },

    /// Final model assembly reported errors
    #[error("Model assembly failed: {0}")]
    Assembly(#[from] AssemblyError),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for converter operations
pub type Result<T> = std::result::Result<T, ConverterError>;
