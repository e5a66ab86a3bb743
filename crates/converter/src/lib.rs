//! OpenAPI 3.0 to Smithy conversion
//!
//! This crate turns an OpenAPI document into a Smithy semantic model
//! ([`Model`]).
//!
//! ## Pipeline
//!
//! [`Converter::convert`] runs, strictly in order:
//!
//! 1. read [`ConverterConfig`] from the settings
//! 2. run the pre-build hooks of the [`MapperPipeline`]
//! 3. build a shape for every component schema ([`ShapeGraphBuilder`])
//! 4. build an operation for every path and verb, recording which verbs
//!    each path declares
//! 5. turn the paths into resources ([`ResourceHierarchyBuilder`]) and
//!    build the service
//! 6. run the post-build hooks
//! 7. validate the result with a [`ModelAssembler`](oas2smithy_common::ModelAssembler)
//!
//! Traits are derived by the [`TraitPipeline`] as each shape is built.
//!
//! ## Example
//!
//! ```rust,ignore
//! use oas2smithy_converter::{Converter, OpenApiParser};
//!
//! let parser = OpenApiParser::from_file("petstore.yaml")?;
//! let model = Converter::new()
//!     .put_setting("namespace", "example.petstore")
//!     .convert(parser.document())?;
//! ```

pub mod builder;
pub mod config;
pub mod context;
pub mod driver;
pub mod extension;
pub mod mapper;
pub mod openapi;
pub mod resources;
pub mod traits;

pub use builder::{BuiltShape, ShapeGraphBuilder};
pub use config::{ConverterConfig, Settings};
pub use context::ConversionContext;
pub use driver::Converter;
pub use extension::{CoreExtension, Extension};
pub use mapper::{MapperPipeline, RemoveCollectionTrait, ShapeMapper};
pub use oas2smithy_common::{ConverterError, Model, Result};
pub use openapi::{DocumentFormat, OpenApiDocument, OpenApiParser};
pub use resources::{PathTemplate, ResourceHierarchy, ResourceHierarchyBuilder};
pub use traits::{SourceKind, TraitMapper, TraitPipeline, TraitSource};
