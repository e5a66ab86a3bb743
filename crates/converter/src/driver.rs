//! Conversion driver

use crate::builder::{BuiltShape, ShapeGraphBuilder};
use crate::config::{ConverterConfig, Settings};
use crate::context::ConversionContext;
use crate::extension::{CoreExtension, Extension};
use crate::mapper::{MapperPipeline, ShapeMapper};
use crate::openapi::OpenApiDocument;
use crate::resources::{PathTemplate, ResourceHierarchy, ResourceHierarchyBuilder};
use crate::traits::{TraitMapper, TraitPipeline, TraitSource};
use oas2smithy_common::{
    Model, ModelAssembler, ModelValidator, Result, ServiceShape, Shape, ShapeBody, ShapeIndex,
};
use serde_json::Value;
use tracing::{debug, info};

/// Converts OpenAPI documents into Smithy models
///
/// A converter owns the mapper pipelines, the run settings and the
/// assembler that validates the result. Each call to [`convert`] works on
/// its own shape index, so one converter can convert several documents.
///
/// [`convert`]: Converter::convert
pub struct Converter {
    settings: Settings,
    traits: TraitPipeline,
    mappers: MapperPipeline,
    assembler: Box<dyn ModelAssembler>,
}

impl Converter {
    /// Converter with the core extension and the default validator
    pub fn new() -> Self {
        Self::bare().with_extension(&CoreExtension)
    }

    /// Converter without any mappers
    pub fn bare() -> Self {
        Self {
            settings: Settings::new(),
            traits: TraitPipeline::new(Vec::new()),
            mappers: MapperPipeline::default(),
            assembler: Box::new(ModelValidator::new()),
        }
    }

    /// Fold an extension's mappers into the pipelines
    pub fn with_extension(mut self, extension: &dyn Extension) -> Self {
        self.traits.extend(extension.trait_mappers());
        for mapper in extension.shape_mappers() {
            self.mappers.push(mapper);
        }
        self
    }

    pub fn with_mapper(mut self, mapper: Box<dyn ShapeMapper>) -> Self {
        self.mappers.push(mapper);
        self
    }

    pub fn with_trait_mapper(mut self, mapper: Box<dyn TraitMapper>) -> Self {
        self.traits.push(mapper);
        self
    }

    pub fn with_assembler(mut self, assembler: Box<dyn ModelAssembler>) -> Self {
        self.assembler = assembler;
        self
    }

    /// Set one configuration value, replacing any previous one
    pub fn put_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    /// Merge a settings map over the current settings
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings.extend(settings);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Convert `document` into a validated model
    pub fn convert(&self, document: &OpenApiDocument) -> Result<Model> {
        let config = ConverterConfig::from_settings(&self.settings)?;
        let ctx = ConversionContext::new(document, &config);
        info!(
            namespace = %config.namespace,
            service = %config.service_name,
            title = %document.info.title,
            "converting document"
        );
        debug!(trait_mappers = ?self.traits.names(), shape_mappers = ?self.mappers.names(), "pipelines ready");

        let mut index = ShapeIndex::new();
        self.mappers.before(&mut index, &ctx)?;

        let mut builder = ShapeGraphBuilder::new(ctx, &self.traits, &self.mappers);
        self.build_components(&builder, &mut index)?;
        let templates = self.build_operations(&mut builder, &mut index)?;

        let hierarchy = ResourceHierarchyBuilder::new(ctx).build(templates, &mut index)?;
        if let Some(service) = self.build_service(&ctx, hierarchy)? {
            index.insert(service)?;
        }
        debug!(shapes = index.len(), "shape graph built");

        let model = self.mappers.after(index.freeze(), &ctx)?;
        let model = self.assembler.assemble(model)?;

        info!(shapes = model.len(), "conversion finished");
        Ok(model)
    }

    fn build_components(&self, builder: &ShapeGraphBuilder<'_>, index: &mut ShapeIndex) -> Result<()> {
        let ctx = builder.context();
        let Some(components) = &ctx.document.components else {
            return Ok(());
        };

        for (name, schema) in &components.schemas {
            let id = ctx.shape_id(name);
            match builder.build_shape(&id, schema, None, index)? {
                Some(BuiltShape::Reference(target)) => {
                    debug!(shape = %id, target = %target, "component schema is an alias; no shape built")
                }
                Some(BuiltShape::Defined(_)) => {}
                None => debug!(shape = %id, "component schema dropped by mapper"),
            }
        }

        Ok(())
    }

    fn build_operations(
        &self,
        builder: &mut ShapeGraphBuilder<'_>,
        index: &mut ShapeIndex,
    ) -> Result<Vec<PathTemplate>> {
        let document = builder.context().document;
        let mut templates = Vec::with_capacity(document.paths.len());

        for (path, item) in &document.paths {
            let mut template = PathTemplate::new(path.as_str());
            for (method, op) in item.operations() {
                if let Some(id) = builder.build_operation(path, method, op, &item.parameters, index)? {
                    template.bind(method, id);
                }
            }
            templates.push(template);
        }

        Ok(templates)
    }

    fn build_service(
        &self,
        ctx: &ConversionContext<'_>,
        hierarchy: ResourceHierarchy,
    ) -> Result<Option<Shape>> {
        let mut service = Shape::with_body(
            ctx.service_id(),
            ShapeBody::Service(ServiceShape {
                version: ctx.document.info.version.clone(),
                resources: hierarchy.resources,
                operations: hierarchy.operations,
            }),
        );

        self.traits
            .apply(&mut service, &TraitSource::Document(ctx.document), ctx)?;
        Ok(self.mappers.update_service(service, ctx.document, ctx))
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}
