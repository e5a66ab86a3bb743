//! Structural mappers
//!
//! A [`ShapeMapper`] observes and rewrites the model at five hook points.
//! The [`MapperPipeline`] sorts mappers by ascending priority (stable, so
//! equal priorities keep registration order) and chains them: each mapper
//! receives the previous mapper's output, and a mapper returning `None`
//! drops the shape and stops the chain.

mod remove_collection;

pub use remove_collection::RemoveCollectionTrait;

use crate::context::ConversionContext;
use crate::openapi::{OpenApiDocument, Operation, Schema};
use oas2smithy_common::{Model, Result, Shape, ShapeIndex};
use tracing::debug;

/// Hooks an extension can implement to adjust the generated model
///
/// Every hook defaults to passing its input through unchanged.
pub trait ShapeMapper {
    /// Name used in log output
    fn name(&self) -> &'static str;

    /// Lower values run first
    fn priority(&self) -> i8 {
        0
    }

    /// Runs once before any shape is built
    fn before(&self, _index: &mut ShapeIndex, _ctx: &ConversionContext<'_>) -> Result<()> {
        Ok(())
    }

    /// Scalar, collection and structure shapes built from a schema
    fn update_shape(
        &self,
        shape: Shape,
        _schema: &Schema,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Shape> {
        Some(shape)
    }

    fn update_operation(
        &self,
        operation: Shape,
        _source: &Operation,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Shape> {
        Some(operation)
    }

    fn update_service(
        &self,
        service: Shape,
        _document: &OpenApiDocument,
        _ctx: &ConversionContext<'_>,
    ) -> Option<Shape> {
        Some(service)
    }

    /// Runs once over the assembled model
    fn after(&self, model: Model, _ctx: &ConversionContext<'_>) -> Result<Model> {
        Ok(model)
    }
}

/// Priority-ordered chain of structural mappers
#[derive(Default)]
pub struct MapperPipeline {
    mappers: Vec<Box<dyn ShapeMapper>>,
}

impl MapperPipeline {
    pub fn new(mut mappers: Vec<Box<dyn ShapeMapper>>) -> Self {
        mappers.sort_by_key(|m| m.priority());
        Self { mappers }
    }

    /// Add a mapper, keeping the chain sorted by priority
    ///
    /// Mappers with equal priority keep their registration order.
    pub fn push(&mut self, mapper: Box<dyn ShapeMapper>) {
        self.mappers.push(mapper);
        self.mappers.sort_by_key(|m| m.priority());
    }

    /// Mapper names in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.mappers.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.mappers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappers.is_empty()
    }

    pub fn before(&self, index: &mut ShapeIndex, ctx: &ConversionContext<'_>) -> Result<()> {
        for mapper in &self.mappers {
            mapper.before(index, ctx)?;
        }
        Ok(())
    }

    pub fn update_shape(
        &self,
        shape: Shape,
        schema: &Schema,
        ctx: &ConversionContext<'_>,
    ) -> Option<Shape> {
        self.chain(shape, |mapper, shape| mapper.update_shape(shape, schema, ctx))
    }

    pub fn update_operation(
        &self,
        operation: Shape,
        source: &Operation,
        ctx: &ConversionContext<'_>,
    ) -> Option<Shape> {
        self.chain(operation, |mapper, shape| {
            mapper.update_operation(shape, source, ctx)
        })
    }

    pub fn update_service(
        &self,
        service: Shape,
        document: &OpenApiDocument,
        ctx: &ConversionContext<'_>,
    ) -> Option<Shape> {
        self.chain(service, |mapper, shape| {
            mapper.update_service(shape, document, ctx)
        })
    }

    pub fn after(&self, model: Model, ctx: &ConversionContext<'_>) -> Result<Model> {
        self.mappers
            .iter()
            .try_fold(model, |model, mapper| mapper.after(model, ctx))
    }

    fn chain<F>(&self, shape: Shape, mut apply: F) -> Option<Shape>
    where
        F: FnMut(&dyn ShapeMapper, Shape) -> Option<Shape>,
    {
        let mut current = shape;
        for mapper in &self.mappers {
            let id = current.id.clone();
            match apply(mapper.as_ref(), current) {
                Some(next) => current = next,
                None => {
                    debug!(shape = %id, mapper = mapper.name(), "shape dropped by mapper");
                    return None;
                }
            }
        }
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConverterConfig;
    use crate::openapi::OpenApiParser;
    use oas2smithy_common::{ShapeId, ShapeKind, Trait, Traitable};
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        name: &'static str,
        priority: i8,
        log: Rc<RefCell<Vec<&'static str>>>,
        drop: bool,
    }

    impl ShapeMapper for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn priority(&self) -> i8 {
            self.priority
        }

        fn update_shape(
            &self,
            mut shape: Shape,
            _schema: &Schema,
            _ctx: &ConversionContext<'_>,
        ) -> Option<Shape> {
            self.log.borrow_mut().push(self.name);
            if self.drop {
                return None;
            }
            shape.traits.replace(Trait::Documentation(self.name.to_string()));
            Some(shape)
        }
    }

    fn recorder(
        name: &'static str,
        priority: i8,
        drop: bool,
        log: &Rc<RefCell<Vec<&'static str>>>,
    ) -> Box<dyn ShapeMapper> {
        Box::new(Recorder {
            name,
            priority,
            log: Rc::clone(log),
            drop,
        })
    }

    fn run(pipeline: &MapperPipeline) -> Option<Shape> {
        let doc = OpenApiParser::from_json(r#"{"openapi": "3.0.0", "info": {"title": "t", "version": "1"}}"#)
            .unwrap()
            .into_document();
        let config = ConverterConfig::default();
        let ctx = ConversionContext::new(&doc, &config);
        let shape = Shape::simple(ShapeId::new("ns.foo", "Name"), ShapeKind::String).unwrap();
        pipeline.update_shape(shape, &Schema::default(), &ctx)
    }

    #[test]
    fn test_sorted_by_priority_then_registration() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let pipeline = MapperPipeline::new(vec![
            recorder("late", 10, false, &log),
            recorder("first", -5, false, &log),
            recorder("default-a", 0, false, &log),
            recorder("default-b", 0, false, &log),
        ]);

        assert_eq!(pipeline.names(), vec!["first", "default-a", "default-b", "late"]);

        let shape = run(&pipeline).unwrap();
        assert_eq!(*log.borrow(), vec!["first", "default-a", "default-b", "late"]);
        assert_eq!(
            shape.traits().iter().next(),
            Some(&Trait::Documentation("late".into()))
        );
    }

    #[test]
    fn test_none_short_circuits() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let pipeline = MapperPipeline::new(vec![
            recorder("keep", 0, false, &log),
            recorder("drop", 1, true, &log),
            recorder("never", 2, false, &log),
        ]);

        assert!(run(&pipeline).is_none());
        assert_eq!(*log.borrow(), vec!["keep", "drop"]);
    }
}
