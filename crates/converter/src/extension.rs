//! Extension points
//!
//! An [`Extension`] contributes shape mappers and trait mappers to a
//! conversion run. Extensions are passed to the [`Converter`](crate::Converter)
//! explicitly; nothing is discovered at runtime.

use crate::mapper::{RemoveCollectionTrait, ShapeMapper};
use crate::traits::{builtin_mappers, TraitMapper};

/// A bundle of mappers folded into a conversion run
pub trait Extension {
    /// Mappers chained at the structural hook points
    fn shape_mappers(&self) -> Vec<Box<dyn ShapeMapper>> {
        Vec::new()
    }

    /// Trait rules appended after those already registered
    fn trait_mappers(&self) -> Vec<Box<dyn TraitMapper>> {
        Vec::new()
    }
}

/// Built-in trait rules and the post-build collection cleanup
pub struct CoreExtension;

impl Extension for CoreExtension {
    fn shape_mappers(&self) -> Vec<Box<dyn ShapeMapper>> {
        vec![Box::new(RemoveCollectionTrait)]
    }

    fn trait_mappers(&self) -> Vec<Box<dyn TraitMapper>> {
        builtin_mappers()
    }
}
