//! OpenAPI 3.0 input model and loader

mod parser;
mod types;

pub use parser::{DocumentFormat, OpenApiParser};
pub use types::*;
