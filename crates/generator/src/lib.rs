//! Output generation for converted models
//!
//! This crate writes a [`Model`] either as the Smithy JSON AST
//! ([`JsonAstSerializer`]) or as Smithy IDL text ([`IdlGenerator`]).

mod ast;
mod idl;
mod templates;

pub use ast::{JsonAstSerializer, SMITHY_VERSION};
pub use idl::IdlGenerator;

use oas2smithy_common::{ConverterError, Model, Result};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Output representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Smithy JSON AST
    #[default]
    Json,

    /// Smithy IDL
    Idl,
}

impl OutputFormat {
    /// Conventional file extension
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Idl => "smithy",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Idl => write!(f, "idl"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = ConverterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "idl" | "smithy" => Ok(OutputFormat::Idl),
            other => Err(ConverterError::Generation(format!(
                "Unknown output format '{}' (expected json or idl)",
                other
            ))),
        }
    }
}

/// Render the model in the given format
pub fn generate(model: &Model, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => JsonAstSerializer::new().to_string_pretty(model),
        OutputFormat::Idl => IdlGenerator::new()?.generate(model),
    }
}

/// Render the model and write it to `output_path`
pub fn generate_to_file(model: &Model, format: OutputFormat, output_path: &Path) -> Result<()> {
    let rendered = generate(model, format)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            ConverterError::Generation(format!("Failed to create output directory: {}", e))
        })?;
    }

    fs::write(output_path, rendered).map_err(|e| {
        ConverterError::Generation(format!(
            "Failed to write {}: {}",
            output_path.display(),
            e
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("IDL".parse::<OutputFormat>().unwrap(), OutputFormat::Idl);
        assert_eq!("smithy".parse::<OutputFormat>().unwrap(), OutputFormat::Idl);
        assert!("yaml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Idl.extension(), "smithy");
    }
}
