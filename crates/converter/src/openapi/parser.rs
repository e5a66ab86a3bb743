//! OpenAPI document loader

use super::types::OpenApiDocument;
use oas2smithy_common::{ConverterError, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Serialization of an OpenAPI document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Guess the format from a file extension (`.yaml`/`.yml`, otherwise JSON)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                DocumentFormat::Yaml
            }
            _ => DocumentFormat::Json,
        }
    }
}

/// OpenAPI 3.0 document parser
///
/// Loads a document from JSON or YAML into the object graph consumed by
/// the converter.
pub struct OpenApiParser {
    /// Loaded document
    document: OpenApiDocument,
}

impl OpenApiParser {
    /// Load a document from a file, picking the format from its extension
    ///
    /// # Example
    /// ```rust,ignore
    /// let parser = OpenApiParser::from_file("petstore.yaml")?;
    /// let model = Converter::new().convert(parser.document())?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ConverterError::Parse(format!(
                "Failed to read OpenAPI file {}: {}",
                path.display(),
                e
            ))
        })?;

        let format = DocumentFormat::from_path(path);
        debug!(path = %path.display(), ?format, "loading OpenAPI document");

        match format {
            DocumentFormat::Json => Self::from_json(&content),
            DocumentFormat::Yaml => Self::from_yaml(&content),
        }
    }

    /// Parse a document from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let document: OpenApiDocument = serde_json::from_str(json)
            .map_err(|e| ConverterError::Parse(format!("Failed to parse OpenAPI JSON: {}", e)))?;

        Self::checked(document)
    }

    /// Parse a document from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document: OpenApiDocument = serde_yaml::from_str(yaml)
            .map_err(|e| ConverterError::Parse(format!("Failed to parse OpenAPI YAML: {}", e)))?;

        Self::checked(document)
    }

    fn checked(document: OpenApiDocument) -> Result<Self> {
        if !document.openapi.starts_with("3.") {
            return Err(ConverterError::Parse(format!(
                "Unsupported OpenAPI version {}; expected 3.x",
                document.openapi
            )));
        }
        Ok(Self { document })
    }

    /// Get reference to the parsed document
    pub fn document(&self) -> &OpenApiDocument {
        &self.document
    }

    pub fn into_document(self) -> OpenApiDocument {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_json() {
        let json = r#"{
            "openapi": "3.0.0",
            "info": {
                "title": "Test API",
                "version": "1.0.0"
            },
            "paths": {}
        }"#;

        let parser = OpenApiParser::from_json(json).unwrap();
        assert_eq!(parser.document().openapi, "3.0.0");
        assert_eq!(parser.document().info.title, "Test API");
    }

    #[test]
    fn test_parse_minimal_yaml() {
        let yaml = "openapi: 3.0.1\ninfo:\n  title: Pets\n  version: 1.0.0\npaths:\n  /pets:\n    get:\n      operationId: listPets\n";

        let parser = OpenApiParser::from_yaml(yaml).unwrap();
        let document = parser.into_document();
        assert_eq!(document.info.version, "1.0.0");
        assert!(document.paths.contains_key("/pets"));
    }

    #[test]
    fn test_reject_swagger_2() {
        let json = r#"{"openapi": "2.0", "info": {"title": "t", "version": "1"}}"#;
        assert!(OpenApiParser::from_json(json).is_err());
    }

    #[test]
    fn test_format_from_path() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.YAML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
    }
}
