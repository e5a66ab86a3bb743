//! OpenAPI 3.0 type definitions
//!
//! Object graph of the parts of a document that drive shape construction.
//! Maps are [`IndexMap`]s so that paths, properties and responses are
//! visited in document order.

use indexmap::IndexMap;
use oas2smithy_common::{ConverterError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// Security requirement: scheme name to required scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// OpenAPI document root
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version (e.g., "3.0.0")
    pub openapi: String,

    /// API metadata
    pub info: Info,

    /// API paths (endpoints)
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,

    /// Reusable components
    #[serde(default)]
    pub components: Option<Components>,

    /// Servers
    #[serde(default)]
    pub servers: Vec<Server>,

    /// API-wide security requirements
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(rename = "externalDocs", default)]
    pub external_docs: Option<ExternalDocs>,
}

/// API information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,

    /// API version
    pub version: String,

    /// API description
    #[serde(default)]
    pub description: Option<String>,
}

/// Server information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Server {
    pub url: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// Link to documentation hosted elsewhere
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalDocs {
    pub url: String,

    #[serde(default)]
    pub description: Option<String>,
}

/// HTTP methods an OpenAPI path item can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
    Patch,
    Trace,
}

impl HttpMethod {
    /// Upper-case method name as used on the wire
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Path item (operations for a path)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(default)]
    pub get: Option<Operation>,

    #[serde(default)]
    pub post: Option<Operation>,

    #[serde(default)]
    pub put: Option<Operation>,

    #[serde(default)]
    pub delete: Option<Operation>,

    #[serde(default)]
    pub head: Option<Operation>,

    #[serde(default)]
    pub options: Option<Operation>,

    #[serde(default)]
    pub patch: Option<Operation>,

    #[serde(default)]
    pub trace: Option<Operation>,

    /// Parameters shared by every operation of the path
    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,
}

impl PathItem {
    /// Declared operations in a fixed verb order
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            (HttpMethod::Get, &self.get),
            (HttpMethod::Post, &self.post),
            (HttpMethod::Put, &self.put),
            (HttpMethod::Delete, &self.delete),
            (HttpMethod::Head, &self.head),
            (HttpMethod::Options, &self.options),
            (HttpMethod::Patch, &self.patch),
            (HttpMethod::Trace, &self.trace),
        ]
        .into_iter()
        .filter_map(|(method, op)| op.as_ref().map(|op| (method, op)))
    }
}

/// HTTP operation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    /// Operation ID (unique identifier)
    #[serde(rename = "operationId")]
    #[serde(default)]
    pub operation_id: Option<String>,

    #[serde(default)]
    pub summary: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub parameters: Vec<RefOr<Parameter>>,

    #[serde(rename = "requestBody")]
    #[serde(default)]
    pub request_body: Option<RefOr<RequestBody>>,

    /// Responses keyed by status code or `default`
    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,

    /// Tags (for grouping)
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub deprecated: bool,

    /// Overrides the API-wide requirements when present
    #[serde(default)]
    pub security: Option<Vec<SecurityRequirement>>,

    #[serde(rename = "externalDocs", default)]
    pub external_docs: Option<ExternalDocs>,
}

/// Where a parameter travels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    Query,
    Header,
    Path,
    Cookie,
}

/// Parameter definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParameterLocation,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub deprecated: bool,

    #[serde(default)]
    pub schema: Option<RefOr<Schema>>,
}

/// Request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub description: Option<String>,

    /// Content types
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,

    #[serde(default)]
    pub required: bool,
}

/// Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub headers: IndexMap<String, RefOr<Header>>,

    /// Content types
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

/// Response header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Header {
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default)]
    pub deprecated: bool,

    #[serde(default)]
    pub schema: Option<RefOr<Schema>>,
}

/// Media type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default)]
    pub schema: Option<RefOr<Schema>>,
}

/// Either an inline object or a `$ref` to one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefOr<T> {
    /// Reference to a definition elsewhere
    Reference {
        #[serde(rename = "$ref")]
        ref_path: String,
    },

    /// Inline definition
    Item(T),
}

impl<T> RefOr<T> {
    pub fn as_item(&self) -> Option<&T> {
        match self {
            RefOr::Item(item) => Some(item),
            RefOr::Reference { .. } => None,
        }
    }

    pub fn reference(&self) -> Option<&str> {
        match self {
            RefOr::Reference { ref_path } => Some(ref_path),
            RefOr::Item(_) => None,
        }
    }
}

/// XML serialization hints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Xml {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub namespace: Option<String>,

    #[serde(default)]
    pub prefix: Option<String>,

    #[serde(default)]
    pub attribute: bool,

    #[serde(default)]
    pub wrapped: bool,
}

/// Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Type: string, number, integer, boolean, array, object
    #[serde(rename = "type")]
    #[serde(default)]
    pub schema_type: Option<String>,

    /// Format (e.g., int32, int64, date-time)
    #[serde(default)]
    pub format: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Properties (for object type)
    #[serde(default)]
    pub properties: IndexMap<String, RefOr<Schema>>,

    /// Required properties
    #[serde(default)]
    pub required: Vec<String>,

    /// Items schema (for array type)
    #[serde(default)]
    pub items: Option<Box<RefOr<Schema>>>,

    /// Enum values
    #[serde(rename = "enum")]
    #[serde(default)]
    pub enum_values: Vec<Value>,

    #[serde(default)]
    pub pattern: Option<String>,

    #[serde(rename = "minLength", default)]
    pub min_length: Option<u64>,

    #[serde(rename = "maxLength", default)]
    pub max_length: Option<u64>,

    #[serde(rename = "minItems", default)]
    pub min_items: Option<u64>,

    #[serde(rename = "maxItems", default)]
    pub max_items: Option<u64>,

    #[serde(default)]
    pub minimum: Option<Number>,

    #[serde(default)]
    pub maximum: Option<Number>,

    /// Boolean in 3.0, number in 3.1
    #[serde(rename = "exclusiveMinimum", default)]
    pub exclusive_minimum: Option<Value>,

    #[serde(rename = "exclusiveMaximum", default)]
    pub exclusive_maximum: Option<Value>,

    #[serde(rename = "uniqueItems", default)]
    pub unique_items: bool,

    #[serde(default)]
    pub deprecated: bool,

    #[serde(default)]
    pub xml: Option<Xml>,

    #[serde(rename = "externalDocs", default)]
    pub external_docs: Option<ExternalDocs>,

    #[serde(rename = "oneOf", default)]
    pub one_of: Vec<RefOr<Schema>>,

    #[serde(rename = "anyOf", default)]
    pub any_of: Vec<RefOr<Schema>>,

    #[serde(rename = "allOf", default)]
    pub all_of: Vec<RefOr<Schema>>,
}

impl Schema {
    /// Whether the schema combines other schemas
    pub fn is_composition(&self) -> bool {
        !self.one_of.is_empty() || !self.any_of.is_empty() || !self.all_of.is_empty()
    }

    pub fn is_array(&self) -> bool {
        self.schema_type.as_deref() == Some("array")
    }
}

/// Kind of a security scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecuritySchemeType {
    #[serde(rename = "apiKey")]
    ApiKey,

    #[serde(rename = "http")]
    Http,

    #[serde(rename = "oauth2")]
    OAuth2,

    #[serde(rename = "openIdConnect")]
    OpenIdConnect,

    #[serde(rename = "mutualTLS")]
    MutualTls,
}

/// Security scheme definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: SecuritySchemeType,

    /// HTTP auth scheme (`basic`, `bearer`, `digest`) for `http` schemes
    #[serde(default)]
    pub scheme: Option<String>,

    /// Header, query or cookie name for `apiKey` schemes
    #[serde(default)]
    pub name: Option<String>,

    #[serde(rename = "in", default)]
    pub location: Option<String>,

    #[serde(default)]
    pub description: Option<String>,
}

/// Reusable components
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, RefOr<Schema>>,

    #[serde(default)]
    pub parameters: IndexMap<String, RefOr<Parameter>>,

    #[serde(rename = "requestBodies")]
    #[serde(default)]
    pub request_bodies: IndexMap<String, RefOr<RequestBody>>,

    #[serde(default)]
    pub responses: IndexMap<String, RefOr<Response>>,

    #[serde(default)]
    pub headers: IndexMap<String, RefOr<Header>>,

    #[serde(rename = "securitySchemes")]
    #[serde(default)]
    pub security_schemes: IndexMap<String, RefOr<SecurityScheme>>,
}

/// An object that can live under `#/components/<section>`
pub trait Component: Sized {
    /// Name of the components section
    const SECTION: &'static str;

    fn lookup<'a>(components: &'a Components, name: &str) -> Option<&'a RefOr<Self>>;
}

impl Component for Parameter {
    const SECTION: &'static str = "parameters";

    fn lookup<'a>(components: &'a Components, name: &str) -> Option<&'a RefOr<Self>> {
        components.parameters.get(name)
    }
}

impl Component for RequestBody {
    const SECTION: &'static str = "requestBodies";

    fn lookup<'a>(components: &'a Components, name: &str) -> Option<&'a RefOr<Self>> {
        components.request_bodies.get(name)
    }
}

impl Component for Response {
    const SECTION: &'static str = "responses";

    fn lookup<'a>(components: &'a Components, name: &str) -> Option<&'a RefOr<Self>> {
        components.responses.get(name)
    }
}

impl Component for Header {
    const SECTION: &'static str = "headers";

    fn lookup<'a>(components: &'a Components, name: &str) -> Option<&'a RefOr<Self>> {
        components.headers.get(name)
    }
}

impl Component for SecurityScheme {
    const SECTION: &'static str = "securitySchemes";

    fn lookup<'a>(components: &'a Components, name: &str) -> Option<&'a RefOr<Self>> {
        components.security_schemes.get(name)
    }
}

/// Longest chain of component-to-component references followed
const MAX_REF_HOPS: usize = 16;

impl OpenApiDocument {
    /// Follow a local `#/components/<section>/<name>` reference to its definition
    ///
    /// # Example
    /// ```rust,ignore
    /// let param: &Parameter = doc.resolve(&operation.parameters[0])?;
    /// ```
    pub fn resolve<'a, T: Component>(&'a self, item: &'a RefOr<T>) -> Result<&'a T> {
        let mut current = item;

        for _ in 0..MAX_REF_HOPS {
            let ref_path = match current {
                RefOr::Item(item) => return Ok(item),
                RefOr::Reference { ref_path } => ref_path,
            };

            let prefix = format!("#/components/{}/", T::SECTION);
            let name = ref_path.strip_prefix(prefix.as_str()).ok_or_else(|| {
                ConverterError::UnsupportedReference {
                    shape: T::SECTION.to_string(),
                    reference: ref_path.clone(),
                }
            })?;

            current = self
                .components
                .as_ref()
                .and_then(|c| T::lookup(c, name))
                .ok_or_else(|| ConverterError::UnresolvedReference(ref_path.clone()))?;
        }

        Err(ConverterError::UnresolvedReference(format!(
            "reference chain in components/{} is too long",
            T::SECTION
        )))
    }

    /// Security schemes declared under components, resolved, in document order
    pub fn security_schemes(&self) -> Vec<(&str, &SecurityScheme)> {
        let Some(components) = &self.components else {
            return Vec::new();
        };

        components
            .security_schemes
            .iter()
            .filter_map(|(name, scheme)| {
                self.resolve(scheme)
                    .ok()
                    .map(|scheme| (name.as_str(), scheme))
            })
            .collect()
    }
}
