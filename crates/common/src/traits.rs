//! Trait catalogue and per-shape trait maps
//!
//! A trait is identified by its absolute id (`smithy.api#http`) and a shape
//! holds at most one trait per id. Applying a trait that is already present
//! with an identical value is a no-op; applying a different value for the
//! same id is reported as a conflict instead of being resolved silently.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Map, Number, Value};
use std::fmt;

/// Well-known trait ids
pub mod trait_ids {
    pub const AUTH: &str = "smithy.api#auth";
    pub const COLLECTION: &str = "smithy.api#collection";
    pub const DEPRECATED: &str = "smithy.api#deprecated";
    pub const DOCUMENTATION: &str = "smithy.api#documentation";
    pub const ENUM: &str = "smithy.api#enum";
    pub const ERROR: &str = "smithy.api#error";
    pub const EXTERNAL_DOCUMENTATION: &str = "smithy.api#externalDocumentation";
    pub const HTTP: &str = "smithy.api#http";
    pub const HTTP_ERROR: &str = "smithy.api#httpError";
    pub const HTTP_HEADER: &str = "smithy.api#httpHeader";
    pub const HTTP_LABEL: &str = "smithy.api#httpLabel";
    pub const HTTP_PAYLOAD: &str = "smithy.api#httpPayload";
    pub const HTTP_QUERY: &str = "smithy.api#httpQuery";
    pub const IDEMPOTENT: &str = "smithy.api#idempotent";
    pub const LENGTH: &str = "smithy.api#length";
    pub const PATTERN: &str = "smithy.api#pattern";
    pub const PROTOCOLS: &str = "smithy.api#protocols";
    pub const RANGE: &str = "smithy.api#range";
    pub const READONLY: &str = "smithy.api#readonly";
    pub const REQUIRED: &str = "smithy.api#required";
    pub const TAGS: &str = "smithy.api#tags";
    pub const TITLE: &str = "smithy.api#title";
    pub const UNIQUE_ITEMS: &str = "smithy.api#uniqueItems";
    pub const XML_ATTRIBUTE: &str = "smithy.api#xmlAttribute";
    pub const XML_FLATTENED: &str = "smithy.api#xmlFlattened";
    pub const XML_NAME: &str = "smithy.api#xmlName";
    pub const XML_NAMESPACE: &str = "smithy.api#xmlNamespace";
}

/// Which side of the exchange an error is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorFault {
    Client,
    Server,
}

impl fmt::Display for ErrorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorFault::Client => write!(f, "client"),
            ErrorFault::Server => write!(f, "server"),
        }
    }
}

/// One entry of the service `protocols` trait
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Protocol {
    /// Protocol name, e.g. `rest-json`
    pub name: String,

    /// Auth schemes the protocol supports
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub auth: Vec<String>,
}

/// A structured annotation attached to a shape
#[derive(Debug, Clone, PartialEq)]
pub enum Trait {
    /// Auth schemes an operation accepts
    Auth(Vec<String>),

    /// Operation acts over a collection rather than a single instance
    Collection,

    Deprecated {
        message: Option<String>,
        since: Option<String>,
    },

    Documentation(String),

    /// Ordered list of allowed string values
    Enum(Vec<String>),

    Error(ErrorFault),

    /// Named links to external documentation
    ExternalDocumentation(IndexMap<String, String>),

    /// HTTP binding of an operation
    Http {
        method: String,
        uri: String,
        code: Option<u16>,
    },

    HttpError(u16),
    HttpHeader(String),
    HttpLabel,
    HttpPayload,
    HttpQuery(String),
    Idempotent,

    Length {
        min: Option<u64>,
        max: Option<u64>,
    },

    Pattern(String),
    Protocols(Vec<Protocol>),

    Range {
        min: Option<Number>,
        max: Option<Number>,
    },

    Readonly,
    Required,
    Tags(Vec<String>),
    Title(String),
    UniqueItems,
    XmlAttribute,
    XmlFlattened,
    XmlName(String),

    XmlNamespace {
        uri: String,
        prefix: Option<String>,
    },

    /// Trait outside the built-in catalogue, supplied by an extension
    Custom { id: String, value: Value },
}

impl Trait {
    /// Absolute id of the trait
    pub fn id(&self) -> &str {
        use trait_ids::*;

        match self {
            Trait::Auth(_) => AUTH,
            Trait::Collection => COLLECTION,
            Trait::Deprecated { .. } => DEPRECATED,
            Trait::Documentation(_) => DOCUMENTATION,
            Trait::Enum(_) => ENUM,
            Trait::Error(_) => ERROR,
            Trait::ExternalDocumentation(_) => EXTERNAL_DOCUMENTATION,
            Trait::Http { .. } => HTTP,
            Trait::HttpError(_) => HTTP_ERROR,
            Trait::HttpHeader(_) => HTTP_HEADER,
            Trait::HttpLabel => HTTP_LABEL,
            Trait::HttpPayload => HTTP_PAYLOAD,
            Trait::HttpQuery(_) => HTTP_QUERY,
            Trait::Idempotent => IDEMPOTENT,
            Trait::Length { .. } => LENGTH,
            Trait::Pattern(_) => PATTERN,
            Trait::Protocols(_) => PROTOCOLS,
            Trait::Range { .. } => RANGE,
            Trait::Readonly => READONLY,
            Trait::Required => REQUIRED,
            Trait::Tags(_) => TAGS,
            Trait::Title(_) => TITLE,
            Trait::UniqueItems => UNIQUE_ITEMS,
            Trait::XmlAttribute => XML_ATTRIBUTE,
            Trait::XmlFlattened => XML_FLATTENED,
            Trait::XmlName(_) => XML_NAME,
            Trait::XmlNamespace { .. } => XML_NAMESPACE,
            Trait::Custom { id, .. } => id,
        }
    }

    /// Node value of the trait as it appears in the JSON AST
    pub fn to_node(&self) -> Value {
        match self {
            Trait::Collection
            | Trait::HttpLabel
            | Trait::HttpPayload
            | Trait::Idempotent
            | Trait::Readonly
            | Trait::Required
            | Trait::UniqueItems
            | Trait::XmlAttribute
            | Trait::XmlFlattened => json!({}),
            Trait::Auth(schemes) | Trait::Tags(schemes) => json!(schemes),
            Trait::Documentation(text)
            | Trait::Pattern(text)
            | Trait::Title(text)
            | Trait::HttpHeader(text)
            | Trait::HttpQuery(text)
            | Trait::XmlName(text) => Value::String(text.clone()),
            Trait::Deprecated { message, since } => {
                let mut node = Map::new();
                insert_opt(&mut node, "message", message.clone().map(Value::String));
                insert_opt(&mut node, "since", since.clone().map(Value::String));
                Value::Object(node)
            }
            Trait::Enum(values) => Value::Array(
                values
                    .iter()
                    .map(|value| json!({ "value": value }))
                    .collect(),
            ),
            Trait::Error(fault) => Value::String(fault.to_string()),
            Trait::ExternalDocumentation(links) => json!(links),
            Trait::Http { method, uri, code } => {
                let mut node = Map::new();
                node.insert("method".to_string(), json!(method));
                node.insert("uri".to_string(), json!(uri));
                insert_opt(&mut node, "code", code.map(|c| json!(c)));
                Value::Object(node)
            }
            Trait::HttpError(code) => json!(code),
            Trait::Length { min, max } => {
                let mut node = Map::new();
                insert_opt(&mut node, "min", min.map(|v| json!(v)));
                insert_opt(&mut node, "max", max.map(|v| json!(v)));
                Value::Object(node)
            }
            Trait::Range { min, max } => {
                let mut node = Map::new();
                insert_opt(&mut node, "min", min.clone().map(Value::Number));
                insert_opt(&mut node, "max", max.clone().map(Value::Number));
                Value::Object(node)
            }
            Trait::Protocols(protocols) => json!(protocols),
            Trait::XmlNamespace { uri, prefix } => {
                let mut node = Map::new();
                node.insert("uri".to_string(), json!(uri));
                insert_opt(&mut node, "prefix", prefix.clone().map(Value::String));
                Value::Object(node)
            }
            Trait::Custom { value, .. } => value.clone(),
        }
    }
}

fn insert_opt(node: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        node.insert(key.to_string(), value);
    }
}

/// A different value was applied for a trait id already present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraitConflict {
    pub trait_id: String,
}

/// Traits of one shape, keyed by trait id in application order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Traits(IndexMap<String, Trait>);

impl Traits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a trait
    ///
    /// Re-applying an identical trait is a no-op. A different value for an
    /// id that is already present is rejected.
    pub fn apply(&mut self, value: Trait) -> std::result::Result<(), TraitConflict> {
        match self.0.get(value.id()) {
            Some(existing) if *existing == value => Ok(()),
            Some(_) => Err(TraitConflict {
                trait_id: value.id().to_string(),
            }),
            None => {
                self.0.insert(value.id().to_string(), value);
                Ok(())
            }
        }
    }

    /// Insert a trait, overwriting any previous value for the same id
    pub fn replace(&mut self, value: Trait) -> Option<Trait> {
        self.0.insert(value.id().to_string(), value)
    }

    pub fn remove(&mut self, id: &str) -> Option<Trait> {
        self.0.shift_remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Trait> {
        self.0.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Trait> {
        self.0.values()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Trait> for Traits {
    fn from_iter<I: IntoIterator<Item = Trait>>(iter: I) -> Self {
        let mut traits = Traits::new();
        for value in iter {
            traits.replace(value);
        }
        traits
    }
}
