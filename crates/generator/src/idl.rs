//! Smithy IDL rendering

use crate::templates::{load_templates, quote, MODEL_TEMPLATE};
use oas2smithy_common::{
    is_identifier, ConverterError, MemberShape, Model, Result, Shape, ShapeBody, ShapeId, Trait,
    Traitable, Traits, PRELUDE_NAMESPACE,
};
use serde::Serialize;
use serde_json::Value;
use tera::{Context, Tera};
use tracing::warn;

/// Renders a [`Model`] as Smithy 1.0 IDL
///
/// The IDL holds a single namespace: the namespace of the service shape, or
/// of the first shape when the model has no service. Shapes from other
/// namespaces are skipped with a warning.
pub struct IdlGenerator {
    tera: Tera,
}

#[derive(Debug, Serialize)]
struct ShapeView {
    keyword: &'static str,
    name: String,
    traits: Vec<String>,

    /// Whether the shape has a `{ ... }` body
    block: bool,
    version: Option<String>,
    members: Vec<MemberView>,
    properties: Vec<PropertyView>,
}

#[derive(Debug, Serialize)]
struct MemberView {
    name: String,
    target: String,
    traits: Vec<String>,
}

#[derive(Debug, Serialize)]
struct PropertyView {
    key: &'static str,
    value: String,
}

impl IdlGenerator {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tera: load_templates()?,
        })
    }

    /// Render the model
    pub fn generate(&self, model: &Model) -> Result<String> {
        let namespace = model
            .service()
            .or_else(|| model.shapes().next())
            .map(|shape| shape.id.namespace().to_string())
            .unwrap_or_else(|| "smithy.example".to_string());

        let shapes: Vec<ShapeView> = model
            .shapes()
            .filter(|shape| {
                let local = shape.id.namespace() == namespace;
                if !local {
                    warn!(shape = %shape.id, namespace = %namespace, "shape outside the rendered namespace skipped");
                }
                local
            })
            .map(|shape| shape_view(shape, &namespace))
            .collect();

        let mut context = Context::new();
        context.insert("namespace", &namespace);
        context.insert("shapes", &shapes);

        self.tera
            .render(MODEL_TEMPLATE, &context)
            .map_err(|e| ConverterError::Generation(format!("Template error: {:?}", e)))
    }
}

fn shape_view(shape: &Shape, namespace: &str) -> ShapeView {
    let mut view = ShapeView {
        keyword: shape.kind().keyword(),
        name: shape.id.name().to_string(),
        traits: trait_lines(&shape.traits, namespace),
        block: true,
        version: None,
        members: Vec::new(),
        properties: Vec::new(),
    };

    let mut property = |key: &'static str, value: String| {
        view.properties.push(PropertyView { key, value });
    };

    match &shape.body {
        ShapeBody::Simple(_) => view.block = false,
        ShapeBody::List(member) | ShapeBody::Set(member) => {
            view.members.push(member_view(member, namespace));
        }
        ShapeBody::Map { key, value } => {
            view.members.push(member_view(key, namespace));
            view.members.push(member_view(value, namespace));
        }
        ShapeBody::Structure(members) => {
            view.members = members
                .values()
                .map(|member| member_view(member, namespace))
                .collect();
        }
        ShapeBody::Operation(op) => {
            if let Some(input) = &op.input {
                property("input", relative(input, namespace));
            }
            if let Some(output) = &op.output {
                property("output", relative(output, namespace));
            }
            if !op.errors.is_empty() {
                property("errors", list(op.errors.iter(), namespace));
            }
        }
        ShapeBody::Resource(resource) => {
            if !resource.identifiers.is_empty() {
                let identifiers: Vec<String> = resource
                    .identifiers
                    .iter()
                    .map(|(name, target)| format!("{}: {}", name, relative(target, namespace)))
                    .collect();
                property("identifiers", format!("{{ {} }}", identifiers.join(", ")));
            }
            let lifecycle = [
                ("create", &resource.create),
                ("read", &resource.read),
                ("update", &resource.update),
                ("delete", &resource.delete),
                ("list", &resource.list),
            ];
            for (key, target) in lifecycle {
                if let Some(target) = target {
                    property(key, relative(target, namespace));
                }
            }
            if !resource.operations.is_empty() {
                property("operations", list(resource.operations.iter(), namespace));
            }
            if !resource.resources.is_empty() {
                property("resources", list(resource.resources.iter(), namespace));
            }
        }
        ShapeBody::Service(service) => {
            if !service.operations.is_empty() {
                property("operations", list(service.operations.iter(), namespace));
            }
            if !service.resources.is_empty() {
                property("resources", list(service.resources.iter(), namespace));
            }
            view.version = Some(service.version.clone());
        }
    }

    view
}

fn member_view(member: &MemberShape, namespace: &str) -> MemberView {
    MemberView {
        name: member.name().to_string(),
        target: relative(&member.target, namespace),
        traits: trait_lines(&member.traits, namespace),
    }
}

/// Shape reference as written in the IDL
///
/// Local and prelude shapes are referenced by name.
fn relative(id: &ShapeId, namespace: &str) -> String {
    if id.namespace() == namespace || id.namespace() == PRELUDE_NAMESPACE {
        id.name().to_string()
    } else {
        id.to_string()
    }
}

fn list<'a>(ids: impl Iterator<Item = &'a ShapeId>, namespace: &str) -> String {
    let names: Vec<String> = ids.map(|id| relative(id, namespace)).collect();
    format!("[{}]", names.join(", "))
}

fn trait_lines(traits: &Traits, namespace: &str) -> Vec<String> {
    traits.iter().map(|value| trait_line(value, namespace)).collect()
}

/// `@required`, `@http(method: "GET", uri: "/pets")`, `@title("Pets")`
fn trait_line(value: &Trait, namespace: &str) -> String {
    let name = match value.id().parse::<ShapeId>() {
        Ok(id) => relative(&id, namespace),
        Err(_) => value.id().to_string(),
    };

    match value.to_node() {
        Value::Object(entries) if entries.is_empty() => format!("@{}", name),
        Value::Object(entries) => {
            let fields: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{}: {}", node_key(key), node(value)))
                .collect();
            format!("@{}({})", name, fields.join(", "))
        }
        other => format!("@{}({})", name, node(&other)),
    }
}

/// Node value in IDL syntax
fn node(value: &Value) -> String {
    match value {
        Value::String(text) => quote(text),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(node).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(entries) => {
            let fields: Vec<String> = entries
                .iter()
                .map(|(key, value)| format!("{}: {}", node_key(key), node(value)))
                .collect();
            format!("{{{}}}", fields.join(", "))
        }
        other => other.to_string(),
    }
}

fn node_key(key: &str) -> String {
    if is_identifier(key) {
        key.to_string()
    } else {
        quote(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_trait_lines() {
        let ns = "ns.foo";
        assert_eq!(trait_line(&Trait::Required, ns), "@required");
        assert_eq!(
            trait_line(&Trait::Title("Pet \"Store\"".to_string()), ns),
            r#"@title("Pet \"Store\"")"#
        );
        assert_eq!(
            trait_line(
                &Trait::Http {
                    method: "GET".to_string(),
                    uri: "/pets".to_string(),
                    code: Some(200),
                },
                ns
            ),
            r#"@http(method: "GET", uri: "/pets", code: 200)"#
        );
        assert_eq!(
            trait_line(&Trait::Tags(vec!["a".to_string(), "b".to_string()]), ns),
            r#"@tags(["a", "b"])"#
        );
        assert_eq!(
            trait_line(
                &Trait::Custom {
                    id: "example.meta#origin".to_string(),
                    value: json!({"from": "openapi"}),
                },
                ns
            ),
            r#"@example.meta#origin(from: "openapi")"#
        );
    }

    #[test]
    fn test_relative_references() {
        assert_eq!(relative(&ShapeId::new("ns.foo", "Pet"), "ns.foo"), "Pet");
        assert_eq!(relative(&ShapeId::prelude("String"), "ns.foo"), "String");
        assert_eq!(
            relative(&ShapeId::new("ns.bar", "Pet"), "ns.foo"),
            "ns.bar#Pet"
        );
    }

    #[test]
    fn test_nested_node() {
        let value = json!([{"name": "rest-json", "auth": ["http-basic"]}]);
        assert_eq!(node(&value), r#"[{name: "rest-json", auth: ["http-basic"]}]"#);
    }
}
