//! Resource hierarchy derived from URI paths
//!
//! Every literal path segment becomes a resource named
//! `Resource<Segment>`. A `{variable}` segment right after a literal is that
//! resource's identifier; identifiers of outer resources are inherited by
//! the resources nested under them, so `/a/{id1}/b/{id2}` gives `ResourceB`
//! both `id1` and `id2`.
//!
//! Operations are bound by verb:
//!
//! | Verb | Binding |
//! |------|---------|
//! | GET on `/<literal>/{id}` | `read` |
//! | POST | `create` |
//! | PUT | `update` |
//! | DELETE | `delete` |
//! | anything else | generic operation |

use crate::context::ConversionContext;
use crate::openapi::HttpMethod;
use indexmap::{IndexMap, IndexSet};
use oas2smithy_common::{
    to_pascal_case, ResourceShape, Result, Shape, ShapeBody, ShapeId, ShapeIndex,
};
use tracing::{debug, warn};

/// Operations built for one path, by verb
#[derive(Debug, Clone, PartialEq)]
pub struct PathTemplate {
    pub path: String,
    pub operations: Vec<(HttpMethod, ShapeId)>,
}

impl PathTemplate {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            operations: Vec::new(),
        }
    }

    pub fn bind(&mut self, method: HttpMethod, operation: ShapeId) {
        self.operations.push((method, operation));
    }

    /// Non-empty path segments
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }
}

/// Resources and operations to attach to the service
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceHierarchy {
    /// Top-level resources
    pub resources: IndexSet<ShapeId>,

    /// Operations whose path has no resource
    pub operations: IndexSet<ShapeId>,
}

/// Deepest resource of a path and whether the path ends in its identifier
struct Resolved {
    resource: ShapeId,
    addresses_instance: bool,
}

pub struct ResourceHierarchyBuilder<'a> {
    ctx: ConversionContext<'a>,
    resources: IndexMap<ShapeId, ResourceShape>,
    hierarchy: ResourceHierarchy,
}

impl<'a> ResourceHierarchyBuilder<'a> {
    pub fn new(ctx: ConversionContext<'a>) -> Self {
        Self {
            ctx,
            resources: IndexMap::new(),
            hierarchy: ResourceHierarchy::default(),
        }
    }

    /// Build resources for `templates` and add them to `index`
    ///
    /// Shallower paths are handled first so parent resources exist before
    /// their children.
    pub fn build(
        mut self,
        mut templates: Vec<PathTemplate>,
        index: &mut ShapeIndex,
    ) -> Result<ResourceHierarchy> {
        templates.sort_by(|a, b| {
            a.segments()
                .len()
                .cmp(&b.segments().len())
                .then_with(|| a.path.cmp(&b.path))
        });

        for template in &templates {
            self.add_template(template);
        }

        for (id, resource) in self.resources {
            debug!(resource = %id, identifiers = resource.identifiers.len(), "resource built");
            index.insert(Shape::with_body(id, ShapeBody::Resource(resource)))?;
        }

        Ok(self.hierarchy)
    }

    fn add_template(&mut self, template: &PathTemplate) {
        let segments = template.segments();

        let resolved = match segments.first() {
            Some(first) if variable_name(first).is_none() => {
                self.resolve(&segments, None, &IndexMap::new())
            }
            _ => {
                if !template.operations.is_empty() {
                    warn!(path = %template.path, "path has no leading resource segment; operations bound to the service");
                }
                for (_, op) in &template.operations {
                    self.hierarchy.operations.insert(op.clone());
                }
                return;
            }
        };

        for (method, op) in &template.operations {
            self.bind(&resolved, *method, op);
        }
    }

    /// Materialize the resources for `segments`, which starts with a literal
    fn resolve(
        &mut self,
        segments: &[&str],
        parent: Option<&ShapeId>,
        inherited: &IndexMap<String, ShapeId>,
    ) -> Resolved {
        let id = self
            .ctx
            .shape_id(&format!("Resource{}", to_pascal_case(segments[0])));
        let resource = self.resources.entry(id.clone()).or_default();

        for (name, target) in inherited {
            resource
                .identifiers
                .entry(name.clone())
                .or_insert_with(|| target.clone());
        }

        let identifier = segments.get(1).and_then(|s| variable_name(s));
        if let Some(name) = identifier {
            resource
                .identifiers
                .entry(name.to_string())
                .or_insert_with(|| ShapeId::prelude("String"));
        }
        let identifiers = resource.identifiers.clone();

        match parent {
            Some(parent) => {
                if let Some(parent) = self.resources.get_mut(parent) {
                    parent.resources.insert(id.clone());
                }
            }
            None => {
                self.hierarchy.resources.insert(id.clone());
            }
        }

        let consumed = if identifier.is_some() { 2 } else { 1 };
        let rest = &segments[consumed..];

        match rest.first() {
            None => Resolved {
                resource: id,
                addresses_instance: identifier.is_some(),
            },
            Some(next) if variable_name(next).is_some() => {
                warn!(resource = %id, segment = %next, "consecutive path variables; operations bound to the enclosing resource");
                Resolved {
                    resource: id,
                    addresses_instance: false,
                }
            }
            Some(_) => self.resolve(rest, Some(&id), &identifiers),
        }
    }

    fn bind(&mut self, resolved: &Resolved, method: HttpMethod, op: &ShapeId) {
        let Some(resource) = self.resources.get_mut(&resolved.resource) else {
            return;
        };

        let slot = match method {
            HttpMethod::Get if resolved.addresses_instance => Some(&mut resource.read),
            HttpMethod::Post => Some(&mut resource.create),
            HttpMethod::Put => Some(&mut resource.update),
            HttpMethod::Delete => Some(&mut resource.delete),
            _ => None,
        };

        match slot {
            Some(slot) if slot.is_none() => *slot = Some(op.clone()),
            Some(slot) => {
                warn!(
                    resource = %resolved.resource,
                    operation = %op,
                    bound = ?slot,
                    method = %method,
                    "lifecycle operation already bound; added as a generic operation"
                );
                resource.operations.insert(op.clone());
            }
            None => {
                resource.operations.insert(op.clone());
            }
        }
    }
}

/// `{petId}` -> `petId`
fn variable_name(segment: &str) -> Option<&str> {
    segment
        .strip_prefix('{')
        .and_then(|s| s.strip_suffix('}'))
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_name() {
        assert_eq!(variable_name("{petId}"), Some("petId"));
        assert_eq!(variable_name("pets"), None);
        assert_eq!(variable_name("{}"), None);
    }

    #[test]
    fn test_segments() {
        let template = PathTemplate::new("/pets//{petId}/");
        assert_eq!(template.segments(), vec!["pets", "{petId}"]);
    }
}
