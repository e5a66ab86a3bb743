//! Operation, input, output and error shapes

use super::{lower_camel, unique_member_name, ShapeGraphBuilder};
use crate::openapi::{
    HttpMethod, Operation, Parameter, ParameterLocation, RefOr, RequestBody, Response, Schema,
};
use crate::traits::{is_success, numeric_status, HttpBinding, TraitSource};
use http::StatusCode;
use indexmap::IndexSet;
use oas2smithy_common::{
    sanitize_identifier, to_pascal_case, ConverterError, MemberShape, OperationShape, Result,
    Shape, ShapeBody, ShapeId, ShapeIndex, Trait, Traitable,
};
use serde_json::Value;
use tracing::{debug, info, warn};

impl ShapeGraphBuilder<'_> {
    /// Build the operation for `method` on `path` with its input, output and
    /// error shapes
    ///
    /// Returns the operation id, or `None` when a mapper drops the operation.
    pub fn build_operation(
        &mut self,
        path: &str,
        method: HttpMethod,
        op: &Operation,
        path_parameters: &[RefOr<Parameter>],
        index: &mut ShapeIndex,
    ) -> Result<Option<ShapeId>> {
        let name = operation_name(path, method, op);
        let op_id = self.ctx.shape_id(&name);

        let parameters = self.merge_parameters(path_parameters, &op.parameters)?;
        let input = self.build_input(&op_id, op, &parameters, index)?;

        let mut output = None;
        let mut errors = IndexSet::new();

        for (status, response) in &op.responses {
            let response = self.ctx.document.resolve(response)?;

            if status == "default" {
                errors.insert(self.build_error(&op_id, status, None, response, index)?);
                continue;
            }

            match numeric_status(status) {
                Some(201) => {
                    if response.content.values().any(|m| m.schema.is_some()) {
                        warn!(operation = %op_id, "201 response content ignored");
                    }
                }
                Some(code) if is_success(code) => {
                    if output.is_some() {
                        warn!(operation = %op_id, status = %status, "additional success response ignored");
                        continue;
                    }
                    output = Some(self.build_output(&op_id, status, response, index)?);
                }
                Some(code) if (400..600).contains(&code) => {
                    errors.insert(self.build_error(&op_id, status, Some(code), response, index)?);
                }
                _ => warn!(operation = %op_id, status = %status, "unsupported response status ignored"),
            }
        }

        let has_input = input.is_some();
        let mut shape = Shape::with_body(
            op_id.clone(),
            ShapeBody::Operation(OperationShape {
                input,
                output,
                errors,
            }),
        );

        self.traits
            .apply(&mut shape, &TraitSource::Operation(op), &self.ctx)?;
        let binding = HttpBinding {
            method,
            path,
            operation: op,
            has_input,
        };
        self.traits
            .apply(&mut shape, &TraitSource::HttpBinding(binding), &self.ctx)?;

        let Some(shape) = self.mappers.update_operation(shape, op, &self.ctx) else {
            return Ok(None);
        };

        let id = shape.id.clone();
        index.insert(shape)?;
        Ok(Some(id))
    }

    /// Path-level parameters followed by the operation's own, which replace
    /// path-level ones with the same name and location
    fn merge_parameters<'p>(
        &'p self,
        shared: &'p [RefOr<Parameter>],
        own: &'p [RefOr<Parameter>],
    ) -> Result<Vec<&'p Parameter>> {
        let mut merged: Vec<&Parameter> = Vec::new();

        for param in shared.iter().chain(own) {
            let param = self.ctx.document.resolve(param)?;
            match merged
                .iter_mut()
                .find(|p| p.name == param.name && p.location == param.location)
            {
                Some(existing) => *existing = param,
                None => merged.push(param),
            }
        }

        Ok(merged)
    }

    fn build_input(
        &self,
        op_id: &ShapeId,
        op: &Operation,
        parameters: &[&Parameter],
        index: &mut ShapeIndex,
    ) -> Result<Option<ShapeId>> {
        let body = match &op.request_body {
            Some(body) => Some(self.ctx.document.resolve(body)?),
            None => None,
        };
        let body_schema = match body {
            Some(body) => request_body_schema(op_id, body)?,
            None => None,
        };

        let input_id = self.ctx.shape_id(&format!("{}Input", op_id.name()));

        if parameters.is_empty() {
            let Some(schema) = body_schema else {
                debug!(operation = %op_id, "operation has no input");
                return Ok(None);
            };
            let built = self.build_shape(&input_id, schema, None, index)?;
            return Ok(built.map(|b| b.id().clone()));
        }

        let mut input = Shape::structure(input_id.clone());

        // Path parameters keep their plain names so they match the URI labels
        let labels: Vec<String> = parameters
            .iter()
            .filter(|p| p.location == ParameterLocation::Path && p.schema.is_some())
            .map(|p| sanitize_identifier(&p.name))
            .collect();

        for param in parameters {
            if param.location == ParameterLocation::Cookie {
                warn!(operation = %op_id, parameter = %param.name, "cookie parameter skipped");
                continue;
            }
            let Some(schema) = &param.schema else {
                warn!(operation = %op_id, parameter = %param.name, "parameter without schema skipped");
                continue;
            };

            let base = sanitize_identifier(&param.name);
            let member_name = if param.location == ParameterLocation::Path {
                unique_member_name(&base, "Path", |name| input.member(name).is_some())
            } else {
                unique_member_name(&base, location_suffix(param.location), |name| {
                    input.member(name).is_some() || labels.iter().any(|label| label == name)
                })
            };
            if member_name != base {
                info!(operation = %op_id, parameter = %param.name, member = %member_name, "parameter member renamed to avoid a name clash");
            }

            let nested_name = format!("{}{}", to_pascal_case(&param.name), &member_name[base.len()..]);
            let Some(mut member) = self.build_member(
                input_id.with_member(member_name.as_str()),
                &nested_name,
                schema,
                &input_id,
                index,
                1,
            )?
            else {
                continue;
            };

            self.apply_overriding(&mut member, &TraitSource::Parameter(param))?;
            input.add_member(member)?;
        }

        if let (Some(body), Some(schema)) = (body, body_schema) {
            let target = self.ctx.shape_id(&format!("{}Body", input_id.name()));
            if let Some(built) = self.build_shape(&target, schema, None, index)? {
                let name = unique_member_name(&lower_camel(built.id().name()), "Body", |name| {
                    input.member(name).is_some()
                });
                let mut member = MemberShape::new(input_id.with_member(name), built.id().clone());
                if body.required {
                    member.apply_trait(Trait::Required)?;
                }
                self.traits
                    .apply(&mut member, &TraitSource::RequestBody(body), &self.ctx)?;
                input.add_member(member)?;
            }
        }

        index.insert(input)?;
        Ok(Some(input_id))
    }

    fn build_output(
        &self,
        op_id: &ShapeId,
        status: &str,
        response: &Response,
        index: &mut ShapeIndex,
    ) -> Result<ShapeId> {
        let output_id = self.ctx.shape_id(&format!("{}Output", op_id.name()));
        let mut output = Shape::structure(output_id.clone());

        self.add_response_members(&mut output, status, response, index)?;
        if output.members().is_empty() {
            info!(operation = %op_id, status = %status, "response has no headers or body");
        }

        self.traits.apply(
            &mut output,
            &TraitSource::Response { status, response },
            &self.ctx,
        )?;

        index.insert(output)?;
        Ok(output_id)
    }

    /// Error structure for a 4xx/5xx or `default` response
    ///
    /// Error names derive from the status, so operations share one shape per
    /// status while their response headers and body agree. A response that
    /// differs gets its own `<operation><Error>` shape.
    fn build_error(
        &mut self,
        op_id: &ShapeId,
        status: &str,
        code: Option<u16>,
        response: &Response,
        index: &mut ShapeIndex,
    ) -> Result<ShapeId> {
        let shared_id = self.ctx.shape_id(&error_name(code));
        let payload = serde_json::to_value((&response.headers, response_schema(response)))?;

        match self.error_payloads.get(&shared_id) {
            Some(existing) if *existing == payload => {
                debug!(shape = %shared_id, "reusing error shape");
                return Ok(shared_id);
            }
            None if !index.contains(&shared_id) => {
                self.define_error(&shared_id, status, response, index)?;
                self.error_payloads.insert(shared_id.clone(), payload);
                return Ok(shared_id);
            }
            _ => {}
        }

        let error_id = self.ctx.shape_id(&format!("{}{}", op_id.name(), shared_id.name()));
        warn!(
            operation = %op_id,
            shared = %shared_id,
            shape = %error_id,
            "error response differs from the shared error shape"
        );
        self.define_error(&error_id, status, response, index)?;
        Ok(error_id)
    }

    fn define_error(
        &self,
        error_id: &ShapeId,
        status: &str,
        response: &Response,
        index: &mut ShapeIndex,
    ) -> Result<()> {
        let mut error = Shape::structure(error_id.clone());
        self.add_response_members(&mut error, status, response, index)?;
        if error.members().is_empty() {
            error.add_member(MemberShape::new(
                error_id.with_member("message"),
                ShapeId::prelude("String"),
            ))?;
        }

        self.traits.apply(
            &mut error,
            &TraitSource::Response { status, response },
            &self.ctx,
        )?;

        index.insert(error)
    }

    /// Derive traits from a parameter or header onto its member
    ///
    /// Values derived here replace those the member took from its schema.
    fn apply_overriding(&self, member: &mut MemberShape, source: &TraitSource<'_>) -> Result<()> {
        let mut derived = MemberShape::new(member.id.clone(), member.target.clone());
        self.traits.apply(&mut derived, source, &self.ctx)?;

        for value in derived.traits.iter() {
            member.traits.replace(value.clone());
        }
        Ok(())
    }

    /// Header members and the body member of a response structure
    fn add_response_members(
        &self,
        shape: &mut Shape,
        status: &str,
        response: &Response,
        index: &mut ShapeIndex,
    ) -> Result<()> {
        let container = shape.id.clone();

        for (name, header) in &response.headers {
            let header = self.ctx.document.resolve(header)?;
            let Some(schema) = &header.schema else {
                warn!(shape = %container, header = %name, "header without schema skipped");
                continue;
            };

            let base = sanitize_identifier(name);
            let member_name = unique_member_name(&base, "Header", |n| shape.member(n).is_some());
            let nested_name = format!("{}{}", to_pascal_case(name), &member_name[base.len()..]);
            let Some(mut member) = self.build_member(
                container.with_member(member_name.as_str()),
                &nested_name,
                schema,
                &container,
                index,
                1,
            )?
            else {
                continue;
            };

            self.apply_overriding(&mut member, &TraitSource::Header { name, header })?;
            shape.add_member(member)?;
        }

        let Some(schema) = response_schema(response) else {
            return Ok(());
        };

        let target = self.ctx.shape_id(&format!("{}Body", container.name()));
        if let Some(built) = self.build_shape(&target, schema, None, index)? {
            let name = unique_member_name(&lower_camel(built.id().name()), "Body", |n| {
                shape.member(n).is_some()
            });
            let mut member = MemberShape::new(container.with_member(name), built.id().clone());
            self.traits.apply(
                &mut member,
                &TraitSource::Response { status, response },
                &self.ctx,
            )?;
            shape.add_member(member)?;
        }

        Ok(())
    }
}

/// Schema of the first media type that declares one
fn response_schema(response: &Response) -> Option<&RefOr<Schema>> {
    response.content.values().find_map(|m| m.schema.as_ref())
}

/// Suffix that separates a parameter from a member of the same name
fn location_suffix(location: ParameterLocation) -> &'static str {
    match location {
        ParameterLocation::Query => "Query",
        ParameterLocation::Header => "Header",
        ParameterLocation::Path => "Path",
        ParameterLocation::Cookie => "Cookie",
    }
}

/// `operationId`, or `<method><PascalPath>` when the document has none
fn operation_name(path: &str, method: HttpMethod, op: &Operation) -> String {
    match &op.operation_id {
        Some(id) => id.clone(),
        None => {
            let name = format!(
                "{}{}",
                method.as_str().to_ascii_lowercase(),
                to_pascal_case(path)
            );
            info!(path = %path, method = %method, operation = %name, "operationId missing, name synthesized");
            name
        }
    }
}

/// `NotFoundException`, `UnexpectedException` for `default`
fn error_name(code: Option<u16>) -> String {
    let Some(code) = code else {
        return "UnexpectedException".to_string();
    };

    match StatusCode::from_u16(code)
        .ok()
        .and_then(|status| status.canonical_reason())
    {
        Some(reason) => format!("{}Exception", to_pascal_case(reason)),
        None => format!("Status{code}Exception"),
    }
}

/// The single schema a request body carries across its media types
fn request_body_schema<'b>(op_id: &ShapeId, body: &'b RequestBody) -> Result<Option<&'b RefOr<Schema>>> {
    let mut schemas = body.content.values().filter_map(|m| m.schema.as_ref());
    let Some(first) = schemas.next() else {
        return Ok(None);
    };

    if schemas.any(|other| other != first) {
        return Err(ConverterError::AmbiguousContent(op_id.to_string()));
    }
    Ok(Some(first))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_name() {
        assert_eq!(error_name(Some(404)), "NotFoundException");
        assert_eq!(error_name(Some(500)), "InternalServerErrorException");
        assert_eq!(error_name(Some(400)), "BadRequestException");
        assert_eq!(error_name(Some(599)), "Status599Exception");
        assert_eq!(error_name(None), "UnexpectedException");
    }

    #[test]
    fn test_operation_name() {
        let named = Operation {
            operation_id: Some("listPets".to_string()),
            ..Default::default()
        };
        assert_eq!(operation_name("/pets", HttpMethod::Get, &named), "listPets");

        let anonymous = Operation::default();
        assert_eq!(
            operation_name("/pets/{petId}", HttpMethod::Delete, &anonymous),
            "deletePetsPetId"
        );
    }
}
