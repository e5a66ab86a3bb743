//! Template loading

use oas2smithy_common::{ConverterError, Result};
use std::collections::HashMap;
use tera::{Tera, Value};

/// Name of the IDL model template
pub const MODEL_TEMPLATE: &str = "model.smithy";

/// Load all templates
pub fn load_templates() -> Result<Tera> {
    let mut tera = Tera::default();

    tera.register_filter("idl_string", idl_string_filter);

    tera.add_raw_template(
        MODEL_TEMPLATE,
        include_str!("../templates/model.smithy.tera"),
    )
    .map_err(|e| {
        ConverterError::Generation(format!("Failed to load {} template: {}", MODEL_TEMPLATE, e))
    })?;

    Ok(tera)
}

/// Filter to render a value as a quoted IDL string
fn idl_string_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("idl_string filter expects a string"))?;

    Ok(Value::String(quote(text)))
}

/// `a "b"` -> `"a \"b\""`
pub(crate) fn quote(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}
