use serde::Serialize;
use serde_json::Value;

use crate::error::{ActiniaError, Result};

/// Immutable description of one module input or output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    name: String,
    description: String,
    #[serde(rename = "type")]
    param_type: String,
    default_value: Option<String>,
    optional: bool,
    schema: Value,
}

impl Parameter {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        param_type: impl Into<String>,
        optional: bool,
    ) -> Self {
        let param_type = param_type.into();
        Self {
            name: name.into(),
            description: description.into(),
            schema: serde_json::json!({ "type": param_type }),
            param_type,
            default_value: None,
            optional,
        }
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default_value = Some(default.into());
        self
    }

    /// Decodes a single parameter record of a module description.
    ///
    /// `name`, `description`, `optional` and `schema.type` are required. A missing
    /// `default` yields `None`, which is distinct from an empty default.
    pub fn from_record(record: &Value) -> Result<Self> {
        let name = required_str(record, "name")?;
        if name.is_empty() {
            return Err(ActiniaError::malformed("parameter", "empty 'name'"));
        }
        let description = required_str(record, "description").map_err(|e| named(e, name))?;
        let optional = record
            .get("optional")
            .and_then(Value::as_bool)
            .ok_or_else(|| malformed_field(name, "missing boolean 'optional'"))?;
        let schema = record
            .get("schema")
            .filter(|s| s.is_object())
            .ok_or_else(|| malformed_field(name, "missing 'schema' object"))?;
        let param_type = schema
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed_field(name, "missing 'schema.type'"))?;

        let default_value = record.get("default").map(|d| match d {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });

        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            param_type: param_type.to_string(),
            default_value,
            optional,
            schema: schema.clone(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn param_type(&self) -> &str {
        &self.param_type
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The full validation schema as sent by the service, uninterpreted.
    pub fn schema(&self) -> &Value {
        &self.schema
    }

    /// The schema serialized back to a JSON string.
    pub fn schema_json(&self) -> String {
        self.schema.to_string()
    }
}

fn required_str<'a>(record: &'a Value, field: &str) -> Result<&'a str> {
    record
        .get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| ActiniaError::malformed("parameter", format!("missing string '{}'", field)))
}

fn malformed_field(name: &str, reason: &str) -> ActiniaError {
    ActiniaError::malformed(format!("parameter '{}'", name), reason)
}

fn named(err: ActiniaError, name: &str) -> ActiniaError {
    match err {
        ActiniaError::MalformedDescriptor { reason, .. } => malformed_field(name, &reason),
        other => other,
    }
}
