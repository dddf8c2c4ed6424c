use serde_json::{Map, Value};

use crate::domain::{catalog::ToolSpec, error::DispatchError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
        }
    }
}

/// Outbound request relative to the configured base URL.
///
/// Path segments are kept unencoded; the HTTP layer escapes each one when it
/// joins them onto the base URL, so a value never spans more than one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamRequest {
    pub tool: &'static str,
    pub method: Method,
    pub segments: Vec<String>,
    pub query: Vec<(String, String)>,
}

impl UpstreamRequest {
    /// Fill the tool's path template and collect the present query values.
    /// Query pairs keep catalog order; arguments the tool does not declare are
    /// dropped.
    pub fn build(
        spec: &'static ToolSpec,
        arguments: &Map<String, Value>,
    ) -> Result<Self, DispatchError> {
        let mut values = Vec::new();
        for param in spec.path_params() {
            let value = arguments
                .get(param.name)
                .map(render)
                .transpose()
                .map_err(|reason| {
                    DispatchError::invalid(spec.name, format!("{}: {reason}", param.name))
                })?
                .flatten()
                .filter(|value| !value.is_empty())
                .ok_or_else(|| {
                    DispatchError::invalid(
                        spec.name,
                        format!("missing required parameter '{}'", param.name),
                    )
                })?;
            values.push((param.name, value));
        }
        let segments = spec
            .path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                segment
                    .strip_prefix('{')
                    .and_then(|rest| rest.strip_suffix('}'))
                    .and_then(|name| values.iter().find(|(param, _)| *param == name))
                    .map_or_else(|| segment.to_string(), |(_, value)| value.clone())
            })
            .collect();

        let mut query = Vec::new();
        for param in spec.query_params() {
            let Some(raw) = arguments.get(param.name) else {
                continue;
            };
            let rendered = render(raw).map_err(|reason| {
                DispatchError::invalid(spec.name, format!("{}: {reason}", param.name))
            })?;
            if let Some(value) = rendered {
                query.push((param.name.to_string(), value));
            }
        }

        for key in arguments.keys() {
            if spec.param(key).is_none() {
                tracing::debug!(tool = spec.name, argument = %key, "ignoring unrecognized argument");
            }
        }

        Ok(Self {
            tool: spec.name,
            method: Method::Get,
            segments,
            query,
        })
    }

    /// Unencoded path for logs and assertions.
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }
}

/// String form of an argument value; `None` means the value is absent.
pub fn render(value: &Value) -> Result<Option<String>, String> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(flag) => Ok(Some(flag.to_string())),
        Value::Number(number) => Ok(Some(render_number(number))),
        Value::String(text) => Ok(Some(text.clone())),
        Value::Array(items) => {
            let mut parts = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Array(_) | Value::Object(_) => {
                        return Err("nested values are not supported".into());
                    }
                    other => parts.push(render(other)?.unwrap_or_default()),
                }
            }
            Ok(Some(parts.join(",")))
        }
        Value::Object(_) => Err("objects are not supported".into()),
    }
}

// Largest integer an f64 represents exactly.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

fn render_number(number: &serde_json::Number) -> String {
    if let Some(int) = number.as_i64() {
        return int.to_string();
    }
    if let Some(int) = number.as_u64() {
        return int.to_string();
    }
    match number.as_f64() {
        Some(float) if float.fract() == 0.0 && float.abs() <= MAX_EXACT_FLOAT => {
            (float as i64).to_string()
        }
        Some(float) => float.to_string(),
        None => number.to_string(),
    }
}
