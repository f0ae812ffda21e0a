use serde_json::{Map, Value};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("JSON parse error - {0}")]
    Malformed(String),
    #[error("Invalid data. Expected a dictionary, but got {0}.")]
    NotAnObject(&'static str),
    #[error("Unsupported media type \"{0}\" in request.")]
    UnsupportedMediaType(String),
}

fn is_json_media_type(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

/// Parses a request body that must hold a JSON object. A body sent without a
/// `Content-Type` is read as JSON; any other declared media type is refused.
pub fn read_object(content_type: Option<&str>, body: &[u8]) -> Result<Map<String, Value>, PayloadError> {
    if let Some(content_type) = content_type {
        if !is_json_media_type(content_type) {
            return Err(PayloadError::UnsupportedMediaType(content_type.to_owned()));
        }
    }

    parse_object(body)
}

/// Parses a request body that must hold a JSON object.
pub fn parse_object(body: &[u8]) -> Result<Map<String, Value>, PayloadError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| PayloadError::Malformed(e.to_string()))?;

    match value {
        Value::Object(m) => Ok(m),
        Value::Array(_) => Err(PayloadError::NotAnObject("list")),
        Value::String(_) => Err(PayloadError::NotAnObject("str")),
        Value::Number(n) if n.is_f64() => Err(PayloadError::NotAnObject("float")),
        Value::Number(_) => Err(PayloadError::NotAnObject("int")),
        Value::Bool(_) => Err(PayloadError::NotAnObject("bool")),
        Value::Null => Err(PayloadError::NotAnObject("NoneType")),
    }
}
