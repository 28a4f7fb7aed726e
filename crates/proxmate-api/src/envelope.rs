// Response envelope decoding.
//
// Every PVE response is `{"data": <payload>}`. Collections may come back as
// `{"data": null}`, which means "empty"; objects and scalars must be present.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_path_to_error::Segment;

use crate::error::Error;

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(default)]
    data: Option<Value>,
}

fn parse(endpoint: &str, body: &str) -> Result<Option<Value>, Error> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let envelope: RawEnvelope = serde_json::from_str(body).map_err(|e| Error::MalformedResponse {
        endpoint: endpoint.to_owned(),
        path: None,
        message: e.to_string(),
    })?;
    Ok(envelope.data.filter(|v| !v.is_null()))
}

/// Decode a collection payload; a null or absent `data` is an empty list.
pub(crate) fn decode_list<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<Vec<T>, Error> {
    let Some(data) = parse(endpoint, body)? else {
        return Ok(Vec::new());
    };

    let Value::Array(items) = data else {
        return Err(Error::MalformedResponse {
            endpoint: endpoint.to_owned(),
            path: Some("data".into()),
            message: format!("expected an array, found {}", kind(&data)),
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| decode_value(endpoint, &format!("data[{i}]"), item))
        .collect()
}

/// Decode an object or scalar payload; a null or absent `data` is an error.
pub(crate) fn decode_object<T: DeserializeOwned>(endpoint: &str, body: &str) -> Result<T, Error> {
    match parse(endpoint, body)? {
        Some(data) => decode_value(endpoint, "data", data),
        None => Err(Error::MalformedResponse {
            endpoint: endpoint.to_owned(),
            path: Some("data".into()),
            message: "expected a payload, found null".into(),
        }),
    }
}

/// Decode a payload that PVE may legitimately omit (e.g. synchronous deletes).
pub(crate) fn decode_optional<T: DeserializeOwned>(
    endpoint: &str,
    body: &str,
) -> Result<Option<T>, Error> {
    parse(endpoint, body)?
        .map(|data| decode_value(endpoint, "data", data))
        .transpose()
}

fn decode_value<T: DeserializeOwned>(endpoint: &str, at: &str, value: Value) -> Result<T, Error> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        let mut path = at.to_owned();
        for segment in e.path().iter() {
            if !matches!(segment, Segment::Seq { .. }) {
                path.push('.');
            }
            path.push_str(&segment.to_string());
        }
        let message = e.inner().to_string();
        // A missing field is reported at its parent; name the field itself.
        if let Some(field) = missing_field(&message) {
            path.push('.');
            path.push_str(field);
        }
        Error::MalformedResponse {
            endpoint: endpoint.to_owned(),
            path: Some(path),
            message,
        }
    })
}

/// Pull `x` out of serde's "missing field `x`" message.
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
