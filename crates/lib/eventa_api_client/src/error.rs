//! Turning HTTP failures and loosely-shaped bodies into `ApiError`.

use reqwest::Response;
use serde::de::DeserializeOwned;
use serde_json::Value;

use eventa_core::backend::ApiError;

/// Map a non-2xx response to an `ApiError`, using the backend's
/// `{"error": ..}` or `{"message": ..}` body when there is one.
pub(crate) async fn error_from_response(resp: Response) -> ApiError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    });
    ApiError::from_status(status.as_u16(), message)
}

pub(crate) fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["error", "message"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Accept a bare JSON array, or an object wrapping the array under `key`.
pub(crate) fn decode_list<T: DeserializeOwned>(
    value: Value,
    key: &str,
) -> Result<Vec<T>, ApiError> {
    let items = match value {
        Value::Array(_) => value,
        Value::Object(mut map) => match map.remove(key) {
            Some(inner @ Value::Array(_)) => inner,
            Some(Value::Null) | None => Value::Array(Vec::new()),
            Some(other) => {
                return Err(ApiError::Decode(format!(
                    "expected `{key}` to be a list, got {other}"
                )));
            }
        },
        other => {
            return Err(ApiError::Decode(format!("expected a list, got {other}")));
        }
    };
    serde_json::from_value(items)
        .map_err(|e| ApiError::Decode(format!("response parse error: {e}")))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn reads_error_or_message() {
        assert_eq!(
            error_message(r#"{"error":"Invalid credentials"}"#).as_deref(),
            Some("Invalid credentials")
        );
        assert_eq!(
            error_message(r#"{"message":"Not allowed"}"#).as_deref(),
            Some("Not allowed")
        );
        assert_eq!(error_message("<html>oops</html>"), None);
    }

    #[test]
    fn lists_may_be_wrapped() {
        let bare: Vec<u32> = decode_list(json!([1, 2]), "users").unwrap();
        let wrapped: Vec<u32> = decode_list(json!({"users": [3], "total": 1}), "users").unwrap();
        let missing: Vec<u32> = decode_list(json!({"total": 0}), "users").unwrap();
        assert_eq!(bare, [1, 2]);
        assert_eq!(wrapped, [3]);
        assert!(missing.is_empty());
        assert!(decode_list::<u32>(json!("nope"), "users").is_err());
    }
}
