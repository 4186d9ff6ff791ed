// Opaque pagination cursors.
//
// The document store resumes a page from a last-evaluated key, which is a
// small JSON map. Clients receive it base64url-encoded and echo it back
// untouched on the next request.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde_json::Value;

use crate::utils::service_error::ApiError;

pub fn encode_last_key(key: &Value) -> String {
    URL_SAFE_NO_PAD.encode(key.to_string())
}

pub fn decode_last_key(cursor: &str) -> Result<Value, ApiError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(cursor)
        .map_err(|_| ApiError::Validation("Parâmetro lastKey inválido".to_string()))?;
    serde_json::from_slice(&bytes)
        .map_err(|_| ApiError::Validation("Parâmetro lastKey inválido".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_a_key_map() {
        let key = json!({"id": "abc", "userId": "u1", "date": "2024-01-01T00:00:00Z"});
        let cursor = encode_last_key(&key);
        assert_eq!(decode_last_key(&cursor).unwrap(), key);
    }

    #[test]
    fn cursor_is_url_safe() {
        let key = json!({"id": "a/b+c"});
        let cursor = encode_last_key(&key);
        assert!(!cursor.contains('/') && !cursor.contains('+') && !cursor.contains('='));
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_last_key("not base64 ???").is_err());
        // valid base64 but not JSON
        let cursor = URL_SAFE_NO_PAD.encode("plain text");
        assert!(decode_last_key(&cursor).is_err());
    }
}
