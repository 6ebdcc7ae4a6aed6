use base64::Engine;
use chrono::{DateTime, Utc};
use ring::hmac;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(thiserror::Error, Debug)]
pub enum CardTokenError {
    #[error("JSON serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Malformed card token")]
    Malformed,

    #[error("Card token signature mismatch")]
    BadSignature,
}

/// Payload embedded in a member card's QR code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardTokenPayload {
    pub card_id: Uuid,
    pub member_id: Uuid,
    pub card_number: String,
    pub issued_at: DateTime<Utc>,
}

/// Derives a 32-byte signing key from a secret string using SHA-256.
pub fn derive_key(secret: &str) -> [u8; 32] {
    use ring::digest;

    let hash = digest::digest(&digest::SHA256, secret.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(hash.as_ref());
    key
}

/// Signs a payload string, returning the HMAC-SHA256 signature as hex.
pub fn sign(payload: &str, key: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    let tag = hmac::sign(&key, payload.as_bytes());
    hex::encode(tag.as_ref())
}

/// Verifies a hex signature against a payload string.
pub fn verify(payload: &str, signature: &str, key: &[u8]) -> bool {
    let Ok(tag) = hex::decode(signature) else {
        return false;
    };
    let key = hmac::Key::new(hmac::HMAC_SHA256, key);
    hmac::verify(&key, payload.as_bytes(), &tag).is_ok()
}

/// Encodes a signed card token: `base64(payload json) . hex(signature)`.
pub fn encode(payload: &CardTokenPayload, key: &[u8]) -> Result<String, CardTokenError> {
    let json = serde_json::to_string(payload)?;
    let signature = sign(&json, key);
    let encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(json.as_bytes());

    Ok(format!("{}.{}", encoded, signature))
}

/// Decodes a card token, verifying its signature.
pub fn decode(token: &str, key: &[u8]) -> Result<CardTokenPayload, CardTokenError> {
    let (encoded, signature) = token.split_once('.').ok_or(CardTokenError::Malformed)?;

    let json_bytes = base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(encoded)
        .map_err(|_| CardTokenError::Malformed)?;
    let json = String::from_utf8(json_bytes).map_err(|_| CardTokenError::Malformed)?;

    if !verify(&json, signature, key) {
        return Err(CardTokenError::BadSignature);
    }

    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CardTokenPayload {
        CardTokenPayload {
            card_id: Uuid::new_v4(),
            member_id: Uuid::new_v4(),
            card_number: "C-00042".to_string(),
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn test_sign_produces_hex() {
        let key = derive_key("test-signing-secret");
        let signature = sign("payload", &key);

        assert!(!signature.is_empty());
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let key = derive_key("test-signing-secret");
        let original = payload();

        let token = encode(&original, &key).unwrap();
        let decoded = decode(&token, &key).unwrap();

        assert_eq!(decoded.card_id, original.card_id);
        assert_eq!(decoded.card_number, original.card_number);
    }

    #[test]
    fn test_tampered_token_is_rejected() {
        let key = derive_key("test-signing-secret");
        let token = encode(&payload(), &key).unwrap();

        let mut tampered = token.clone();
        tampered.replace_range(0..1, if token.starts_with('A') { "B" } else { "A" });

        assert!(matches!(
            decode(&tampered, &key),
            Err(CardTokenError::BadSignature) | Err(CardTokenError::Malformed)
        ));
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let key = derive_key("key-one");
        let other = derive_key("key-two");
        let token = encode(&payload(), &key).unwrap();

        assert!(matches!(
            decode(&token, &other),
            Err(CardTokenError::BadSignature)
        ));
    }

    #[test]
    fn test_token_without_separator_is_malformed() {
        let key = derive_key("test-signing-secret");

        assert!(matches!(
            decode("not-a-token", &key),
            Err(CardTokenError::Malformed)
        ));
    }
}
