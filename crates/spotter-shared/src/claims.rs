//! Token-claims parsing.
//!
//! The auth token is an opaque server-issued credential. The client only
//! ever decodes the payload segment to read display claims (email, name,
//! username); it never verifies the signature. Authorization decisions
//! belong to the server; a decoded claim set is display data, nothing
//! more.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Display claims carried in the token payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub username: String,
}

impl Claims {
    /// Decode the payload segment of a compact token.
    ///
    /// Pure parsing: any structural problem (wrong segment count, bad
    /// base64, bad JSON, missing email) yields `None`, never an error the
    /// caller has to handle. A `None` here means "treat as signed out".
    pub fn decode(token: &str) -> Option<Claims> {
        let mut segments = token.split('.');
        let _header = segments.next()?;
        let payload = segments.next()?;
        // Tolerate padded encoders.
        let payload = payload.trim_end_matches('=');
        let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let claims: Claims = serde_json::from_slice(&bytes).ok()?;
        if claims.email.is_empty() {
            return None;
        }
        Some(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_token(payload: &str) -> String {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload);
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_decode_valid_token() {
        let token =
            make_token(r#"{"email":"ana@x","name":"Ana García","username":"ana"}"#);
        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.email, "ana@x");
        assert_eq!(claims.name, "Ana García");
        assert_eq!(claims.username, "ana");
    }

    #[test]
    fn test_missing_optional_claims_default() {
        let token = make_token(r#"{"email":"ana@x"}"#);
        let claims = Claims::decode(&token).unwrap();
        assert_eq!(claims.email, "ana@x");
        assert!(claims.name.is_empty());
    }

    #[test]
    fn test_malformed_tokens_decode_to_none() {
        assert!(Claims::decode("").is_none());
        assert!(Claims::decode("only-one-segment").is_none());
        assert!(Claims::decode("a.%%%.c").is_none());
        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("not json"));
        assert!(Claims::decode(&not_json).is_none());
    }

    #[test]
    fn test_empty_email_rejected() {
        let token = make_token(r#"{"email":""}"#);
        assert!(Claims::decode(&token).is_none());
    }

    #[test]
    fn test_padded_payload_tolerated() {
        let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"none"}"#);
        let body = base64::engine::general_purpose::URL_SAFE
            .encode(r#"{"email":"ana@x"}"#);
        let token = format!("{header}.{body}.sig");
        assert!(Claims::decode(&token).is_some());
    }
}
