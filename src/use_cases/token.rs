use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::Deserialize;

use crate::domain::entities::{Role, Session, id_string};

// Claims carried in the access token payload. Decoded locally, never verified.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    #[serde(deserialize_with = "id_string")]
    pub sub: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
    pub exp: u64,
}

impl TokenClaims {
    pub fn into_session(self) -> Session {
        let display_name = self
            .full_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| self.username.clone());
        Session {
            subject_id: self.sub,
            username: self.username,
            display_name,
            role: self.role,
            token_expiry: self.exp,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum TokenDecodeError {
    NotAJwt,
    Base64,
    Claims,
}

// Decodes the payload segment of a `header.payload.signature` token.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenDecodeError> {
    let mut segments = token.trim().split('.');
    let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(_), Some(payload), Some(_), None) if !payload.is_empty() => payload,
        _ => return Err(TokenDecodeError::NotAJwt),
    };

    // Some issuers keep the base64 padding.
    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|_| TokenDecodeError::Base64)?;

    serde_json::from_slice(&bytes).map_err(|_| TokenDecodeError::Claims)
}

// Fail-closed expiry check: anything undecodable counts as expired.
pub fn is_expired(token: Option<&str>, now_epoch_seconds: u64) -> bool {
    match token.map(decode_claims) {
        Some(Ok(claims)) => claims.exp <= now_epoch_seconds,
        _ => true,
    }
}
