use crate::{AppState, error::AppError};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use chrono::Utc;
use core_types::User;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// The bearer tokens are deliberately simple: `simple-token-{userId}-{millis}`.
/// They carry no signature; the auth check is that the embedded user exists.
const TOKEN_PREFIX: &str = "simple-token-";

/// Issues a fresh token for a user id.
pub fn issue_token(user_id: i64) -> String {
    format!("{TOKEN_PREFIX}{user_id}-{}", Utc::now().timestamp_millis())
}

/// Extracts the user id from a well-formed token, rejecting anything that
/// does not have exactly the `simple-token-{id}-{timestamp}` shape.
pub fn parse_token(token: &str) -> Option<i64> {
    let rest = token.strip_prefix(TOKEN_PREFIX)?;
    let mut parts = rest.split('-');
    let user_id = parts.next()?.parse::<i64>().ok()?;
    let timestamp = parts.next()?;
    if timestamp.is_empty() || parts.next().is_some() {
        return None;
    }
    Some(user_id)
}

pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub fn verify_password(password: &str, password_hash: &str) -> bool {
    hash_password(password) == password_hash
}

/// The authenticated caller, resolved from the `Authorization` header.
///
/// Use it as a handler argument to guard a route; the extractor answers 401
/// when the header is missing and 403 when the token is malformed or points
/// at no existing user.
pub struct AuthUser {
    pub user: User,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|header| header.split_whitespace().nth(1));

        let Some(token) = token else {
            return Err(AppError::Unauthorized("Access token required".to_string()));
        };

        let Some(user_id) = parse_token(token) else {
            return Err(AppError::Forbidden("Invalid token".to_string()));
        };

        let user = state
            .db_repo
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::Forbidden("Invalid token".to_string()))?;

        Ok(AuthUser { user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_tokens_parse_back_to_the_user_id() {
        let token = issue_token(42);
        assert!(token.starts_with("simple-token-42-"));
        assert_eq!(parse_token(&token), Some(42));
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        assert_eq!(parse_token("simple-token-42"), None);
        assert_eq!(parse_token("simple-token--12345"), None);
        assert_eq!(parse_token("simple-token-abc-12345"), None);
        assert_eq!(parse_token("simple-token-1-2-3"), None);
        assert_eq!(parse_token("other-token-1-12345"), None);
        assert_eq!(parse_token(""), None);
    }

    #[test]
    fn password_hashing_is_deterministic_and_discriminating() {
        let hash = hash_password("hunter22");
        assert!(verify_password("hunter22", &hash));
        assert!(!verify_password("hunter23", &hash));
        // hex-encoded SHA-256
        assert_eq!(hash.len(), 64);
    }
}
