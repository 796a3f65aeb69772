use crate::db::models::Role;
use crate::error::{AppError, AuthError};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// Claims embedded in a session token. `userId`, `username` and `role` are the
/// external contract consumed by clients; `iat`/`exp` bound the validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i32,
    pub username: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies stateless HS256 session tokens. The secret is process-wide
/// configuration, loaded once at startup and never rotated while running.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    expiry_hours: i64,
}

impl TokenService {
    pub fn new(secret: String, expiry_hours: i64) -> Self {
        Self {
            secret,
            expiry_hours,
        }
    }

    pub fn issue(&self, user_id: i32, username: &str, role: Role) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            username: username.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.expiry_hours)).timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("failed to sign token: {}", e)))?;

        Ok(token)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // The validity window is exact: a token is rejected the moment it expires.
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            _ => AuthError::MalformedToken,
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret-key-12345".to_string(), 24)
    }

    #[test]
    fn test_issue_and_verify_round_trip() {
        let tokens = service();

        let token = tokens.issue(7, "ali1", Role::Student).unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.username, "ali1");
        assert_eq!(claims.role, Role::Student);
        assert_eq!(claims.exp, claims.iat + 24 * 3600);
    }

    #[test]
    fn test_claims_wire_names() {
        let claims = Claims {
            user_id: 1,
            username: "ali1".to_string(),
            role: Role::Teacher,
            iat: 1_700_000_000,
            exp: 1_700_086_400,
        };

        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["username"], "ali1");
        assert_eq!(json["role"], "teacher");
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new("test-secret-key-12345".to_string(), -1);

        let token = tokens.issue(1, "ali1", Role::Student).unwrap();
        let err = tokens.verify(&token).unwrap_err();

        assert!(matches!(err, AppError::Auth(AuthError::TokenExpired)));
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let tokens = service();
        let token = tokens.issue(1, "ali1", Role::Student).unwrap();

        let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
        assert_eq!(parts.len(), 3);

        // Flip one character of the signed payload; the signature no longer matches.
        let payload = &mut parts[1];
        let flipped = if payload.ends_with('A') { 'B' } else { 'A' };
        payload.pop();
        payload.push(flipped);
        let tampered = parts.join(".");

        let err = tokens.verify(&tampered).unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let tokens = service();
        let other = TokenService::new("a-different-secret".to_string(), 24);

        let token = tokens.issue(1, "ali1", Role::Student).unwrap();
        let err = other.verify(&token).unwrap_err();

        assert!(matches!(err, AppError::Auth(AuthError::InvalidSignature)));
    }

    #[test]
    fn test_garbage_token_rejected() {
        let tokens = service();

        let err = tokens.verify("not-a-token").unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::MalformedToken)));

        let err = tokens.verify("").unwrap_err();
        assert!(matches!(err, AppError::Auth(AuthError::MalformedToken)));
    }
}
