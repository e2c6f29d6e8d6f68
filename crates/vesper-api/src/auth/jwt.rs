//! HS256 token validation against the shared secret

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use vesper_core::models::{AuthUser, UserRole};
use vesper_core::AppError;

use crate::auth::models::JwtClaims;

/// Signing and verification keys derived from `JWT_SECRET`
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Validate and decode a bearer token
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        let token_data = decode::<JwtClaims>(token, &self.decoding, &validation).map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                    AppError::Unauthorized("Token has expired".to_string())
                }
                jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                    AppError::Unauthorized("Invalid token signature".to_string())
                }
                _ => AppError::Unauthorized("Invalid or expired token".to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// Resolve the caller identity carried by a token
    pub fn authenticate(&self, token: &str) -> Result<AuthUser, AppError> {
        let claims = self.validate_token(token)?;
        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(|_| AppError::Unauthorized("Invalid user role".to_string()))?;
        Ok(AuthUser::new(claims.sub, role))
    }

    /// Sign a token. Identity issuance lives elsewhere; this is used by tooling and tests.
    pub fn issue(&self, user_id: Uuid, role: UserRole, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id,
            role: role.as_str().to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn issued_token_authenticates() {
        let keys = JwtKeys::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = keys
            .issue(user_id, UserRole::Moderator, Duration::minutes(5))
            .unwrap();
        let user = keys.authenticate(&token).unwrap();
        assert_eq!(user.user_id, user_id);
        assert_eq!(user.role, UserRole::Moderator);
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = JwtKeys::new(SECRET);
        let token = keys
            .issue(Uuid::new_v4(), UserRole::User, Duration::minutes(-5))
            .unwrap();
        let err = keys.validate_token(&token).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(ref m) if m == "Token has expired"));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let other = JwtKeys::new("ffffffffffffffffffffffffffffffff");
        let token = other
            .issue(Uuid::new_v4(), UserRole::Admin, Duration::minutes(5))
            .unwrap();
        assert!(JwtKeys::new(SECRET).authenticate(&token).is_err());
    }
}
