//! JWT token creation with configurable signing and TTL.

use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use tickethub_core::config::AuthConfig;
use tickethub_core::error::AppError;

use super::claims::Claims;

/// Creates signed session tokens for staff logins.
#[derive(Clone)]
pub struct JwtEncoder {
    /// HMAC secret key for signing.
    encoding_key: EncodingKey,
    /// Token TTL in hours.
    ttl_hours: i64,
}

impl std::fmt::Debug for JwtEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtEncoder")
            .field("ttl_hours", &self.ttl_hours)
            .finish()
    }
}

impl JwtEncoder {
    /// Creates a new encoder from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            ttl_hours: config.jwt_ttl_hours as i64,
        }
    }

    /// Generates a session token for the given user.
    ///
    /// Returns the signed token and its expiration time.
    pub fn generate_token(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<(String, DateTime<Utc>), AppError> {
        let now = Utc::now();
        let exp = now + chrono::Duration::hours(self.ttl_hours);

        let claims = Claims {
            sub: user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4(),
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode session token: {e}")))?;

        Ok((token, exp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jwt::JwtDecoder;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-at-least-32-bytes-long!".to_string(),
            jwt_ttl_hours: 168,
            password_min_length: 8,
        }
    }

    #[test]
    fn round_trip_token() {
        let config = test_config();
        let encoder = JwtEncoder::new(&config);
        let decoder = JwtDecoder::new(&config);

        let user_id = Uuid::new_v4();
        let (token, exp) = encoder.generate_token(user_id, "staff@example.com").unwrap();

        let claims = decoder.decode_token(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, "staff@example.com");
        assert_eq!(claims.exp, exp.timestamp());
        assert!(!claims.is_expired());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let encoder = JwtEncoder::new(&test_config());
        let (token, _) = encoder
            .generate_token(Uuid::new_v4(), "staff@example.com")
            .unwrap();

        let other = AuthConfig {
            jwt_secret: "a-completely-different-secret-key!!".to_string(),
            ..test_config()
        };
        assert!(JwtDecoder::new(&other).decode_token(&token).is_err());
    }
}
