//! HS256 access tokens.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tubely_core::constants::TOKEN_ISSUER;
use tubely_core::AppError;
use uuid::Uuid;

use super::IdentityVerifier;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: Uuid, // user_id
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
}

#[derive(Clone)]
pub struct JwtVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issue a token for `user_id` valid for `ttl`.
    pub fn issue_token(&self, user_id: Uuid, ttl: Duration) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id,
            iss: TOKEN_ISSUER.to_string(),
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {}", e)))
    }

    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AppError> {
        let token_data =
            decode::<JwtClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                tracing::debug!("JWT validation failed: {}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        AppError::Unauthorized("Token has expired".to_string())
                    }
                    ErrorKind::InvalidIssuer => {
                        AppError::Unauthorized("Invalid token issuer".to_string())
                    }
                    _ => AppError::Unauthorized(format!("Invalid token: {}", e)),
                }
            })?;
        Ok(token_data.claims)
    }
}

#[async_trait]
impl IdentityVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> Result<Uuid, AppError> {
        Ok(self.validate_token(token)?.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    #[tokio::test]
    async fn test_round_trip() {
        let verifier = JwtVerifier::new(SECRET);
        let user_id = Uuid::new_v4();
        let token = verifier.issue_token(user_id, Duration::hours(1)).unwrap();
        assert_eq!(verifier.verify(&token).await.unwrap(), user_id);
    }

    #[test]
    fn test_expired_token() {
        let verifier = JwtVerifier::new(SECRET);
        let token = verifier
            .issue_token(Uuid::new_v4(), Duration::seconds(-60))
            .unwrap();
        match verifier.validate_token(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Token has expired"),
            other => panic!("unexpected: {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn test_wrong_secret_and_issuer() {
        let verifier = JwtVerifier::new(SECRET);
        let other = JwtVerifier::new("ffffffffffffffffffffffffffffffff");
        let token = other.issue_token(Uuid::new_v4(), Duration::hours(1)).unwrap();
        assert!(matches!(
            verifier.validate_token(&token),
            Err(AppError::Unauthorized(_))
        ));

        let now = Utc::now().timestamp();
        let claims = JwtClaims {
            sub: Uuid::new_v4(),
            iss: "someone-else".to_string(),
            exp: now + 3600,
            iat: now,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        match verifier.validate_token(&token) {
            Err(AppError::Unauthorized(msg)) => assert_eq!(msg, "Invalid token issuer"),
            other => panic!("unexpected: {:?}", other.map(|c| c.sub)),
        }
    }

    #[test]
    fn test_garbage_token() {
        let verifier = JwtVerifier::new(SECRET);
        assert!(matches!(
            verifier.validate_token("not-a-jwt"),
            Err(AppError::Unauthorized(_))
        ));
    }
}
