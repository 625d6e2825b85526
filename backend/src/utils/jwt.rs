//! JWT token utilities for authentication and authorization.
//!
//! Provides token creation and validation for the access/refresh pair. The
//! codec is built once at startup from the configured secret and shared
//! read-only; the secret never leaves it.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::database::models::Role;
use crate::errors::{ServiceError, ServiceResult};

/// Discriminates the two token families so neither can stand in for the
/// other: a refresh token is only good for minting new pairs, an access
/// token only for bearer authentication.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// JWT claims carried by both token families.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// User login, for display without a directory lookup
    pub login: String,
    /// Roles held at issue time
    pub roles: Vec<Role>,
    /// Bound session ID; present on refresh tokens only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub token_use: TokenUse,
    /// Token issued at timestamp
    pub iat: usize,
    /// Token expiration timestamp
    pub exp: usize,
}

impl Claims {
    /// Whether the claims are expired at `now` (Unix seconds).
    ///
    /// The boundary is inclusive: at the instant `exp` itself the token is
    /// still valid, only `now > exp` is expired.
    pub fn is_expired_at(&self, now: i64) -> bool {
        (self.exp as i64) < now
    }
}

/// JWT token codec for creating and validating tokens.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    /// Signature and structure checks only; expiry is enforced separately
    /// through [`Claims::is_expired_at`] so the boundary stays inclusive
    /// and the lenient logout path can skip it.
    validation: Validation,
}

impl TokenCodec {
    /// Creates a codec over the given HS256 secret.
    pub fn new(secret: &str) -> Self {
        let encoding_key = EncodingKey::from_secret(secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        TokenCodec {
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Generates an access token for bearer authentication.
    pub fn sign_access(
        &self,
        user_id: &str,
        login: &str,
        roles: &[Role],
        ttl_seconds: u64,
    ) -> ServiceResult<String> {
        self.sign(user_id, login, roles, None, TokenUse::Access, ttl_seconds)
    }

    /// Generates a refresh token bound to a session row.
    pub fn sign_refresh(
        &self,
        user_id: &str,
        login: &str,
        roles: &[Role],
        session_id: &str,
        ttl_seconds: u64,
    ) -> ServiceResult<String> {
        self.sign(
            user_id,
            login,
            roles,
            Some(session_id.to_string()),
            TokenUse::Refresh,
            ttl_seconds,
        )
    }

    fn sign(
        &self,
        user_id: &str,
        login: &str,
        roles: &[Role],
        sid: Option<String>,
        token_use: TokenUse,
        ttl_seconds: u64,
    ) -> ServiceResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(ttl_seconds as i64);

        let claims = Claims {
            sub: user_id.to_string(),
            login: login.to_string(),
            roles: roles.to_vec(),
            sid,
            token_use,
            iat: now.timestamp() as usize,
            exp: exp.timestamp() as usize,
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|error| {
                ServiceError::internal_error(format!("Token generation failed: {}", error))
            })
    }

    /// Validates signature and expiry and decodes the claims.
    pub fn verify(&self, token: &str) -> ServiceResult<Claims> {
        let claims = self.decode_claims(token)?;
        if claims.is_expired_at(Utc::now().timestamp()) {
            return Err(ServiceError::TokenExpired);
        }
        Ok(claims)
    }

    /// Checks the signature and decodes the claims, expiry not included.
    fn decode_claims(&self, token: &str) -> ServiceResult<Claims> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|token_data| token_data.claims)
            .map_err(map_jwt_error)
    }

    /// Validates an access token, rejecting refresh tokens presented as
    /// bearer credentials.
    pub fn verify_access(&self, token: &str) -> ServiceResult<Claims> {
        let claims = self.verify(token)?;
        if claims.token_use != TokenUse::Access {
            return Err(ServiceError::TokenMalformed);
        }
        Ok(claims)
    }

    /// Validates a refresh token.
    pub fn verify_refresh(&self, token: &str) -> ServiceResult<Claims> {
        let claims = self.verify(token)?;
        if claims.token_use != TokenUse::Refresh {
            return Err(ServiceError::TokenMalformed);
        }
        Ok(claims)
    }

    /// Validates a refresh token's signature but tolerates expiry.
    ///
    /// Logout uses this so an expired cookie still identifies which session
    /// to revoke.
    pub fn verify_refresh_lenient(&self, token: &str) -> ServiceResult<Claims> {
        let claims = self.decode_claims(token)?;
        if claims.token_use != TokenUse::Refresh {
            return Err(ServiceError::TokenMalformed);
        }
        Ok(claims)
    }
}

fn map_jwt_error(error: jsonwebtoken::errors::Error) -> ServiceError {
    use jsonwebtoken::errors::ErrorKind;

    match error.kind() {
        ErrorKind::InvalidSignature => ServiceError::TokenInvalidSignature,
        _ => ServiceError::TokenMalformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_with(secret: &str, claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn refresh_claims(exp: i64) -> Claims {
        Claims {
            sub: "u1".to_string(),
            login: "alice".to_string(),
            roles: vec![Role::User],
            sid: Some("s1".to_string()),
            token_use: TokenUse::Refresh,
            iat: (exp - 60) as usize,
            exp: exp as usize,
        }
    }

    #[test]
    fn test_access_token_roundtrip() {
        let codec = TokenCodec::new("unit-test-secret");
        let token = codec
            .sign_access("u1", "alice", &[Role::Admin, Role::User], 600)
            .unwrap();

        let claims = codec.verify_access(&token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.login, "alice");
        assert_eq!(claims.roles, vec![Role::Admin, Role::User]);
        assert_eq!(claims.sid, None);
        assert_eq!(claims.token_use, TokenUse::Access);
    }

    #[test]
    fn test_refresh_token_carries_session_id() {
        let codec = TokenCodec::new("unit-test-secret");
        let token = codec
            .sign_refresh("u1", "alice", &[Role::User], "session-42", 600)
            .unwrap();

        let claims = codec.verify_refresh(&token).unwrap();
        assert_eq!(claims.sid.as_deref(), Some("session-42"));
        assert_eq!(claims.token_use, TokenUse::Refresh);
    }

    #[test]
    fn test_token_use_families_do_not_cross() {
        let codec = TokenCodec::new("unit-test-secret");
        let access = codec.sign_access("u1", "alice", &[Role::User], 600).unwrap();
        let refresh = codec
            .sign_refresh("u1", "alice", &[Role::User], "s1", 600)
            .unwrap();

        assert!(matches!(
            codec.verify_access(&refresh),
            Err(ServiceError::TokenMalformed)
        ));
        assert!(matches!(
            codec.verify_refresh(&access),
            Err(ServiceError::TokenMalformed)
        ));
    }

    #[test]
    fn test_expired_token_is_rejected_without_leeway() {
        let codec = TokenCodec::new("unit-test-secret");
        // One second past expiry. A default 60s leeway would accept this;
        // the codec must not.
        let claims = refresh_claims(Utc::now().timestamp() - 1);
        let token = signed_with("unit-test-secret", &claims);

        assert!(matches!(
            codec.verify(&token),
            Err(ServiceError::TokenExpired)
        ));
    }

    #[test]
    fn test_wrong_secret_is_a_signature_error() {
        let codec = TokenCodec::new("unit-test-secret");
        let claims = refresh_claims(Utc::now().timestamp() + 600);
        let token = signed_with("some-other-secret", &claims);

        assert!(matches!(
            codec.verify(&token),
            Err(ServiceError::TokenInvalidSignature)
        ));
    }

    #[test]
    fn test_garbage_is_malformed() {
        let codec = TokenCodec::new("unit-test-secret");
        assert!(matches!(
            codec.verify("definitely.not.a-token"),
            Err(ServiceError::TokenMalformed)
        ));
    }

    #[test]
    fn test_lenient_verify_recovers_expired_session_id() {
        let codec = TokenCodec::new("unit-test-secret");
        let claims = refresh_claims(Utc::now().timestamp() - 3600);
        let token = signed_with("unit-test-secret", &claims);

        let recovered = codec.verify_refresh_lenient(&token).unwrap();
        assert_eq!(recovered.sid.as_deref(), Some("s1"));

        // Lenient still checks the signature.
        let forged = signed_with("some-other-secret", &claims);
        assert!(codec.verify_refresh_lenient(&forged).is_err());
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let claims = refresh_claims(1_000_000);
        assert!(!claims.is_expired_at(999_999));
        assert!(!claims.is_expired_at(1_000_000));
        assert!(claims.is_expired_at(1_000_001));
    }
}
