use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,   // Subject (user ID)
    pub email: String, // User email
    pub name: String,  // Display name
    pub role: String,  // Role name, parsed by the consumer
    pub exp: i64,      // Expiration time
    pub iat: i64,      // Issued at
    pub jti: String,   // Token ID
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// HS256 token issuer and verifier.
///
/// Cheap to clone; keys are shared.
#[derive(Clone)]
pub struct JwtAuth {
    keys: Arc<Keys>,
    ttl_secs: i64,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        let keys = Keys {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
        };

        tracing::info!(ttl_secs = config.ttl_secs, "JWT auth initialized");
        Self {
            keys: Arc::new(keys),
            ttl_secs: config.ttl_secs,
        }
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Issue an access token with the configured lifetime
    pub fn create_access_token(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
        role: &str,
    ) -> eyre::Result<String> {
        self.create_token_with_ttl(user_id, email, name, role, self.ttl_secs)
    }

    /// Issue a token valid for `ttl_secs` from now; negative values give an
    /// already expired token
    pub fn create_token_with_ttl(
        &self,
        user_id: Uuid,
        email: &str,
        name: &str,
        role: &str,
        ttl_secs: i64,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user_id.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            role: role.to_string(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)?;
        Ok(token)
    }

    /// Verify signature and expiry, then decode claims
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data = decode::<JwtClaims>(token, &self.keys.decoding, &validation)?;
        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth(secret: &str) -> JwtAuth {
        JwtAuth::new(&JwtConfig::new(secret).unwrap())
    }

    const SECRET: &str = "agenda-test-secret-at-least-32-characters";

    #[test]
    fn test_issue_and_verify() {
        let auth = auth(SECRET);
        let user_id = Uuid::now_v7();

        let token = auth
            .create_access_token(user_id, "ana@escola.org", "Ana", "coordenador")
            .unwrap();
        let claims = auth.verify_token(&token).unwrap();

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "ana@escola.org");
        assert_eq!(claims.role, "coordenador");
        assert_eq!(claims.exp - claims.iat, auth.ttl_secs());
    }

    #[test]
    fn test_rejects_foreign_signature() {
        let token = auth("another-secret-that-is-also-32-chars-long")
            .create_access_token(Uuid::now_v7(), "a@b.org", "A", "supervisor")
            .unwrap();

        assert!(auth(SECRET).verify_token(&token).is_err());
    }

    #[test]
    fn test_rejects_expired_token() {
        let auth = auth(SECRET);
        let token = auth
            .create_token_with_ttl(Uuid::now_v7(), "a@b.org", "A", "supervisor", -120)
            .unwrap();

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(auth(SECRET).verify_token("not.a.jwt").is_err());
    }
}
