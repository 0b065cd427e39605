use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT claims carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: i64,      // Subject (user ID)
    pub email: String, // User email
    pub exp: i64,      // Expiration time
    pub iat: i64,      // Issued at
}

/// Stateless HS256 JWT signer and verifier.
///
/// Tokens carry only the user id and email. There is no whitelist or
/// blacklist; revocation before expiry is not supported.
#[derive(Clone)]
pub struct JwtAuth {
    secret: String,
    access_ttl_secs: i64,
}

impl JwtAuth {
    /// Create a new JWT auth instance.
    ///
    /// # Example
    /// ```ignore
    /// use axum_helpers::{JwtAuth, JwtConfig};
    /// use core_config::FromEnv;
    ///
    /// let config = JwtConfig::from_env()?;
    /// let jwt_auth = JwtAuth::new(&config);
    /// ```
    pub fn new(config: &JwtConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            access_ttl_secs: config.access_ttl_secs,
        }
    }

    /// Create an access token for the given user.
    pub fn create_access_token(&self, user_id: i64, email: &str) -> eyre::Result<String> {
        let now = Utc::now();
        let exp = (now + Duration::seconds(self.access_ttl_secs)).timestamp();
        let iat = now.timestamp();

        let claims = JwtClaims {
            sub: user_id,
            email: email.to_string(),
            exp,
            iat,
        };

        let header = Header {
            alg: jsonwebtoken::Algorithm::HS256,
            ..Default::default()
        };

        let token = encode(
            &header,
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(token)
    }

    /// Verify JWT token signature and decode claims.
    ///
    /// Fails on a bad signature, a malformed token, or an expired token.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let token_data = decode::<JwtClaims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("unit-test-secret-that-is-32-chars-long!!"))
    }

    #[test]
    fn token_round_trips_claims() {
        let auth = auth();
        let token = auth.create_access_token(7, "ada@example.com").unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.email, "ada@example.com");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let token = auth().create_access_token(7, "ada@example.com").unwrap();

        let other = JwtAuth::new(&JwtConfig::new("another-secret-that-is-32-chars-long!!!"));
        assert!(other.verify_token(&token).is_err());
    }

    #[test]
    fn rejects_garbage_token() {
        assert!(auth().verify_token("not-a-jwt").is_err());
    }

    #[test]
    fn rejects_expired_token() {
        // Past the default 60s validation leeway.
        let config =
            JwtConfig::new("unit-test-secret-that-is-32-chars-long!!").with_access_ttl_secs(-120);
        let auth = JwtAuth::new(&config);

        let token = auth.create_access_token(7, "ada@example.com").unwrap();
        assert!(auth.verify_token(&token).is_err());
    }
}
