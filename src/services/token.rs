// Access-token verification against the user pool JWKS.
//
// Token issuance lives in the identity provider; this service only
// establishes the authenticated subject for protected routes.

use std::collections::HashMap;

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("invalid or expired token")]
    Invalid,

    #[error("unknown signing key: {0}")]
    UnknownKey(String),

    #[error("failed to fetch JWKS: {0}")]
    Jwks(String),
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Validates a bearer token and returns the subject id.
    async fn verify(&self, token: &str) -> Result<String, TokenError>;
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    n: String,
    e: String,
}

#[derive(Debug, Deserialize)]
struct AccessClaims {
    sub: String,
    #[serde(default)]
    token_use: Option<String>,
    #[serde(default)]
    client_id: Option<String>,
}

/// RS256 verifier over the pool's published key set, fetched once at
/// startup.
pub struct JwksTokenVerifier {
    keys: HashMap<String, DecodingKey>,
    issuer: String,
    client_id: String,
}

impl JwksTokenVerifier {
    pub async fn discover(
        http: &reqwest::Client,
        region: &str,
        user_pool_id: &str,
        client_id: &str,
        issuer_override: Option<&str>,
    ) -> Result<Self, TokenError> {
        let issuer = issuer_override.map(str::to_string).unwrap_or_else(|| {
            format!("https://cognito-idp.{}.amazonaws.com/{}", region, user_pool_id)
        });
        let jwks_url = format!("{}/.well-known/jwks.json", issuer);

        let jwks: Jwks = http
            .get(&jwks_url)
            .send()
            .await
            .map_err(|e| TokenError::Jwks(e.to_string()))?
            .json()
            .await
            .map_err(|e| TokenError::Jwks(e.to_string()))?;

        let mut keys = HashMap::new();
        for jwk in jwks.keys {
            let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)
                .map_err(|e| TokenError::Jwks(format!("bad JWK {}: {}", jwk.kid, e)))?;
            keys.insert(jwk.kid, key);
        }
        tracing::info!(count = keys.len(), "loaded identity provider signing keys");

        Ok(JwksTokenVerifier {
            keys,
            issuer,
            client_id: client_id.to_string(),
        })
    }
}

#[async_trait]
impl TokenVerifier for JwksTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::Invalid)?;
        let kid = header.kid.ok_or(TokenError::Invalid)?;
        let key = self
            .keys
            .get(&kid)
            .ok_or_else(|| TokenError::UnknownKey(kid.clone()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        // Cognito access tokens carry client_id instead of aud
        validation.validate_aud = false;

        let data =
            decode::<AccessClaims>(token, key, &validation).map_err(|_| TokenError::Invalid)?;

        if data.claims.token_use.as_deref() != Some("access") {
            return Err(TokenError::Invalid);
        }
        if data.claims.client_id.as_deref() != Some(self.client_id.as_str()) {
            return Err(TokenError::Invalid);
        }

        Ok(data.claims.sub)
    }
}

/// Fixed token-to-subject mapping, used by the test suites in place of
/// the JWKS verifier.
#[derive(Default)]
pub struct StaticTokenVerifier {
    subjects: HashMap<String, String>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow(mut self, token: &str, subject: &str) -> Self {
        self.subjects.insert(token.to_string(), subject.to_string());
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.subjects
            .get(token)
            .cloned()
            .ok_or(TokenError::Invalid)
    }
}
