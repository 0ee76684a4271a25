use async_trait::async_trait;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use super::claims::Claims;
use crate::config::JwtConfig;

/// Verified request identity, threaded explicitly through handlers.
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
}

/// Maps a bearer token to a verified [`Identity`]. The production deployment
/// delegates to the external identity provider; tests swap in their own.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> anyhow::Result<Identity>;
}

#[derive(Clone)]
pub struct JwtVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtVerifier {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }

    /// Mints a token for `uid`. Used by local tooling and tests; real tokens
    /// come from the identity provider.
    pub fn sign(&self, uid: &str, email: Option<&str>) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: uid.to_string(),
            email: email.map(str::to_string),
            iat: now.unix_timestamp() as usize,
            exp: (now + self.ttl).unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(uid, "jwt signed");
        Ok(token)
    }
}

#[async_trait]
impl TokenVerifier for JwtVerifier {
    async fn verify(&self, token: &str) -> anyhow::Result<Identity> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(uid = %data.claims.sub, "jwt verified");
        Ok(Identity {
            uid: data.claims.sub,
            email: data.claims.email,
        })
    }
}
