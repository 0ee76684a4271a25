use std::sync::Arc;

use crate::auth::{JwtVerifier, TokenVerifier};
use crate::config::{AppConfig, JwtConfig};
use crate::store::{DocumentStore, MemoryStore};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub verifier: Arc<dyn TokenVerifier>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let verifier =
            Arc::new(JwtVerifier::from_config(&config.jwt)) as Arc<dyn TokenVerifier>;
        // The managed document database is reached through the DocumentStore
        // trait; local runs and tests use the in-memory implementation.
        let store = Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>;
        Ok(Self {
            store,
            verifier,
            config,
        })
    }

    pub fn from_parts(
        store: Arc<dyn DocumentStore>,
        verifier: Arc<dyn TokenVerifier>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            store,
            verifier,
            config,
        }
    }

    pub fn fake() -> Self {
        let config = Arc::new(AppConfig {
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
            },
        });
        let verifier =
            Arc::new(JwtVerifier::from_config(&config.jwt)) as Arc<dyn TokenVerifier>;
        let store = Arc::new(MemoryStore::new()) as Arc<dyn DocumentStore>;
        Self {
            store,
            verifier,
            config,
        }
    }
}
