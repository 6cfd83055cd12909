use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::auth::{
    credentials::CredentialHasher,
    memory_repo::MemoryUserStore,
    repo::{PgUserStore, UserStore},
};
use crate::config::AppConfig;

/// Everything a request handler may touch. Built once in `main`, then cloned
/// into each request by axum.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub hasher: CredentialHasher,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Connects the user store described by `config`, running migrations for Postgres.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let store = match &config.database_url {
            Some(url) => {
                let db = PgPoolOptions::new()
                    .max_connections(10)
                    .connect(url)
                    .await
                    .context("connect to database")?;

                if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
                    warn!(error = %e, "migration failed; continuing");
                }
                info!("using postgres user store");
                Arc::new(PgUserStore::new(db)) as Arc<dyn UserStore>
            }
            None => {
                warn!("DATABASE_URL not set; users are kept in memory and lost on restart");
                Arc::new(MemoryUserStore::new()) as Arc<dyn UserStore>
            }
        };

        Ok(Self::from_parts(store, config))
    }

    pub fn from_parts(store: Arc<dyn UserStore>, config: Arc<AppConfig>) -> Self {
        Self {
            store,
            hasher: CredentialHasher::default(),
            config,
        }
    }

    /// In-memory state with a fixed test signing key.
    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with_store(Arc::new(MemoryUserStore::new()))
    }

    #[cfg(test)]
    pub fn fake_with_store(store: Arc<dyn UserStore>) -> Self {
        use crate::config::JwtConfig;

        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
            },
            debug: false,
            host: "127.0.0.1".into(),
            port: 0,
            static_dir: "public".into(),
        });
        Self::from_parts(store, config)
    }

    /// Same state with `config` adjusted by `edit`.
    #[cfg(test)]
    pub fn with_config(mut self, edit: impl FnOnce(&mut AppConfig)) -> Self {
        edit(Arc::make_mut(&mut self.config));
        self
    }
}
