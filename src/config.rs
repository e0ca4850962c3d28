// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::clock::SystemClock,
    db::RemoteRepository,
    services::{console_service::ConsoleService, pipeline::ConversionPolicy},
    store::{LocalStorage, StoreOptions},
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Sem URL, o console roda só com o snapshot local.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub storage_dir: PathBuf,
    pub storage_namespace: String,
    pub default_country: String,
    pub conversion_policy: ConversionPolicy,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let or = |key: &str, default: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let database_max_connections = or("DATABASE_MAX_CONNECTIONS", "5")
            .parse()
            .context("DATABASE_MAX_CONNECTIONS deve ser um número")?;
        let conversion_policy = or("CONVERSION_POLICY", "idempotent")
            .parse::<ConversionPolicy>()
            .map_err(anyhow::Error::msg)?;

        Ok(Self {
            bind_addr: or("BIND_ADDR", "0.0.0.0:3000"),
            database_url: lookup("DATABASE_URL").filter(|v| !v.trim().is_empty()),
            database_max_connections,
            storage_dir: PathBuf::from(or("STORAGE_DIR", ".console")),
            storage_namespace: or("STORAGE_NAMESPACE", "agency-console-storage"),
            default_country: or("DEFAULT_COUNTRY", "México"),
            conversion_policy,
        })
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            default_country: self.default_country.clone(),
            conversion_policy: self.conversion_policy,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub console: ConsoleService,
}

impl AppState {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        let remote = match &config.database_url {
            Some(url) => {
                let pool = connect(url, config.database_max_connections).await?;
                Some(RemoteRepository::postgres(pool))
            }
            None => {
                tracing::info!("DATABASE_URL não definida: rodando só com o snapshot local");
                None
            }
        };

        let storage = LocalStorage::new(&config.storage_dir, &config.storage_namespace);
        let console = ConsoleService::bootstrap(
            Arc::new(SystemClock),
            config.store_options(),
            remote,
            Some(storage),
        )
        .await?;

        Ok(Self {
            config: Arc::new(config),
            console,
        })
    }
}

// Conecta e aplica as migrações antes de qualquer leitura.
async fn connect(url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(3))
        .connect(url)
        .await?;
    tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");
    Ok(pool)
}
