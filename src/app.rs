//! Application bootstrap: pool, registry lifecycle, migrations, server.

use anyhow::Context;
use axum::Router;
use sqlx::SqlitePool;

use bookmanager_kernel::settings::Settings;
use bookmanager_kernel::{InitCtx, ModuleRegistry};

use crate::modules;

/// A fully booted application: modules initialized, migrations applied, modules started
pub struct Application {
    settings: Settings,
    pool: SqlitePool,
    registry: ModuleRegistry,
}

impl Application {
    pub async fn bootstrap(settings: Settings) -> anyhow::Result<Self> {
        let pool = bookmanager_db::connect(&settings.database).await?;

        let mut registry = ModuleRegistry::new();
        registry.register_core(bookmanager_db::create_module(pool.clone()));
        modules::register_all(&mut registry);

        let ctx = InitCtx {
            settings: &settings,
            db: &pool,
        };
        registry.init_all(&ctx).await?;

        let applied = bookmanager_db::run_migrations(&pool, &registry.collect_migrations())
            .await
            .context("failed to apply migrations")?;
        tracing::info!(applied, "migrations complete");

        registry.start_all(&ctx).await?;

        tracing::info!(
            core = registry.core_module_count(),
            custom = registry.custom_module_count(),
            "bookmanager bootstrap complete"
        );

        Ok(Self {
            settings,
            pool,
            registry,
        })
    }

    /// The complete HTTP router, middleware included
    pub fn router(&self) -> Router {
        bookmanager_http::build_router(&self.registry, &self.settings)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Serve until Ctrl-C, then stop every module
    pub async fn serve(self) -> anyhow::Result<()> {
        let served = bookmanager_http::start_server(&self.registry, &self.settings).await;
        self.shutdown().await?;
        served
    }

    pub async fn shutdown(&self) -> anyhow::Result<()> {
        self.registry.stop_all().await
    }
}

/// Apply pending migrations and exit. Returns how many were applied.
pub async fn migrate(settings: &Settings) -> anyhow::Result<usize> {
    let pool = bookmanager_db::connect(&settings.database).await?;

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry);

    let applied = bookmanager_db::run_migrations(&pool, &registry.collect_migrations())
        .await
        .context("failed to apply migrations")?;
    pool.close().await;

    Ok(applied)
}
