use async_trait::async_trait;
use axum::Router;
use sqlx::SqlitePool;

use crate::settings::Settings;

/// Handles a module receives while the application boots
pub struct InitCtx<'a> {
    pub settings: &'a Settings,
    pub db: &'a SqlitePool,
}

/// Forward-only schema step contributed by a module.
///
/// `id` is unique per module; the pair `(module name, id)` is recorded once applied.
#[derive(Debug, Clone)]
pub struct Migration {
    pub id: &'static str,
    pub up: &'static str,
}

/// A unit of functionality plugged into the registry
#[async_trait]
pub trait Module: Sync + Send {
    /// Unique name, also used as the `/api/{name}` mount point
    fn name(&self) -> &'static str;

    /// Acquire resources (repositories, services) from the boot context.
    /// Runs before migrations are applied.
    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Routes served under `/api/{name}`. Only meaningful after `init`.
    fn routes(&self) -> Router {
        Router::new()
    }

    /// OpenAPI fragment (`paths` and `components.schemas`) merged into the served document
    fn openapi(&self) -> Option<serde_json::Value> {
        None
    }

    /// Schema steps, applied in the order returned
    fn migrations(&self) -> Vec<Migration> {
        vec![]
    }

    /// Called once migrations have been applied
    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        Ok(())
    }

    /// Release resources during shutdown
    async fn stop(&self) -> anyhow::Result<()> {
        Ok(())
    }
}
