use anyhow::Context;
use bookmanager_app::Application;
use bookmanager_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load bookmanager settings")?;
    bookmanager_telemetry::init(&settings.telemetry);

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.url,
        "bookmanager bootstrap starting"
    );

    Application::bootstrap(settings).await?.serve().await
}
