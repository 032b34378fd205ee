use anyhow::Context;
use clap::{Parser, Subcommand};

use bookmanager_app::Application;
use bookmanager_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "bookmanager", version, about = "Book manager REST service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Apply pending database migrations and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().context("failed to load bookmanager settings")?;
    bookmanager_telemetry::init(&settings.telemetry);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            tracing::info!(env = ?settings.environment, "starting server");
            Application::bootstrap(settings).await?.serve().await
        }
        Command::Migrate => {
            let applied = bookmanager_app::migrate(&settings).await?;
            tracing::info!(applied, "migrations applied");
            println!("applied {applied} migration(s)");
            Ok(())
        }
    }
}
