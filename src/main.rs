use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use init_commons::{DEFAULT_ADMIN_URL, DEFAULT_APP_URL, DEFAULT_MONGO_URL, VERSION};
use init_macros::get_env;
use init_mongo_manager::admin::AdminApi;
use init_mongo_manager::bootstrap::{Outcome, bootstrap};
use init_mongo_manager::console::Console;
use init_mongo_manager::plan::BootstrapPlan;
use std::env;
use std::process::exit;
use tracing::{Level, info, instrument, subscriber, warn};
use tracing_subscriber::FmtSubscriber;

#[derive(Debug, Parser)]
#[command(name = "mongo_init", version, about = "One-shot MongoDB user and collection setup")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Default, Subcommand)]
enum Command {
    /// Create the application user, its collection and the admin user
    #[default]
    Init,
    /// Check that both users have the permissions they were granted
    Verify,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    {
        const ENV_KEY: &str = "LOG_LEVEL";
        #[cfg(debug_assertions)]
        const DEFAULT_LEVEL: Level = Level::DEBUG;
        #[cfg(not(debug_assertions))]
        const DEFAULT_LEVEL: Level = Level::INFO;

        let lvl = match env::var(ENV_KEY) {
            Ok(lvl) => match lvl.parse() {
                Ok(lvl) => lvl,
                Err(e) => {
                    eprintln!("WARNING: {ENV_KEY} is set, but the value ({lvl}) is invalid: {e}");
                    exit(1);
                }
            },
            Err(_) => DEFAULT_LEVEL,
        };

        // stdout carries the report
        let fmt_sub = FmtSubscriber::builder()
            .with_max_level(lvl)
            .with_writer(std::io::stderr)
            .finish();

        subscriber::set_global_default(fmt_sub)
            .with_context(|| format!("Failed to set global default subscriber with lvl {lvl}"))?;
    }

    info!("Starting mongo init v{VERSION}");

    let plan = BootstrapPlan::default();

    match cli.command.unwrap_or_default() {
        Command::Init => init(&plan).await,
        Command::Verify => verify(&plan).await,
    }
}

#[instrument(skip_all)]
async fn init(plan: &BootstrapPlan) -> Result<()> {
    let mongo_url = get_env!("MONGO_URL", DEFAULT_MONGO_URL, String);

    let connection = init_mongo_manager::connect(&mongo_url).await;

    let mut console = Console::stdout();
    match bootstrap(connection, plan, &mut console).await {
        Outcome::Complete => info!("Initialization done"),
        Outcome::Aborted(e) => warn!(step = %e.step, "Initialization finished with errors"),
    }

    Ok(())
}

#[instrument(skip_all)]
async fn verify(plan: &BootstrapPlan) -> Result<()> {
    let app_url = get_env!("MONGO_APP_URL", DEFAULT_APP_URL, String);
    let admin_url = get_env!("MONGO_ADMIN_URL", DEFAULT_ADMIN_URL, String);

    let app_client = init_mongo_manager::connect(&app_url)
        .await
        .context("Unable to create mongo client for the application user")?;
    let admin_client = init_mongo_manager::connect(&admin_url)
        .await
        .context("Unable to create mongo client for the admin user")?;

    let app_db = app_client.switch_database(&plan.app_db);
    let admin_db = admin_client.switch_database(&plan.app_db);

    let mut console = Console::stdout();
    let report = init_mongo_manager::verify::verify(&app_db, &admin_db, plan, &mut console).await;

    if !report.passed() {
        warn!(?report, "Permission check failed");
        exit(1);
    }

    info!("Permission check passed");

    Ok(())
}
