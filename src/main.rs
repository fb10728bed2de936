use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use snapconsole::cli::{self, commands, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "snapconsole=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let global = &cli.global;

    let result = match cli.command {
        Commands::Init => commands::init().await,
        Commands::Login { username, password } => commands::login(global, username, password).await,
        Commands::Logout => commands::logout(global).await,
        Commands::Register {
            username,
            role,
            password,
        } => commands::register(global, &username, &role, password).await,
        Commands::Whoami => commands::whoami(global).await,
        Commands::Passwd => commands::passwd(global).await,
        Commands::Open { path } => commands::open(global, &path).await,
        Commands::Routes => commands::routes(global).await,
        Commands::Snapshots { action } => commands::snapshots(global, action).await,
        Commands::SnapshotClasses => commands::snapshot_classes(global).await,
        Commands::Pvcs { namespace } => commands::pvcs(global, &namespace).await,
        Commands::Namespaces => commands::namespaces(global).await,
        Commands::StorageClasses => commands::storage_classes(global).await,
        Commands::Scheduled { action } => commands::scheduled(global, action).await,
        Commands::Clusters { action } => commands::clusters(global, action).await,
        Commands::Users { action } => commands::users(global, action).await,
        Commands::Ceph { action } => commands::ceph(global, action).await,
    };

    if let Err(e) = &result {
        cli::error(&e.to_string());
        std::process::exit(1);
    }
    Ok(())
}
