// KratOs Bootstrap - Entry point
// Principle: A fixed bootnode list is just another discovery source

use clap::Parser;
use kratos_bootstrap::cli::config::{from_check_cmd, from_run_cmd};
use kratos_bootstrap::cli::runner::{check_bootstrap, run_bootstrap};
use kratos_bootstrap::cli::{Cli, Commands};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_filter = if cli.verbose {
        "debug"
    } else {
        &cli.log_level
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter)),
        )
        .init();

    info!("🌐 KratOs Bootstrap v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run(cmd) => {
            let config = from_run_cmd(&cmd).map_err(|e| {
                error!("Configuration error: {}", e);
                anyhow::anyhow!("Configuration error: {}", e)
            })?;

            if let Err(e) = run_bootstrap(config).await {
                error!("Bootstrap error: {}", e);
                return Err(anyhow::anyhow!("Bootstrap error: {}", e));
            }
        }

        Commands::Check(cmd) => {
            let config = from_check_cmd(&cmd).map_err(|e| {
                error!("Configuration error: {}", e);
                anyhow::anyhow!("Configuration error: {}", e)
            })?;

            let reports = check_bootstrap(&config).await;
            let failed = reports.iter().filter(|r| !r.is_ok()).count();

            for report in &reports {
                match &report.result {
                    Ok(record) => println!("ok      {} ({})", report.candidate, record.id),
                    Err(e) => println!("invalid {} ({})", report.candidate, e),
                }
            }

            println!();
            println!("{} bootnodes, {} invalid", reports.len(), failed);

            if failed > 0 {
                return Err(anyhow::anyhow!("{} invalid bootnodes", failed));
            }
        }
    }

    info!("Goodbye!");
    Ok(())
}
