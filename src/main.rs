use clap::Parser;
use coinwatch::cli::{Cli, Commands};
use coinwatch::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // An unreadable or invalid config is fatal; the service never starts
    // degraded
    let config = Config::load(&cli.config)
        .map_err(|e| anyhow::anyhow!("could not load config from {}: {}", cli.config, e))?;

    let _guard = coinwatch::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Run(args) => {
            tracing::info!("starting coinwatch");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            for symbol in &config.symbols {
                println!("  Symbol: {} ({}) -> {}", symbol.id, symbol.name, symbol.ticker);
            }
            println!("  Feed: {}", config.feed.ws_url);
            println!(
                "  Baseline: {:?} every {}s via {}",
                config.baseline.semantics, config.baseline.interval_secs, config.baseline.rest_url
            );
            match &config.baseline.persist_dir {
                Some(dir) => println!("  Persistence: {}", dir.display()),
                None => println!("  Persistence: disabled"),
            }
        }
    }

    Ok(())
}
