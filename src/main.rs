use clap::Parser;
use halving_sentinel::cli::{Cli, Commands};
use halving_sentinel::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });

    // Initialize telemetry
    let _telemetry = halving_sentinel::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Watch(args) => {
            tracing::info!("Starting live watch");
            args.execute(&config).await?;
        }
        Commands::Parse(args) => {
            args.execute(&config)?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Stream: {}", config.feed.stream_url());
            println!(
                "  Reconnect: {:?} after {}ms (max attempts: {})",
                config.reconnect.strategy, config.reconnect.delay_ms, config.reconnect.max_attempts
            );
            println!("  Flash reset: {}ms", config.flash.reset_ms);
            println!("  Widgets:");
            for widget in &config.widgets {
                println!("    {}: {:?}", widget.name, widget.projection);
            }
            println!();
            print!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}
