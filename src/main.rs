mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use relaycast::{config, server};

async fn serve(host: String, port: u16, config_path: Option<&std::path::Path>) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // Override host/port from CLI if specified
    config.server.host = host;
    config.server.port = port;

    config::validate_config(&config)?;

    tracing::info!("Starting Relaycast server");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );
    if config.store.is_none() {
        tracing::warn!("No file store configured; only the universal relay will be served");
    }

    server::start_server(config).await
}

fn validate(config_path: Option<&std::path::Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    config::validate_config(&config)?;
    println!("Configuration is valid");
    Ok(())
}

/// Generate a random token-signing secret
fn generate_secret() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    hex::encode(bytes)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "relaycast=trace,relaycast_token=trace,relaycast_media=debug,tower_http=debug"
                .to_string()
        } else {
            "relaycast=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Serve { host, port } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(serve(host, port, cli.config.as_deref()))
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate(path.as_deref())
        }
        Commands::GenerateSecret => {
            let secret = generate_secret();
            println!("{secret}");
            println!("\nAdd this to your config file:\n\n[proxy]\nsecret = \"{secret}\"");
            Ok(())
        }
        Commands::Version => {
            println!("relaycast {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
