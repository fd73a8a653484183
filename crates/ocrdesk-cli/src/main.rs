use clap::{Parser, Subcommand};
use ocrdesk_core::OcrdeskConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "ocrdesk", version, about = "OCR document dashboard")]
struct Cli {
    /// Configuration file. Defaults to ocrdesk.yaml when present.
    #[arg(long, global = true, env = "OCRDESK_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the web dashboard.
    Serve {
        /// Listen host, overriding dashboard.host
        #[arg(long)]
        host: Option<String>,

        /// Listen port, overriding dashboard.port
        #[arg(long)]
        port: Option<u16>,
    },

    /// Check that the backend is reachable and healthy.
    Health,

    /// Print the backend statistics.
    Stats {
        /// Print raw JSON instead of the card listing
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Store the API token. Reads it from stdin when not given.
    Login {
        token: Option<String>,

        /// Store the token without checking it against the backend
        #[arg(long, default_value_t = false)]
        no_verify: bool,
    },

    /// Remove the stored API token.
    Logout,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = OcrdeskConfig::load(cli.config.as_deref())?;

    match cli.cmd {
        Command::Serve { host, port } => commands::serve::serve(config, host, port).await?,
        Command::Health => commands::health::run(&config).await?,
        Command::Stats { json } => commands::stats::run(&config, json).await?,
        Command::Login { token, no_verify } => commands::auth::login(&config, token, !no_verify).await?,
        Command::Logout => commands::auth::logout(&config)?,
    }

    Ok(())
}
