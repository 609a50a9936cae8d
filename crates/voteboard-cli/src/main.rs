use std::{fs, path::PathBuf};

use clap::{Parser, Subcommand};
use tokio::runtime::Runtime;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use voteboard_db::{config::VoteboardConfig, server::VoteboardServer};

#[derive(Parser, Debug)]
#[command(author, version, about = "Voteboard command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the voteboard server
    Serve {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Initialize configuration on disk
    Init,
    /// Validate configuration without starting the server
    Check {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
    let cli = Cli::parse();
    match cli.command {
        Command::Serve { config } => {
            let cfg = VoteboardConfig::load(config)?;
            let server = VoteboardServer::new(cfg)?;
            let rt = Runtime::new()?;
            rt.block_on(async move { server.run().await })?;
        }
        Command::Init => {
            let path = default_config_path();
            if path.exists() {
                println!("Configuration already exists at {}", path.display());
            } else {
                let cfg = VoteboardConfig::default();
                if let Some(dir) = path.parent() {
                    fs::create_dir_all(dir)?;
                }
                let serialized = serde_yaml::to_string(&cfg)?;
                fs::write(&path, serialized)?;
                println!("Initialized configuration at {}", path.display());
            }
        }
        Command::Check { config } => {
            VoteboardConfig::load(config)?;
            println!("Configuration OK");
        }
    }
    Ok(())
}

fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .map(|dir| dir.join(".voteboard").join("config.yaml"))
        .unwrap_or_else(|| PathBuf::from("./voteboard-config.yaml"))
}
