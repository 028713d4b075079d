use clap::{Parser, Subcommand};
use std::path::Path;
use tracing_subscriber::EnvFilter;

use pestfront::cli::commands;
use pestfront::config::GameConfig;

#[derive(Parser)]
#[command(name = "pestfront")]
#[command(about = "A two-faction hex strategy game: humans against pests")]
#[command(version)]
struct Cli {
    /// Path to the configuration file. Built-in defaults are used if it does not exist.
    #[arg(short, long, default_value = "pestfront.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play one computer-vs-computer match and print the board every round
    Play {
        /// World seed (0 = random)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Run many matches in parallel and report win rates
    Simulate {
        /// Number of matches to run
        #[arg(short, long, default_value_t = 100)]
        matches: u32,

        /// Seed of the first match; later matches count up from it (0 = random)
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Follow a computer-vs-computer match through a live session
    Watch {
        /// World seed (0 = random)
        #[arg(short, long)]
        seed: Option<u64>,
    },
}

fn load_config(path: &str) -> GameConfig {
    let path = Path::new(path);
    if !path.exists() {
        return GameConfig::default();
    }
    match GameConfig::from_file(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = load_config(&cli.config);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Play { seed } => commands::play(&config, seed.unwrap_or(config.world.seed)),
        Commands::Simulate { matches, seed } => {
            commands::simulate(&config, matches, seed.unwrap_or(config.world.seed)).map(|_| ())
        }
        Commands::Watch { seed } => commands::watch(&config, seed.unwrap_or(config.world.seed)).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
