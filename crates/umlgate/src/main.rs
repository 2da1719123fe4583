//! umlgate CLI - `PlantUML` diagram gateway.
//!
//! Provides commands for:
//! - `serve`: Start the diagram gateway
//! - `encode`: Encode diagram source for URLs and request bodies
//! - `decode`: Decode a URL token back to diagram source

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{DecodeArgs, EncodeArgs, ServeArgs};
use output::Output;

/// Application version from Cargo.toml.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// umlgate - `PlantUML` diagram gateway.
#[derive(Parser)]
#[command(name = "umlgate", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the diagram gateway.
    Serve(ServeArgs),
    /// Encode diagram source.
    Encode(EncodeArgs),
    /// Decode a URL token to diagram source.
    Decode(DecodeArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    let verbose = matches!(&cli.command, Commands::Serve(args) if args.verbose);

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let result = match cli.command {
        Commands::Serve(args) => match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(args.execute(VERSION)),
            Err(err) => Err(err.into()),
        },
        Commands::Encode(args) => args.execute(&output),
        Commands::Decode(args) => args.execute(&output),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
