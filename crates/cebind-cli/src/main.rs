//! cebind CLI - encode, decode and validate CloudEvents HTTP messages.

use std::env;

use cebind_core::Mode;
use clap::{Parser, Subcommand};

mod commands;
mod input;
mod output;

use commands::{decode, echo, encode, gen, validate};

#[derive(Parser)]
#[command(name = "cebind")]
#[command(about = "CloudEvents HTTP binding codec CLI")]
struct Cli {
    /// Log at debug level (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate valid sample events as a JSON array
    Gen {
        /// Number of events
        #[arg(long, default_value_t = 3)]
        count: u32,
        /// Output file (stdout if not provided)
        #[arg(long)]
        output: Option<String>,
        /// Overwrite the output file if it exists
        #[arg(long)]
        force: bool,
    },
    /// Encode events from JSON into an HTTP request
    Encode {
        /// Content mode: binary, structured or batch
        #[arg(long, default_value_t = Mode::Structured)]
        mode: Mode,
        /// Input JSON file, one event or an array (or stdin if not provided)
        input: Option<String>,
    },
    /// Decode events from an HTTP request or response
    Decode {
        /// Message text file (or stdin if not provided)
        input: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate events and report warnings
    Validate {
        /// Input JSON file, one event or an array (or stdin if not provided)
        input: Option<String>,
        /// Exit with error code on warnings too
        #[arg(long)]
        strict: bool,
    },
    /// Round-trip events through an in-process client and echo server
    Echo {
        /// Content mode: binary, structured or batch
        #[arg(long, default_value_t = Mode::Batch)]
        mode: Mode,
        /// Input JSON file, one event or an array (or stdin if not provided)
        input: Option<String>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "debug".to_string()
    } else {
        env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Gen {
            count,
            output,
            force,
        } => gen::run(count, output, force),
        Commands::Encode { mode, input } => encode::run(mode, input),
        Commands::Decode { input, json } => decode::run(input, json),
        Commands::Validate { input, strict } => validate::run(input, strict),
        Commands::Echo { mode, input } => echo::run(mode, input),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
