//! Spark CLI - Command-line runner for particle emitter files

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{check, simulate};

#[derive(Parser)]
#[command(name = "spark")]
#[command(about = "Run and check 2D particle emitters headless", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Step an emitter through time and report the pool after each frame
    Simulate {
        /// Path to emitter TOML file
        config: String,

        /// Stop after this many ms of session time
        #[arg(long, default_value = "10000")]
        duration: u64,

        /// Stop emitting at this session time and let particles drain
        #[arg(long)]
        stop_at: Option<u64>,

        /// Override the RNG seed from the file
        #[arg(long)]
        seed: Option<u64>,

        /// Report every Nth frame
        #[arg(long, default_value = "1")]
        every: usize,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// Parse and validate an emitter file without running it
    Check {
        /// Path to emitter TOML file
        config: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match cli.verbose {
        0 => {}
        1 => {
            logger.filter_level(log::LevelFilter::Info);
        }
        2 => {
            logger.filter_level(log::LevelFilter::Debug);
        }
        _ => {
            logger.filter_level(log::LevelFilter::Trace);
        }
    }
    logger.init();

    match cli.command {
        Commands::Simulate {
            config,
            duration,
            stop_at,
            seed,
            every,
            format,
        } => simulate::run(simulate::SimulateArgs {
            config,
            duration,
            stop_at,
            seed,
            every,
            format,
        }),
        Commands::Check { config, format } => check::run(&config, &format),
    }
}
