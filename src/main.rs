//! Command-line interface for calcline.
//!
//! Without a subcommand the binary runs as a worker: it reads requests from
//! stdin, one per line, and writes one JSON response per line to stdout.
//! Logs go to stderr so they never interleave with responses.

use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use calcline::calculator::CalcResult;
use calcline::{Engine, EngineConfig, Settings, worker};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to a config file (defaults to <config dir>/calcline/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve line-delimited requests on stdin/stdout (default)
    Serve,
    /// Evaluate a single expression
    Eval {
        /// Expression to evaluate
        expression: String,
    },
    /// Convert a value between units
    Convert {
        /// Value to convert
        value: String,
        /// Source unit (e.g. mm)
        from: String,
        /// Target unit (e.g. m)
        to: String,
    },
    /// List the named unit conversions
    Units,
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    let settings = Settings::load(args.config.as_deref())?;
    init_logging(&settings.log_level);

    let engine = Engine::new(EngineConfig::from_settings(&settings)?);

    match args.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            worker::run(&engine, io::stdin().lock(), io::stdout().lock())?;
        }
        Commands::Eval { expression } => match engine.evaluate(&expression) {
            CalcResult::Success {
                result,
                intermediate,
                ..
            } => {
                println!("{result}");
                println!("{intermediate}");
            }
            CalcResult::Error { error, .. } => anyhow::bail!("{error}"),
        },
        Commands::Convert { value, from, to } => {
            let value = Decimal::from_str(value.trim())
                .with_context(|| format!("'{value}' is not a number"))?;
            let converted = engine.convert(value, &from, &to)?;
            println!("{}", converted.derivation);
        }
        Commands::Units => {
            for name in engine.config().conversions.names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}
