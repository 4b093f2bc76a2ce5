use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bridgegen")]
#[command(about = "Generate native-interop call thunks from member declarations", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one binding unit per type
    Generate {
        /// Declaration set (JSON format)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory for `{Type}_binding.rs` files
        #[arg(short, long)]
        output: PathBuf,

        /// Generator config (TOML); defaults to bridgegen.toml beside the input
        #[arg(short, long, env = "BRIDGEGEN_CONFIG")]
        config: Option<PathBuf>,

        /// Succeed even if some declarations were skipped
        #[arg(long)]
        allow_diagnostics: bool,
    },

    /// Check declarations without writing anything
    Check {
        /// Declaration set (JSON format)
        #[arg(short, long)]
        input: PathBuf,

        /// Generator config (TOML)
        #[arg(short, long, env = "BRIDGEGEN_CONFIG")]
        config: Option<PathBuf>,
    },

    /// List the native entry point of every declaration
    Symbols {
        /// Declaration set (JSON format)
        #[arg(short, long)]
        input: PathBuf,

        /// Generator config (TOML)
        #[arg(short, long, env = "BRIDGEGEN_CONFIG")]
        config: Option<PathBuf>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the default config, or write it to a file
    InitConfig {
        /// Where to write the config
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        tracing::Level::TRACE
    } else if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    // RUST_LOG wins over the flags when set.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.debug) // Show target module in debug mode
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Generate {
            input,
            output,
            config,
            allow_diagnostics,
        } => {
            bridgegen::handle_generate(&input, &output, config.as_deref(), allow_diagnostics)?;
        }
        Commands::Check { input, config } => {
            bridgegen::handle_check(&input, config.as_deref())?;
        }
        Commands::Symbols {
            input,
            config,
            json,
        } => {
            let rows = bridgegen::handle_symbols(&input, config.as_deref())?;
            println!("{}", bridgegen::format_symbols(&rows, json)?);
        }
        Commands::InitConfig { output } => {
            let text = bridgegen::handle_init_config(output.as_deref())?;
            if output.is_none() {
                print!("{}", text);
            }
        }
    }
    Ok(())
}
