//! QSIP Command-Line Interface
//!
//! Translates OpenQASM 3 programs into quantikz diagrams.
//!
//! ```text
//! q0: ──H──●──M═══╗
//! q1: ─────X──────X──
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{doctor, layout, render, tex, version};

/// QSIP - OpenQASM 3 to quantikz circuit diagrams
#[derive(Parser)]
#[command(name = "qsip")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Options file (YAML); defaults to <config dir>/qsip/config.yaml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the quantikz code of a circuit
    Tex {
        /// Input file (OpenQASM 3)
        #[arg(short, long)]
        input: PathBuf,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Emit a complete standalone document
        #[arg(long)]
        document: bool,

        /// Row separation (TeX length)
        #[arg(long)]
        row_sep: Option<String>,

        /// Column separation (TeX length)
        #[arg(long)]
        col_sep: Option<String>,

        /// Omit the ket labels at the start of each wire
        #[arg(long)]
        no_labels: bool,
    },

    /// Compile a circuit to PDF with pdflatex
    Render {
        /// Input file (OpenQASM 3)
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF
        #[arg(short, long)]
        output: PathBuf,

        /// Also write a PNG preview next to the PDF
        #[arg(long)]
        preview: bool,

        /// Border of the standalone document (TeX length)
        #[arg(long)]
        border: Option<String>,

        /// Timeout for each external command, in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Print the column layout of a circuit as JSON
    Layout {
        /// Input file (OpenQASM 3)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Check the LaTeX toolchain
    Doctor,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();

    // Execute command
    let result = match cli.command {
        Commands::Tex {
            input,
            output,
            document,
            row_sep,
            col_sep,
            no_labels,
        } => {
            tex::execute(
                &input,
                output.as_deref(),
                config,
                tex::Flags {
                    document,
                    row_sep,
                    col_sep,
                    no_labels,
                },
            )
            .await
        }

        Commands::Render {
            input,
            output,
            preview,
            border,
            timeout,
        } => render::execute(&input, &output, config, preview, border, timeout).await,

        Commands::Layout { input } => layout::execute(&input).await,

        Commands::Doctor => doctor::execute(config).await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {:#}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
