//! polymesh-cli: Command-line interface for polyhedral mesh conversion.
//!
//! Turns reader output (signed cell-face connectivity) into an owner/neighbour
//! mesh, repairs multiply-connected cells, and cleans up mirrored meshes.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=polymesh=info` - Stage summaries
//! - `RUST_LOG=polymesh=debug` - Per-pair merge detail
//! - `RUST_LOG=polymesh::timing=debug` - Performance timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Convert with info logging
//! RUST_LOG=polymesh=info polymesh convert case.raw.json -o case.mesh.json
//!
//! # Check a finalized mesh, machine-readable
//! polymesh --format json check case.mesh.json
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{check, convert, info, mirror, repair};

/// polymesh - Build and repair polyhedral mesh topology.
///
/// Converts cell-face connectivity into owner/neighbour form and merges
/// duplicate faces between multiply-connected cells.
#[derive(Parser)]
#[command(name = "polymesh")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Display statistics of a finalized mesh
    Info {
        /// Input mesh file (JSON)
        input: PathBuf,
    },

    /// Check a finalized mesh for topology problems
    Check {
        /// Input mesh file (JSON)
        input: PathBuf,
    },

    /// Build a finalized mesh from reader output
    Convert {
        /// Raw mesh file (JSON)
        input: PathBuf,

        /// Output mesh file
        #[arg(short, long)]
        output: PathBuf,

        /// Conversion parameters (JSON); flags below override it
        #[arg(long)]
        config: Option<PathBuf>,

        /// Scale factor applied to all points
        #[arg(long)]
        scale: Option<f64>,

        /// Numeric base of signed face references
        #[arg(long)]
        face_ref_base: Option<i64>,

        /// Skip the multiply-connected repair pass
        #[arg(long)]
        no_repair: bool,

        /// Skip input validation and the boundary contiguity check
        #[arg(long)]
        no_checks: bool,
    },

    /// Merge duplicate faces between multiply-connected cells
    Repair {
        /// Input mesh file (JSON)
        input: PathBuf,

        /// Output mesh file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Remove the seam of a mirrored mesh
    Mirror {
        /// Input mesh file (JSON)
        input: PathBuf,

        /// Output mesh file
        #[arg(short, long)]
        output: PathBuf,

        /// A point on the mirror plane, as x,y,z
        #[arg(long, value_delimiter = ',', default_value = "0,0,0")]
        point: Vec<f64>,

        /// Mirror plane normal, as x,y,z
        #[arg(long, value_delimiter = ',', default_value = "0,0,1")]
        normal: Vec<f64>,

        /// Tolerance for the on-plane test
        #[arg(long, default_value = "1e-8")]
        tolerance: f64,
    },
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "polymesh=info",
            2 => "polymesh=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Info { input } => info::run(input, &cli),
        Commands::Check { input } => check::run(input, &cli),
        Commands::Convert {
            input,
            output,
            config,
            scale,
            face_ref_base,
            no_repair,
            no_checks,
        } => convert::run(
            input,
            output,
            convert::Overrides {
                config: config.as_deref(),
                scale: *scale,
                face_ref_base: *face_ref_base,
                no_repair: *no_repair,
                no_checks: *no_checks,
            },
            &cli,
        ),
        Commands::Repair { input, output } => repair::run(input, output, &cli),
        Commands::Mirror {
            input,
            output,
            point,
            normal,
            tolerance,
        } => mirror::run(input, output, point, normal, *tolerance, &cli),
    };

    if let Err(e) = &result {
        if !cli.quiet {
            if let Some(mesh_err) = e.downcast_ref::<polymesh::MeshError>() {
                eprintln!("{}: {}", "Error".red().bold(), mesh_err);
                eprintln!("  {}: {}", "Code".cyan(), mesh_err.code());
                eprintln!(
                    "  {}: {}",
                    "Suggestion".green(),
                    mesh_err.recovery_suggestion()
                );
                if let Some(location) = mesh_err.location() {
                    eprintln!("  {}: {}", "Location".yellow(), location);
                }
            } else {
                eprintln!("{}: {}", "Error".red().bold(), e);
                for cause in e.chain().skip(1) {
                    eprintln!("  {}: {}", "Caused by".yellow(), cause);
                }
            }
        }
        std::process::exit(1);
    }

    Ok(())
}
