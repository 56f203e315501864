//! Redecl command-line tool
//!
//! Reconstructs native declaration sources from a reflection snapshot.

mod commands;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::Level;

use output::StyledOutput;

#[derive(Parser)]
#[command(name = "redecl")]
#[command(about = "Native declaration generator for reflection snapshots", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// When to color output
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn as_flag(self) -> &'static str {
        match self {
            ColorMode::Auto => "auto",
            ColorMode::Always => "always",
            ColorMode::Never => "never",
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate declaration files for every eligible object
    Dump {
        /// Snapshot file (JSON)
        snapshot: PathBuf,
        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
        /// Generator configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Skip module build descriptors
        #[arg(long)]
        no_build_files: bool,
    },

    /// List eligible objects and the file names they would receive
    Inspect {
        /// Snapshot file (JSON)
        snapshot: PathBuf,
        /// Generator configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let mut out = StyledOutput::new(output::resolve_color_choice(Some(cli.color.as_flag())));

    let result = match cli.command {
        Commands::Dump {
            snapshot,
            output,
            config,
            no_build_files,
        } => commands::dump::execute(
            &mut out,
            commands::dump::DumpOptions {
                snapshot,
                output,
                config,
                no_build_files,
            },
        ),
        Commands::Inspect { snapshot, config } => commands::inspect::execute(&mut out, &snapshot, config.as_deref()),
    };

    if let Err(e) = result {
        out.stderr_error("error: ");
        out.stderr_plain(&format!("{:#}\n", e));
        std::process::exit(1);
    }
}
