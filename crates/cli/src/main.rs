use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use mcx_cli::commands::{
    block_graph_command, dump_command, goto_command, info_command, insn_graph_command,
    maturities_command,
};
use mcx_cli::load_explorer_config;

/// Microcode explorer CLI.
///
/// This CLI is a thin wrapper around `microcode-explorer-core` (exposed in code
/// as `mcx_core`). It drives the explorer against a headless host, so listings
/// and graphs can be inspected from program fixtures without a UI.
#[derive(Parser, Debug)]
#[command(
    name = "microcode-explorer",
    version,
    about = "Browse decompiler microcode listings and graphs",
    long_about = None
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Command,
}

/// Options shared across all subcommands.
#[derive(Args, Debug)]
struct GlobalOptions {
    /// Explorer config file (.json, .yaml, or .yml). Defaults apply when absent.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON instead of human-readable text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Enable debug-level logging.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,
}

/// Which function, at which maturity, to open.
#[derive(Args, Debug)]
struct ViewArgs {
    /// Program fixture (JSON, or YAML by extension).
    #[arg(long)]
    input: PathBuf,

    /// Address inside the function: hex (0x401000) or a fixture symbol.
    #[arg(long)]
    ea: String,

    /// Maturity level (e.g. MMAT_LOCOPT or locopt). Defaults to the config's.
    #[arg(long)]
    maturity: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the fixture's hash, functions, and available maturity levels.
    Info {
        /// Program fixture (JSON, or YAML by extension).
        #[arg(long)]
        input: PathBuf,
    },

    /// List the maturity levels microcode can be generated at.
    Maturities,

    /// Print the microcode listing of a function with line numbers.
    Dump {
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Resolve a block number or address to the listing line a jump lands on.
    Goto {
        #[command(flatten)]
        view: ViewArgs,

        /// Block number (decimal) or address (hex or symbol).
        #[arg(long)]
        target: String,
    },

    /// Print the expression graph of the instruction on a listing line.
    InsnGraph {
        #[command(flatten)]
        view: ViewArgs,

        /// Zero-based listing line holding the instruction.
        #[arg(long)]
        line: usize,
    },

    /// Print the block graph of a function.
    BlockGraph {
        #[command(flatten)]
        view: ViewArgs,
    },
}

fn init_logging(verbose: bool) {
    // --verbose enables debug; RUST_LOG overrides.
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };
    env_logger::Builder::new()
        .filter_module("mcx_core", level)
        .filter_module("mcx_cli", level)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let GlobalOptions { config, json, verbose } = cli.global;

    // JSON output stays clean of log lines.
    if !json {
        init_logging(verbose);
    }

    let config = load_explorer_config(config.as_deref())?;

    match cli.command {
        Command::Info { input } => info_command(&input, json)?,
        Command::Maturities => maturities_command(config.default_maturity, json)?,
        Command::Dump { view } => {
            dump_command(&view.input, &view.ea, view.maturity.as_deref(), config, json)?
        }
        Command::Goto { view, target } => goto_command(
            &view.input,
            &view.ea,
            view.maturity.as_deref(),
            &target,
            config,
            json,
        )?,
        Command::InsnGraph { view, line } => insn_graph_command(
            &view.input,
            &view.ea,
            view.maturity.as_deref(),
            line,
            config,
            json,
        )?,
        Command::BlockGraph { view } => {
            block_graph_command(&view.input, &view.ea, view.maturity.as_deref(), config, json)?
        }
    }

    Ok(())
}
