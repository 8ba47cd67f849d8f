use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use loam::{LoamError, OptimizerConfig, emit_diagnostics, optimize_expr_file, optimize_ssa_file};

#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "loam")]
#[command(about = "Remove dead code from loam expression trees and SSA term blocks")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// JSON file with optimizer settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print the input before optimizing it
    #[arg(long, global = true)]
    dump_before: bool,

    #[arg(long, global = true)]
    no_deadcode: bool,

    #[arg(long, global = true)]
    no_sweep: bool,

    #[arg(long, global = true)]
    no_inline: bool,

    /// Skip the ordering check after the term pipeline
    #[arg(long, global = true)]
    no_verify: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Lower a JSON expression tree, remove dead bindings and print the tree.
    Expr {
        /// Path to the expression tree
        input: PathBuf,
    },
    /// Run the term pipeline over a JSON function block and print the dump.
    Ssa {
        /// Path to the root function block
        input: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(&cli) {
        if let LoamError::Verify(diags) = &err {
            emit_diagnostics(diags.diagnostics());
        }
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), LoamError> {
    let config = load_config(cli)?;

    match &cli.command {
        Command::Expr { input } => {
            let outcome = optimize_expr_file(input, &config)?;
            if cli.dump_before {
                println!("before: {}", outcome.before);
            }
            println!("{}", outcome.after);
            if let Some(stats) = outcome.stats {
                tracing::info!(
                    removed_values = stats.removed_values,
                    removed_functions = stats.removed_functions,
                    released_nodes = stats.released_nodes,
                    "dead code removed"
                );
            }
        }
        Command::Ssa { input } => {
            let outcome = optimize_ssa_file(input, &config)?;
            if cli.dump_before {
                println!("before:");
                print!("{}", outcome.before);
                println!("after:");
            }
            print!("{}", outcome.after);
            tracing::info!(
                swept = outcome.stats.swept,
                inlined = outcome.stats.inlined,
                "term pipeline done"
            );
        }
    }
    Ok(())
}

/// The config file, if any, with command-line switches applied on top.
fn load_config(cli: &Cli) -> Result<OptimizerConfig, LoamError> {
    let mut config = match cli.config.as_deref() {
        Some(path) => OptimizerConfig::load(path)?,
        None => OptimizerConfig::default(),
    };
    apply_overrides(&mut config, cli);
    Ok(config)
}

fn apply_overrides(config: &mut OptimizerConfig, cli: &Cli) {
    config.deadcode &= !cli.no_deadcode;
    config.sweep &= !cli.no_sweep;
    config.inline &= !cli.no_inline;
    config.verify &= !cli.no_verify;
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
