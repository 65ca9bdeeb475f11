//! Quill CLI - markup compiler.
//!
//! Provides commands for:
//! - `render`: Compile a document to HTML or plaintext
//! - `highlight`: Syntax-highlight the markup of a document as HTML
//! - `ast`: Print the document tree or instruction stream

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{AstArgs, HighlightArgs, RenderArgs};
use output::Output;

/// Quill - backslash-directive markup compiler.
#[derive(Parser)]
#[command(name = "quill", version, about)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a document to HTML or plaintext.
    Render(RenderArgs),
    /// Syntax-highlight the markup of a document.
    Highlight(HighlightArgs),
    /// Print the parsed form of a document.
    Ast(AstArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Highlight(args) => args.execute(),
        Commands::Ast(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
