//! The Lumen type checker CLI.
//!
//! Provides the `lumenc` command:
//!
//! - `lumenc check [FILE]` - type-check a parsed program tree (JSON),
//!   read from FILE or standard input.
//!
//! Options:
//! - `--source` - path to the original source text; enables labeled-span
//!   reports instead of the plain two-line form
//! - `--all-errors` - print every diagnostic instead of only the first
//!
//! Exit status is 0 exactly when the diagnostic list is empty, 1 when the
//! program has type errors, and 2 when the input could not be read or
//! decoded.

mod render;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use lumen_syntax::Program;

#[derive(Parser)]
#[command(name = "lumenc", version, about = "The Lumen type checker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Type-check a parsed program tree
    Check {
        /// Path to the program tree as JSON; standard input when omitted
        file: Option<PathBuf>,

        /// Path to the original source text, for labeled-span reports
        #[arg(long)]
        source: Option<PathBuf>,

        /// Print every diagnostic instead of only the first
        #[arg(long = "all-errors")]
        all_errors: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    match cli.command {
        Commands::Check { file, source, all_errors } => {
            match check(file.as_deref(), source.as_deref(), all_errors) {
                Ok(true) => process::exit(1),
                Ok(false) => {}
                Err(e) => {
                    eprintln!("error: {}", e);
                    process::exit(2);
                }
            }
        }
    }
}

/// Run the checker over the given tree. Returns whether any diagnostics
/// were produced.
fn check(file: Option<&Path>, source: Option<&Path>, all_errors: bool) -> Result<bool, String> {
    let input = match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read standard input: {}", e))?;
            buf
        }
    };
    let program: Program = serde_json::from_str(&input)
        .map_err(|e| format!("failed to decode program tree: {}", e))?;

    let source_text = match source {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .map_err(|e| format!("failed to read '{}': {}", path.display(), e))?,
        ),
        None => None,
    };

    let result = lumen_typeck::check(&program);
    if result.is_ok() {
        return Ok(false);
    }

    let shown: &[_] = if all_errors {
        &result.diagnostics
    } else {
        std::slice::from_ref(result.first().expect("non-empty diagnostics"))
    };
    if shown.len() == 1 {
        eprintln!("An error occurred during type checking!");
    } else {
        eprintln!("Errors occurred during type checking!");
    }
    for diagnostic in shown {
        match &source_text {
            Some(text) => eprint!("{}", render::render_report(diagnostic, text, true)),
            None => eprintln!("{}", render::render_plain(diagnostic)),
        }
    }
    Ok(true)
}
