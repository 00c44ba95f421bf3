//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

use console::style;

use crate::domain::errors::RunError;

pub use output::progress::{create_spinner, ProgressBarExt};
pub use types::{Cli, Commands};

/// Report a failed command and exit with status 1.
///
/// In JSON mode the error goes to stdout as an object so scripted callers
/// can parse it; otherwise the full cause chain is printed to stderr.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let phase = err.downcast_ref::<RunError>().map(|e| e.phase);
        let causes: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "phase": phase,
            "causes": causes,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );
    } else {
        eprintln!("{} {err:#}", style("Error:").red().bold());
    }
    std::process::exit(1);
}
