// src/cli/mod.rs — CLI definition (clap derive)

pub mod run;

use clap::Parser;

/// Every flag is optional: with none given the run is fully determined by
/// `suitegen.toml` (if present), `GEMINI_API_KEY` and `SUITEGEN_MODEL`.
#[derive(Parser, Debug, Default)]
#[command(
    name = "suitegen",
    about = "Let one model write a test suite and another judge it until it is good enough",
    version
)]
pub struct Cli {
    /// Config file path (defaults to ./suitegen.toml when it exists)
    #[arg(long)]
    pub config: Option<String>,

    /// Model name, overrides SUITEGEN_MODEL and the config file
    #[arg(short, long)]
    pub model: Option<String>,

    /// Revision rounds after the initial suite
    #[arg(short = 'i', long)]
    pub max_iterations: Option<u32>,

    /// Seconds to pause after each revision
    #[arg(long)]
    pub delay_secs: Option<u64>,
}
