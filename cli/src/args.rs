//! Command-line arguments.

use std::path::{Path, PathBuf};

use clap::Parser;
use socratic_engine::SocraticConfig;
use socratic_engine::config::{AppConfig, PolicyConfig};

/// Socratic tutor: asks questions, tracks your reasoning, and verifies claims.
#[derive(Debug, Parser)]
#[command(name = "socratic", version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.socratic/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Replay learner messages from a file, one per line, then exit
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,

    /// Append a JSONL transcript of every turn to this file
    #[arg(long, value_name = "FILE")]
    pub transcript: Option<PathBuf>,

    /// Scenario label recorded in the transcript header
    #[arg(long)]
    pub scenario: Option<String>,

    /// Use fixed templates instead of a generation provider
    #[arg(long)]
    pub offline: bool,

    /// Readiness threshold for finishing a verified conversation
    #[arg(long, value_name = "0..1")]
    pub tau: Option<f64>,
}

impl Cli {
    /// Command-line overrides take precedence over the config file.
    pub fn apply(&self, config: &mut SocraticConfig) {
        if self.offline {
            config.app.get_or_insert_with(AppConfig::default).offline = true;
        }
        if let Some(tau) = self.tau {
            config.policy.get_or_insert_with(PolicyConfig::default).tau = Some(tau);
        }
    }

    /// Label for the transcript header: explicit, else the script's stem.
    pub fn scenario_label(&self) -> String {
        if let Some(label) = &self.scenario {
            return label.clone();
        }
        self.script
            .as_deref()
            .and_then(Path::file_stem)
            .map_or_else(|| "interactive".to_string(), |stem| stem.to_string_lossy().into_owned())
    }
}
