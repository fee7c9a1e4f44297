//! Configuration loaded from the environment (and `.env` when present).

use crate::domain::jobs::ProcessorCommand;
use crate::domain::layout::OutputLayout;
use std::env;
use std::path::PathBuf;

/// Runtime configuration for the upload server.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Root of the served output tree (`output/`, `final/`, `jobs/`)
    pub output_root: PathBuf,
    /// Directory holding per-request workspaces
    pub tmp_dir: PathBuf,
    /// External processing command and its leading arguments
    pub processor: ProcessorCommand,
    /// Whether jobs share one output directory or get their own
    pub layout: OutputLayout,
    /// Margin passed to the processor when the form leaves it out
    pub default_margin: String,
    /// How many job records are kept in memory
    pub job_history: usize,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| String::from(default));

        let layout = var("OUTPUT_LAYOUT", "shared");
        let layout = layout.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %layout, "unknown OUTPUT_LAYOUT, falling back to shared");
            OutputLayout::Shared
        });

        let job_history = var("JOB_HISTORY", "256");
        let job_history = job_history.parse().unwrap_or_else(|_| {
            tracing::warn!(value = %job_history, "invalid JOB_HISTORY, keeping 256 records");
            256
        });

        Self {
            addr: var("ADDR", "127.0.0.1"),
            port: var("PORT", "3000"),
            output_root: PathBuf::from(var("OUTPUT_ROOT", "static/output_root")),
            tmp_dir: PathBuf::from(var("TMP_DIR", "tmp")),
            processor: ProcessorCommand {
                program: var("PROCESSOR_PROGRAM", "python3.10"),
                args: var("PROCESSOR_ARGS", "test.py")
                    .split_whitespace()
                    .map(String::from)
                    .collect(),
            },
            layout,
            default_margin: var("DEFAULT_MARGIN", "20"),
            job_history,
        }
    }
}
