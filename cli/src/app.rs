//! Application context — unified state passed to every command handler.
//!
//! Built once in `Cli::run()` from the global flags; command handlers take
//! `&AppContext` instead of loose output, config and filesystem parameters.

use std::path::PathBuf;

use crate::infra::config::YamlConfigStore;
use crate::infra::fs::LocalFs;
use crate::output::OutputContext;
use crate::output::reporter::{SilentReporter, TerminalReporter};

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable terminal output (default).
    Human,
    /// Machine-readable JSON output.
    Json,
}

/// Flags passed from the top-level CLI to `AppContext::new`.
pub struct AppFlags {
    /// Disable ANSI color output.
    pub no_color: bool,
    /// Suppress non-error output.
    pub quiet: bool,
    /// Enable JSON output mode.
    pub json: bool,
    /// Settings file override (`--config` / `ITEST_STACK_CONFIG`).
    pub config: Option<PathBuf>,
}

/// Unified application context passed to every command handler.
pub struct AppContext {
    /// Terminal output context (colors, quiet mode).
    pub output: OutputContext,
    /// Output rendering mode (human vs JSON).
    pub mode: OutputMode,
    /// Settings file store.
    pub config_store: YamlConfigStore,
    /// Filesystem used for staging and writing documents.
    pub fs: LocalFs,
}

impl AppContext {
    /// Construct an `AppContext` from top-level CLI flags.
    #[must_use]
    pub fn new(flags: AppFlags) -> Self {
        let mode = if flags.json {
            OutputMode::Json
        } else {
            OutputMode::Human
        };

        Self {
            output: OutputContext::new(flags.no_color, flags.quiet),
            mode,
            config_store: YamlConfigStore::new(flags.config),
            fs: LocalFs,
        }
    }

    /// Returns `true` when JSON output mode is active.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.mode == OutputMode::Json
    }

    /// Reporter for application services: terminal in human mode, silent in
    /// JSON mode.
    #[must_use]
    pub fn reporter(&self) -> Reporter<'_> {
        match self.mode {
            OutputMode::Human => Reporter::Terminal(TerminalReporter::new(&self.output)),
            OutputMode::Json => Reporter::Silent(SilentReporter),
        }
    }
}

/// Mode-dependent progress reporter.
pub enum Reporter<'a> {
    Terminal(TerminalReporter<'a>),
    Silent(SilentReporter),
}

impl crate::application::ports::ProgressReporter for Reporter<'_> {
    fn step(&self, message: &str) {
        match self {
            Self::Terminal(r) => r.step(message),
            Self::Silent(r) => r.step(message),
        }
    }

    fn success(&self, message: &str) {
        match self {
            Self::Terminal(r) => r.success(message),
            Self::Silent(r) => r.success(message),
        }
    }

    fn warn(&self, message: &str) {
        match self {
            Self::Terminal(r) => r.warn(message),
            Self::Silent(r) => r.warn(message),
        }
    }
}
