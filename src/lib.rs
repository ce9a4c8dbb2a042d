pub mod cli;
pub mod config;
pub mod downloader;

pub use cli::{Cli, Invocation};
pub use config::AppConfig;
pub use downloader::{DownloadError, FormatSelector, Orchestrator, RunOutcome};
