use anyhow::Result;
use clap::Parser;
use log::info;

use ytmix::cli::{Cli, Invocation, USAGE};
use ytmix::config::AppConfig;
use ytmix::downloader::{Orchestrator, RunOutcome, YtDlpBackend};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let Some(invocation) = Invocation::from_positionals(&cli.args) else {
        println!("Usage: {}", USAGE);
        return Ok(());
    };

    let config = AppConfig::from_env()?.with_auto_mix_audio(!cli.no_audio_mix);
    info!("Media directory: {}", config.media_dir.display());

    // One backend per run; dropping it reaps any yt-dlp child on every exit path
    let backend = YtDlpBackend::new(config.ytdlp_path.clone(), config.timeout_seconds);
    let orchestrator = Orchestrator::new(config, Box::new(backend))?;

    let outcome = match orchestrator.run(&invocation).await {
        Ok(outcome) => outcome,
        Err(e) if e.is_selection_error() => {
            return Err(anyhow::Error::new(e).context(format!(
                "Format selection failed; run `ytmix {}` to list available formats",
                invocation.url
            )));
        }
        Err(e) => return Err(e.into()),
    };

    match outcome {
        RunOutcome::Listed(table) => print!("{}", table),
        RunOutcome::Downloaded { plan, key } => {
            info!("Downloaded format {} ({})", plan.composite_id(), plan.extension());
            match key {
                Some(key) => println!("Key: {}", key),
                None if invocation.is_drm() => info!("No key resolved"),
                None => {}
            }
        }
    }

    Ok(())
}
