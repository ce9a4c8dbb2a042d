//! Command-line surface.
//!
//! Positional arguments keep their historical, mode-dependent meaning:
//!
//! ```text
//! ytmix URL [DRM|drm] [FORMAT_ID] [OUTPUT_FILENAME|LICENSE_SERVER_URL]
//! ```
//!
//! The second argument switches to DRM mode when it is the literal `DRM`
//! (any case); the meaning of the third and fourth depends on that switch.

use clap::Parser;
use log::warn;

use crate::downloader::models::DownloadMode;

pub const USAGE: &str = "ytmix URL [DRM|drm] [FORMAT_ID] [OUTPUT_FILENAME|LICENSE_SERVER_URL]";

#[derive(Parser, Debug)]
#[command(name = "ytmix")]
#[command(about = "List or download media via yt-dlp, mixing video-only formats with matching audio")]
#[command(version)]
#[command(override_usage = USAGE)]
pub struct Cli {
    /// URL, then DRM or FORMAT_ID, then FORMAT_ID/OUTPUT_FILENAME, then LICENSE_SERVER_URL
    #[arg(value_name = "ARGS")]
    pub args: Vec<String>,

    /// Do not pair video-only formats with an audio stream
    #[arg(long)]
    pub no_audio_mix: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// What the user asked for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    pub url: String,
    pub mode: DownloadMode,
    /// None lists formats instead of downloading
    pub format_id: Option<String>,
    /// Plain mode only
    pub output_filename: Option<String>,
    /// DRM mode only
    pub license_server_url: Option<String>,
}

/// Next positional slot to fill
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Url,
    ModeOrFormat,
    OutputFilename,
    DrmFormat,
    LicenseServer,
    Done,
}

impl Invocation {
    /// Fill slots from positional arguments; None when no URL was given
    pub fn from_positionals(args: &[String]) -> Option<Self> {
        let mut inv = Self::default();
        let mut slot = Slot::Url;

        for arg in args {
            slot = match slot {
                Slot::Url => {
                    inv.url = arg.clone();
                    Slot::ModeOrFormat
                }
                Slot::ModeOrFormat if arg.eq_ignore_ascii_case("drm") => {
                    inv.mode = DownloadMode::Drm;
                    Slot::DrmFormat
                }
                Slot::ModeOrFormat => {
                    inv.format_id = Some(arg.clone());
                    Slot::OutputFilename
                }
                Slot::OutputFilename => {
                    inv.output_filename = Some(arg.clone());
                    Slot::Done
                }
                Slot::DrmFormat => {
                    inv.format_id = Some(arg.clone());
                    Slot::LicenseServer
                }
                Slot::LicenseServer => {
                    inv.license_server_url = Some(arg.clone());
                    Slot::Done
                }
                Slot::Done => {
                    warn!("Ignoring extra argument: {}", arg);
                    Slot::Done
                }
            };
        }

        (slot != Slot::Url).then_some(inv)
    }

    pub fn is_drm(&self) -> bool {
        self.mode == DownloadMode::Drm
    }
}
