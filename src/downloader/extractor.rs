// yt-dlp backend - drives the native `yt-dlp` binary
//
// - Info extraction via `--dump-json` (format catalog, worst to best)
// - Downloads via `-f <format spec>`, letting yt-dlp fetch and merge streams
//
// Every child is spawned with kill_on_drop, so dropping the backend or an
// aborted future never leaves yt-dlp running.

use async_trait::async_trait;
use log::{debug, info, warn};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;

use super::diagnostics::describe_failure;
use super::errors::DownloadError;
use super::models::{DownloadRequest, FormatDescriptor, MediaInfo, NO_CODEC};
use super::traits::MediaBackend;
use super::utils::{find_ytdlp, run_output_with_timeout, spawn_error};

/// Backend using the yt-dlp binary
pub struct YtDlpBackend {
    ytdlp_path: String,
    timeout_seconds: u64,
}

impl YtDlpBackend {
    /// Use `ytdlp_path` if given, otherwise look the binary up
    pub fn new(ytdlp_path: Option<String>, timeout_seconds: u64) -> Self {
        Self {
            ytdlp_path: ytdlp_path.unwrap_or_else(find_ytdlp),
            timeout_seconds,
        }
    }

    pub fn ytdlp_path(&self) -> &str {
        &self.ytdlp_path
    }

    fn info_args(&self, url: &str) -> Vec<String> {
        vec![
            "--dump-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
            "--socket-timeout".to_string(),
            self.timeout_seconds.to_string(),
            url.to_string(),
        ]
    }

    /// Build download command arguments
    pub fn download_args(&self, url: &str, request: &DownloadRequest) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            request.format_spec.clone(),
            "-o".to_string(),
            request.output_template.clone(),
            "--no-playlist".to_string(),
            "--socket-timeout".to_string(),
            self.timeout_seconds.to_string(),
        ];

        if request.allow_unplayable_formats {
            args.push("--allow-unplayable-formats".to_string());
        }

        args.push(url.to_string());
        args
    }

    /// Parse `--dump-json` output
    pub fn parse_info(stdout: &[u8]) -> Result<MediaInfo, DownloadError> {
        let json: serde_json::Value = serde_json::from_slice(stdout)
            .map_err(|e| DownloadError::ParseError(format!("Invalid JSON: {}", e)))?;

        Ok(MediaInfo {
            id: json["id"].as_str().unwrap_or("unknown").to_string(),
            title: json["title"].as_str().unwrap_or("Unknown").to_string(),
            formats: Self::parse_formats(&json)?,
        })
    }

    fn parse_formats(json: &serde_json::Value) -> Result<Vec<FormatDescriptor>, DownloadError> {
        let formats_array = json["formats"]
            .as_array()
            .ok_or_else(|| DownloadError::ParseError("No formats array in JSON".to_string()))?;

        let mut formats = Vec::with_capacity(formats_array.len());

        for f in formats_array {
            let id = f["format_id"].as_str().ok_or_else(|| {
                DownloadError::ParseError("Format entry without format_id".to_string())
            })?;

            let mut format = FormatDescriptor::new(
                id,
                f["ext"].as_str().unwrap_or(""),
                f["vcodec"].as_str().unwrap_or(NO_CODEC),
                f["acodec"].as_str().unwrap_or(NO_CODEC),
            );
            format.resolution = f["resolution"].as_str().map(|s| s.to_string());
            format.fps = f["fps"].as_f64();
            format.filesize = f["filesize"].as_u64();
            format.filesize_approx = f["filesize_approx"].as_u64();
            format.tbr = f["tbr"].as_f64();
            format.format_note = f["format_note"].as_str().map(|s| s.to_string());

            formats.push(format);
        }

        Ok(formats)
    }
}

#[async_trait]
impl MediaBackend for YtDlpBackend {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn extract_info(&self, url: &str) -> Result<MediaInfo, DownloadError> {
        let args = self.info_args(url);
        debug!("[YtDlp] {} {}", self.ytdlp_path, args.join(" "));

        let output = run_output_with_timeout(&self.ytdlp_path, &args, self.timeout_seconds).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DownloadError::ExecutionError(describe_failure(
                "info extraction",
                &stderr,
            )));
        }

        let info = Self::parse_info(&output.stdout)?;
        info!("[YtDlp] {} formats available for {}", info.formats.len(), info.id);
        Ok(info)
    }

    async fn download(&self, url: &str, request: &DownloadRequest) -> Result<(), DownloadError> {
        let args = self.download_args(url, request);
        info!("[YtDlp] Start download ...");
        debug!("[YtDlp] {} {}", self.ytdlp_path, args.join(" "));

        let mut child = TokioCommand::new(&self.ytdlp_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&self.ytdlp_path, e))?;

        // Relay stderr to the user while keeping it for diagnostics.
        // yt-dlp output is not guaranteed UTF-8, so lines are decoded lossily.
        let mut captured = String::new();
        if let Some(stderr) = child.stderr.take() {
            let mut reader = BufReader::new(stderr);
            let mut buf = Vec::new();
            loop {
                buf.clear();
                match reader.read_until(b'\n', &mut buf).await {
                    Ok(0) => break,
                    Ok(_) => {
                        let text = String::from_utf8_lossy(&buf);
                        let line = text.trim_end_matches(&['\r', '\n'][..]);
                        eprintln!("{}", line);
                        captured.push_str(line);
                        captured.push('\n');
                    }
                    Err(e) => {
                        // Keep draining so the child never blocks on a full pipe
                        warn!("[YtDlp] Stopped relaying stderr: {}", e);
                        let _ = tokio::io::copy(&mut reader, &mut tokio::io::sink()).await;
                        break;
                    }
                }
            }
        }

        let status = child.wait().await?;
        if status.success() {
            info!("[YtDlp] Download finished");
            Ok(())
        } else {
            warn!("[YtDlp] yt-dlp exited with {}", status);
            Err(DownloadError::ExecutionError(describe_failure("download", &captured)))
        }
    }
}
