// Failure diagnostics - classifies yt-dlp error output
//
// Used to attach a readable cause to a failed extraction or download.

/// Why a yt-dlp run failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// Encrypted formats without --allow-unplayable-formats
    DrmProtected,
    GeoBlocked,
    PrivateVideo,
    /// Deleted, removed or never existed
    Unavailable,
    AgeRestricted,
    /// 429 or similar throttling
    RateLimited,
    Http403Forbidden,
    NetworkTimeout,
    /// yt-dlp itself rejected the format spec
    FormatUnavailable,
    UnsupportedUrl,
    Unknown,
}

impl FailureReason {
    pub fn description(&self) -> &'static str {
        match self {
            Self::DrmProtected => "DRM-protected content",
            Self::GeoBlocked => "Geographic restriction",
            Self::PrivateVideo => "Private video",
            Self::Unavailable => "Media unavailable",
            Self::AgeRestricted => "Age-restricted content",
            Self::RateLimited => "Rate limited by the site",
            Self::Http403Forbidden => "Access denied (HTTP 403)",
            Self::NetworkTimeout => "Network timeout",
            Self::FormatUnavailable => "Requested format is not available",
            Self::UnsupportedUrl => "Unsupported URL",
            Self::Unknown => "Unknown failure",
        }
    }

    /// Suggestion for the user, where one exists
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::DrmProtected => Some("Run again with the DRM argument to keep encrypted formats."),
            Self::GeoBlocked => Some("Try a proxy or VPN in an allowed region."),
            Self::RateLimited => Some("Wait a few minutes before retrying."),
            Self::Http403Forbidden => Some("Update yt-dlp; the site may have changed."),
            Self::NetworkTimeout => Some("Check the network connection."),
            Self::FormatUnavailable => Some("Run without a format id to list available formats."),
            _ => None,
        }
    }
}

/// Analyze yt-dlp stderr and return the failure reason
pub fn diagnose(stderr: &str) -> Option<FailureReason> {
    let lower = stderr.to_lowercase();

    // Order matters: the most specific patterns come first
    if has_word(&lower, "drm") || lower.contains("widevine") || lower.contains("playready") {
        return Some(FailureReason::DrmProtected);
    }

    if lower.contains("requested format is not available") {
        return Some(FailureReason::FormatUnavailable);
    }

    if lower.contains("unsupported url") {
        return Some(FailureReason::UnsupportedUrl);
    }

    if lower.contains("available in your country") || lower.contains("geo restrict") {
        return Some(FailureReason::GeoBlocked);
    }

    if lower.contains("private video") || lower.contains("video is private") {
        return Some(FailureReason::PrivateVideo);
    }

    if lower.contains("sign in to confirm your age") || lower.contains("age-restricted") {
        return Some(FailureReason::AgeRestricted);
    }

    if lower.contains("video unavailable")
        || lower.contains("has been removed")
        || lower.contains("http error 404")
    {
        return Some(FailureReason::Unavailable);
    }

    if lower.contains("429") || lower.contains("too many requests") {
        return Some(FailureReason::RateLimited);
    }

    if lower.contains("403") || lower.contains("forbidden") {
        return Some(FailureReason::Http403Forbidden);
    }

    if lower.contains("timed out") || lower.contains("timeout") {
        return Some(FailureReason::NetworkTimeout);
    }

    if !stderr.trim().is_empty() {
        return Some(FailureReason::Unknown);
    }

    None
}

/// Whole-word match; `_` counts as part of a word so file names like
/// `drm_content` do not match `drm`
fn has_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|token| token == word)
}

/// Compose an error message for a failed yt-dlp run
pub fn describe_failure(action: &str, stderr: &str) -> String {
    let details = stderr.trim();
    match diagnose(stderr) {
        Some(reason) => {
            let mut msg = format!("yt-dlp {} failed ({})", action, reason.description());
            if let Some(hint) = reason.hint() {
                msg.push_str(&format!(". {}", hint));
            }
            msg.push_str(&format!("\n{}", details));
            msg
        }
        None => format!("yt-dlp {} failed", action),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drm_detection() {
        let err = "ERROR: [generic] This video is DRM protected";
        assert_eq!(diagnose(err), Some(FailureReason::DrmProtected));
    }

    #[test]
    fn test_drm_detection_variants() {
        assert_eq!(
            diagnose("ERROR: [mpd] stream is drm-protected"),
            Some(FailureReason::DrmProtected)
        );
        assert_eq!(
            diagnose("WARNING: Widevine license required"),
            Some(FailureReason::DrmProtected)
        );
    }

    #[test]
    fn test_drm_output_name_is_not_drm() {
        let err = "ERROR: unable to write data: [Errno 28] No space left on device: \
                   '/srv/media/drm_content.part'";
        assert_eq!(diagnose(err), Some(FailureReason::Unknown));

        let msg = describe_failure("download", err);
        assert!(msg.starts_with("yt-dlp download failed (Unknown failure)"));
        assert!(!msg.contains("DRM argument"));
    }

    #[test]
    fn test_format_unavailable_detection() {
        let err = "ERROR: [youtube] abc: Requested format is not available. Use --list-formats";
        assert_eq!(diagnose(err), Some(FailureReason::FormatUnavailable));
    }

    #[test]
    fn test_403_detection() {
        assert_eq!(
            diagnose("ERROR: unable to download video data: HTTP Error 403: Forbidden"),
            Some(FailureReason::Http403Forbidden)
        );
    }

    #[test]
    fn test_rate_limit_detection() {
        assert_eq!(
            diagnose("HTTP Error 429: Too Many Requests"),
            Some(FailureReason::RateLimited)
        );
    }

    #[test]
    fn test_geo_detection() {
        assert_eq!(
            diagnose("The uploader has not made this video available in your country"),
            Some(FailureReason::GeoBlocked)
        );
        assert_eq!(
            diagnose("ERROR: [youtube] abc: Video not available in your country"),
            Some(FailureReason::GeoBlocked)
        );
    }

    #[test]
    fn test_empty_output_has_no_reason() {
        assert_eq!(diagnose("  \n"), None);
        assert_eq!(describe_failure("download", ""), "yt-dlp download failed");
    }

    #[test]
    fn test_describe_includes_hint_and_details() {
        let msg = describe_failure("download", "ERROR: Requested format is not available");
        assert!(msg.starts_with("yt-dlp download failed (Requested format is not available)"));
        assert!(msg.contains("list available formats"));
        assert!(msg.ends_with("ERROR: Requested format is not available"));
    }
}
