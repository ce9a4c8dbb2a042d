// DRM key resolver - PSSH extraction and key service exchange
//
// Flow for a DASH manifest:
// 1. GET the manifest with browser-like headers
// 2. Pull the first <cenc:pssh> (urn:mpeg:cenc:2013) element
// 3. POST the PSSH + license server URL to the key service
// 4. Return its `Message` field as the key
//
// Best effort: runs once after the download, never retried.

use log::{debug, info};
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use super::errors::DownloadError;

/// Default key resolution endpoint
pub const DEFAULT_KEY_SERVICE_URL: &str = "https://cdrm-project.com/api/decrypt";

/// Identifying headers sent to content servers and the key service
const BROWSER_HEADERS: &[(&str, &str)] = &[
    (
        "User-Agent",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36",
    ),
    ("Accept", "*/*"),
    ("Accept-Language", "en-US,en;q=0.9"),
];

lazy_static::lazy_static! {
    static ref PSSH_RE: Regex = Regex::new(
        r#"(?s)<cenc:pssh xmlns:cenc="urn:mpeg:cenc:2013">(.*?)</cenc:pssh>"#
    ).unwrap();
}

/// True when the URL path names a DASH manifest
pub fn is_manifest_url(url: &str) -> bool {
    let path = match reqwest::Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => url.split(['?', '#']).next().unwrap_or(url).to_string(),
    };
    path.to_lowercase().ends_with(".mpd")
}

/// Inner text of the first `<cenc:pssh>` element in `manifest`
pub fn extract_pssh(manifest: &str) -> Result<String, DownloadError> {
    PSSH_RE
        .captures(manifest)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|pssh| !pssh.is_empty())
        .map(str::to_string)
        .ok_or(DownloadError::PsshNotFound)
}

fn browser_header_map() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in BROWSER_HEADERS {
        if let Ok(name) = HeaderName::from_bytes(name.as_bytes()) {
            headers.insert(name, HeaderValue::from_static(value));
        }
    }
    headers
}

/// Request body of the key service; every field must be present
#[derive(Debug, Serialize)]
struct KeyServiceRequest<'a> {
    #[serde(rename = "PSSH")]
    pssh: &'a str,
    #[serde(rename = "License URL")]
    license_url: &'a str,
    #[serde(rename = "Headers")]
    headers: String,
    #[serde(rename = "JSON")]
    json: &'a str,
    #[serde(rename = "Cookies")]
    cookies: &'a str,
    #[serde(rename = "Data")]
    data: &'a str,
    #[serde(rename = "Proxy")]
    proxy: &'a str,
}

/// Resolves content keys for DRM-protected DASH manifests
pub struct KeyResolver {
    client: reqwest::Client,
    key_service_url: String,
}

impl KeyResolver {
    pub fn new(key_service_url: &str, timeout_seconds: u64) -> Result<Self, DownloadError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .default_headers(browser_header_map())
            .build()?;

        Ok(Self {
            client,
            key_service_url: key_service_url.to_string(),
        })
    }

    /// Fetch the manifest, extract its PSSH and, given a license server, ask for the key
    ///
    /// Returns `Ok(None)` when no license server is given.
    pub async fn resolve_key(
        &self,
        manifest_url: &str,
        license_server_url: Option<&str>,
    ) -> Result<Option<String>, DownloadError> {
        let manifest = self.fetch_manifest(manifest_url).await?;
        let pssh = extract_pssh(&manifest)?;
        info!("[Drm] PSSH: {}", pssh);

        let Some(license_url) = license_server_url else {
            info!("[Drm] No license server URL given, skipping key request");
            return Ok(None);
        };

        self.request_key(&pssh, license_url).await.map(Some)
    }

    pub async fn fetch_manifest(&self, manifest_url: &str) -> Result<String, DownloadError> {
        debug!("[Drm] Fetching manifest {}", manifest_url);
        let response = self.client.get(manifest_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::ManifestFetch {
                url: manifest_url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }

    /// Exchange a PSSH and license server URL for a key
    pub async fn request_key(&self, pssh: &str, license_url: &str) -> Result<String, DownloadError> {
        let headers: BTreeMap<&str, &str> = BROWSER_HEADERS.iter().copied().collect();
        let body = KeyServiceRequest {
            pssh,
            license_url,
            headers: serde_json::to_string(&headers).map_err(|e| DownloadError::KeyService {
                status: 0,
                detail: format!("cannot encode headers: {}", e),
            })?,
            json: "",
            cookies: "",
            data: "",
            proxy: "",
        };

        debug!("[Drm] Requesting key from {}", self.key_service_url);
        let response = self
            .client
            .post(&self.key_service_url)
            .json(&body)
            .send()
            .await?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(DownloadError::KeyService {
                status,
                detail: if detail.is_empty() {
                    "request rejected".to_string()
                } else {
                    detail
                },
            });
        }

        let text = response.text().await?;
        let json: serde_json::Value =
            serde_json::from_str(&text).map_err(|e| DownloadError::KeyService {
                status,
                detail: format!("invalid JSON response: {}", e),
            })?;

        json["Message"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| DownloadError::KeyService {
                status,
                detail: "response has no Message field".to_string(),
            })
    }
}
