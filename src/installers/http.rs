use anyhow::{Context, Result};
use regex::Regex;
use reqwest::blocking::{Client, Response};
use reqwest::header::USER_AGENT;
use sha2::{Digest, Sha256};
use std::env;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use url::Url;

use crate::error::Error;

const DEFAULT_USER_AGENT: &str = concat!("tews/", env!("CARGO_PKG_VERSION"));

/// Matches the target of a `meta refresh` or `url=` style redirect.
const REDIRECT_PATTERN: &str = r#"(?i)url\s*=\s*["']?([^"'\s>]+)"#;

/// Blocking HTTP client used for badge pages and archive downloads.
#[derive(Clone)]
pub struct HttpClient {
    http: Client,
    user_agent: String,
}

impl HttpClient {
    pub fn new(user_agent: String) -> Result<Self> {
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { http, user_agent })
    }

    pub fn from_env() -> Result<Self> {
        let user_agent = env::var("TEWS_USER_AGENT")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        Self::new(user_agent)
    }

    fn get(&self, url: &str) -> Result<Response> {
        let response = self
            .http
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .map_err(|err| Error::NetworkFetch {
                url: url.to_string(),
                reason: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::NetworkFetch {
                url: url.to_string(),
                reason: format!("server returned {status}"),
            }
            .into());
        }
        Ok(response)
    }

    pub fn fetch_text(&self, url: &str) -> Result<String> {
        self.get(url)?.text().map_err(|err| {
            Error::NetworkFetch {
                url: url.to_string(),
                reason: err.to_string(),
            }
            .into()
        })
    }

    /// Streams `url` into `dest`, returning the SHA-256 of the bytes written.
    pub fn download(&self, url: &str, dest: &Path) -> Result<[u8; 32]> {
        let mut response = self.get(url)?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create parent directory for download at {:?}", dest)
            })?;
        }

        let temp_path = dest.with_extension("download");
        let mut file = File::create(&temp_path)
            .with_context(|| format!("Failed to create temporary file at {:?}", temp_path))?;

        let mut hasher = Sha256::new();
        let mut buffer = [0u8; 8192];

        loop {
            let read = response.read(&mut buffer).map_err(|err| Error::NetworkFetch {
                url: url.to_string(),
                reason: err.to_string(),
            })?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read])
                .with_context(|| format!("Failed while writing download to {:?}", temp_path))?;
            hasher.update(&buffer[..read]);
        }

        file.flush()
            .with_context(|| format!("Failed to flush download to {:?}", temp_path))?;
        drop(file);

        fs::rename(&temp_path, dest).with_context(|| {
            format!("Failed to move download from {:?} to {:?}", temp_path, dest)
        })?;

        Ok(hasher.finalize().into())
    }
}

/// Finds the redirect target in a badge page and resolves it against the page URL.
pub fn extract_redirect_url(page_url: &Url, body: &str) -> Result<Url> {
    let pattern = Regex::new(REDIRECT_PATTERN).context("Invalid redirect pattern")?;
    let target = pattern
        .captures(body)
        .and_then(|captures| captures.get(1))
        .map(|found| found.as_str())
        .ok_or_else(|| Error::PatternNotFound {
            url: page_url.to_string(),
        })?;

    page_url
        .join(target)
        .with_context(|| format!("Invalid download link '{target}' in {page_url}"))
}

pub fn parse_sha256(value: &str) -> Result<[u8; 32]> {
    let digest = value
        .trim()
        .strip_prefix("sha256:")
        .context("Checksum must use `sha256:<hex>` format")?;

    if digest.len() != 64 {
        anyhow::bail!("SHA256 checksum must be exactly 64 hex characters");
    }

    let bytes = hex::decode(digest).context("Failed to decode SHA256 checksum")?;
    let mut array = [0u8; 32];
    array.copy_from_slice(&bytes);
    Ok(array)
}

pub fn format_digest(bytes: &[u8; 32]) -> String {
    hex::encode(bytes)
}
