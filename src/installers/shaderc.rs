use anyhow::{bail, Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;
use walkdir::WalkDir;

use super::archive::{copy_tree, extract_archive, ArchiveKind};
use super::http::{extract_redirect_url, format_digest, parse_sha256, HttpClient};
use crate::error::Error;

/// Scratch space for downloads, relative to the workspace root.
pub const INTERMEDIATE_DIR: &str = "Intermediate";

/// Where the editor expects shaderc headers and the combined library.
pub const SHADERC_DESTINATION: &str = "TemportalEngineEditor/libs/shaderc";

/// Where to find the latest prebuilt shaderc for one host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadercSource {
    /// Badge page whose redirect points at the newest archive.
    pub page_url: &'static str,
    /// Combined static library under the archive's `install/lib`.
    pub library_file: &'static str,
}

impl ShadercSource {
    pub const WINDOWS: ShadercSource = ShadercSource {
        page_url: "https://storage.googleapis.com/shaderc/badges/build_link_windows_vs2019_release.html",
        library_file: "shaderc_combined.lib",
    };

    pub const LINUX: ShadercSource = ShadercSource {
        page_url: "https://storage.googleapis.com/shaderc/badges/build_link_linux_clang_release.html",
        library_file: "libshaderc_combined.a",
    };

    pub fn for_host() -> Self {
        if cfg!(windows) {
            Self::WINDOWS
        } else {
            Self::LINUX
        }
    }
}

/// Downloads the prebuilt shader compiler and installs it into the editor module.
pub struct ShadercInstaller {
    client: HttpClient,
    source: ShadercSource,
    intermediate_dir: PathBuf,
    destination: PathBuf,
    expected_sha256: Option<[u8; 32]>,
}

impl ShadercInstaller {
    /// Downloads into `intermediate_dir` and installs into `destination`.
    ///
    /// Honours `TEWS_SHADERC_SHA256` (`sha256:<hex>`) to pin the archive.
    pub fn new(intermediate_dir: PathBuf, destination: PathBuf) -> Result<Self> {
        let expected_sha256 = match env::var("TEWS_SHADERC_SHA256") {
            Ok(value) if !value.trim().is_empty() => Some(
                parse_sha256(&value).context("Invalid TEWS_SHADERC_SHA256")?,
            ),
            _ => None,
        };

        Ok(Self {
            client: HttpClient::from_env()?,
            source: ShadercSource::for_host(),
            intermediate_dir,
            destination,
            expected_sha256,
        })
    }

    pub fn with_source(mut self, source: ShadercSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_expected_sha256(mut self, expected: Option<[u8; 32]>) -> Self {
        self.expected_sha256 = expected;
        self
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.intermediate_dir.join("shaderc")
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn resolve_download_url(&self) -> Result<Url> {
        let page_url = Url::parse(self.source.page_url)
            .with_context(|| format!("Invalid badge page URL {}", self.source.page_url))?;
        let body = self.client.fetch_text(page_url.as_str())?;
        extract_redirect_url(&page_url, &body)
    }

    /// Replaces the installed headers and library with the latest release.
    pub fn install(&self) -> Result<Url> {
        let url = self.resolve_download_url()?;
        let kind = ArchiveKind::detect(url.path()).unwrap_or(ArchiveKind::Zip);
        let archive = self
            .intermediate_dir
            .join(format!("shaderc.{}", kind.extension()));

        tracing::info!(%url, "downloading shaderc");
        let digest = self.client.download(url.as_str(), &archive)?;
        tracing::info!(sha256 = %format_digest(&digest), "downloaded shaderc");

        self.install_downloaded(&archive, kind, digest)?;
        Ok(url)
    }

    /// Verifies, unpacks and installs an archive already in the intermediate
    /// directory, then removes both the archive and the staging directory.
    ///
    /// A checksum mismatch deletes the archive. Any later failure leaves the
    /// archive and staging in place, and the destination, which is overwritten
    /// in place, may be incomplete.
    pub fn install_downloaded(
        &self,
        archive: &Path,
        kind: ArchiveKind,
        digest: [u8; 32],
    ) -> Result<()> {
        if let Some(expected) = self.expected_sha256 {
            if expected != digest {
                let _ = fs::remove_file(archive);
                return Err(Error::ChecksumMismatch {
                    path: archive.to_path_buf(),
                    expected: format_digest(&expected),
                    actual: format_digest(&digest),
                }
                .into());
            }
        }

        let staging = self.staging_dir();
        remove_dir_if_exists(&staging)?;
        extract_archive(archive, kind, &staging)?;
        install_from_staging(&staging, &self.destination, self.source.library_file)?;

        fs::remove_file(archive)
            .with_context(|| format!("Failed to remove downloaded archive {:?}", archive))?;
        remove_dir_if_exists(&staging)?;
        Ok(())
    }
}

/// Copies `install/include` and the combined library out of an extracted archive.
pub fn install_from_staging(staging: &Path, destination: &Path, library_file: &str) -> Result<()> {
    let install_root = find_install_root(staging)?;

    let include_src = install_root.join("include");
    let library_src = install_root.join("lib").join(library_file);
    for required in [&include_src, &library_src] {
        if !required.exists() {
            return Err(Error::MissingSourceFile {
                library: "shaderc".to_string(),
                path: required.clone(),
            }
            .into());
        }
    }

    let include_dst = destination.join("include");
    remove_dir_if_exists(&include_dst)?;
    let headers = copy_tree(&include_src, &include_dst)?;

    let library_dir = destination.join("lib");
    fs::create_dir_all(&library_dir)
        .with_context(|| format!("Failed to create library directory {:?}", library_dir))?;
    let library_dst = library_dir.join(library_file);
    fs::copy(&library_src, &library_dst)
        .with_context(|| format!("Failed to copy {:?} to {:?}", library_src, library_dst))?;

    tracing::debug!(headers, ?destination, "installed shaderc");
    Ok(())
}

/// Archives nest their payload under an `install/` directory, sometimes
/// below a top-level build folder.
fn find_install_root(staging: &Path) -> Result<PathBuf> {
    let direct = staging.join("install");
    if direct.is_dir() {
        return Ok(direct);
    }

    for entry in WalkDir::new(staging).min_depth(1).max_depth(3) {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", staging))?;
        if entry.file_type().is_dir() && entry.file_name() == "install" {
            return Ok(entry.into_path());
        }
    }

    bail!("No install/ directory found in extracted archive at {:?}", staging);
}

fn remove_dir_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path).map_err(|source| Error::Filesystem {
            action: "Failed to remove directory",
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(())
}
