mod archive;
mod http;
mod shaderc;

pub use archive::{copy_tree, extract_archive, ArchiveKind};
pub use http::{extract_redirect_url, format_digest, parse_sha256, HttpClient};
pub use shaderc::{
    install_from_staging, ShadercInstaller, ShadercSource, INTERMEDIATE_DIR, SHADERC_DESTINATION,
};
