use std::path::PathBuf;
use thiserror::Error;

/// Failures callers may want to tell apart.
///
/// Everything else travels as plain `anyhow` context; these variants are
/// raised where a command or test needs to match on the kind of failure.
#[derive(Debug, Error)]
pub enum Error {
    #[error("workspace config not found at {0:?}")]
    ConfigNotFound(PathBuf),

    #[error("failed to parse workspace config {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("library '{library}' is missing {path:?}; build it before updating libraries")]
    MissingSourceFile { library: String, path: PathBuf },

    #[error("module '{module}' shares its binary directory with library '{library}'")]
    ModuleShadowsLibrary { module: String, library: String },

    #[error("failed to launch `{command}`: {source}")]
    ProcessLaunch {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}{}", format_code(.code), format_tail(.tail))]
    ProcessFailed {
        command: String,
        code: Option<i32>,
        tail: Vec<String>,
    },

    #[error("request to {url} failed: {reason}")]
    NetworkFetch { url: String, reason: String },

    #[error("no download link found in {url}; the page layout may have changed")]
    PatternNotFound { url: String },

    #[error("checksum mismatch for {path:?}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("invalid {kind} name '{name}': {reason}")]
    InvalidName {
        kind: &'static str,
        name: String,
        reason: &'static str,
    },

    #[error("{action} {path:?}: {source}")]
    Filesystem {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn format_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

fn format_tail(tail: &[String]) -> String {
    if tail.is_empty() {
        String::new()
    } else {
        format!("\n{}", tail.join("\n"))
    }
}
