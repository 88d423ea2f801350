use anyhow::Result;
use clap::ValueEnum;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::Error;

/// Root of every per-package build output directory, relative to the workspace.
pub const BINARIES_DIR: &str = "Binaries/Build";

/// Build configuration the engine solution was compiled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, ValueEnum)]
pub enum BuildConfig {
    #[default]
    Debug,
    Release,
}

impl BuildConfig {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildConfig::Debug => "Debug",
            BuildConfig::Release => "Release",
        }
    }

    /// PhysX build preset matching this configuration; Debug engine builds
    /// link against PhysX's `checked` flavour.
    pub fn physx_preset(&self) -> &'static str {
        match self {
            BuildConfig::Debug => "checked",
            BuildConfig::Release => "release",
        }
    }
}

impl fmt::Display for BuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target CPU architecture, rendered as its bit width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Architecture {
    X86,
    #[default]
    X64,
}

impl Architecture {
    /// Token substituted for `{architecture}` and used in `x{bits}` directories.
    pub fn bits(&self) -> &'static str {
        match self {
            Architecture::X86 => "32",
            Architecture::X64 => "64",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.bits())
    }
}

impl FromStr for Architecture {
    type Err = String;

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "32" | "x32" | "x86" => Ok(Architecture::X86),
            "64" | "x64" | "x86_64" | "amd64" => Ok(Architecture::X64),
            other => Err(format!(
                "unsupported architecture '{other}' (expected 32 or 64)"
            )),
        }
    }
}

/// Configuration and architecture pair that selects one set of build outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BuildTarget {
    pub config: BuildConfig,
    pub architecture: Architecture,
}

impl BuildTarget {
    pub fn new(config: BuildConfig, architecture: Architecture) -> Self {
        Self {
            config,
            architecture,
        }
    }

    /// Directory holding `package`'s binaries for this target:
    /// `root/Binaries/Build/{config}/x{bits}/{package}`.
    pub fn bin_dir(&self, root: &Path, package: &str) -> Result<PathBuf> {
        validate_name("package", package)?;
        Ok(root
            .join(BINARIES_DIR)
            .join(self.config.as_str())
            .join(format!("x{}", self.architecture.bits()))
            .join(package))
    }
}

impl fmt::Display for BuildTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{}", self.config, self.architecture.bits())
    }
}

/// Package and module names become single path components.
pub fn validate_name(kind: &'static str, name: &str) -> Result<()> {
    let reason = if name.trim().is_empty() {
        Some("must not be empty")
    } else if name == "." || name == ".." {
        Some("must not be a relative directory reference")
    } else if name.contains(['/', '\\']) {
        Some("must not contain path separators")
    } else {
        None
    };

    match reason {
        Some(reason) => Err(Error::InvalidName {
            kind,
            name: name.to_string(),
            reason,
        }
        .into()),
        None => Ok(()),
    }
}
