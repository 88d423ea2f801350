use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::config::{WorkspaceConfig, CONFIG_FILE};
use crate::installers::{INTERMEDIATE_DIR, SHADERC_DESTINATION};
use crate::layout::BuildTarget;
use crate::scripts::SCRIPTS_DIR;

/// Workspace path types
#[derive(Debug, Clone, Copy)]
pub enum WorkspacePath {
    /// Config file: workspace/workspace.json
    ConfigFile,
    /// Build scripts: workspace/scripts
    Scripts,
    /// Download scratch space: workspace/Intermediate
    Intermediate,
    /// Installed shader compiler: workspace/TemportalEngineEditor/libs/shaderc
    Shaderc,
}

/// Everything a command needs for one invocation.
///
/// The config is loaded once when the workspace is opened and handed to
/// commands by reference; nothing re-reads it mid-run.
#[derive(Debug)]
pub struct Workspace {
    root: PathBuf,
    target: BuildTarget,
    config: WorkspaceConfig,
}

impl Workspace {
    /// Opens the workspace at `root`, creating `workspace.json` if it is missing.
    pub fn open(root: PathBuf, target: BuildTarget) -> Result<Self> {
        let config = WorkspaceConfig::load_or_init(&root.join(CONFIG_FILE))?;
        tracing::debug!(?root, %target, modules = config.modules.len(), "opened workspace");

        Ok(Self {
            root,
            target,
            config,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn target(&self) -> BuildTarget {
        self.target
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Get path for a specific workspace location
    pub fn path(&self, path_type: WorkspacePath) -> PathBuf {
        match path_type {
            WorkspacePath::ConfigFile => self.root.join(CONFIG_FILE),
            WorkspacePath::Scripts => self.root.join(SCRIPTS_DIR),
            WorkspacePath::Intermediate => self.root.join(INTERMEDIATE_DIR),
            WorkspacePath::Shaderc => self.root.join(SHADERC_DESTINATION),
        }
    }

    /// Writes an updated config back to `workspace.json`.
    pub fn save_config(&self, config: &WorkspaceConfig) -> Result<()> {
        config.save(&self.path(WorkspacePath::ConfigFile))
    }
}
