use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::Error;
use crate::layout::validate_name;
use crate::libraries::LIBRARIES;

/// File name of the workspace config, relative to the workspace root.
pub const CONFIG_FILE: &str = "workspace.json";

/// Contents of `workspace.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// Extra game modules that receive copies of the third-party libraries.
    #[serde(default)]
    pub modules: Vec<String>,
}

impl WorkspaceConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound(path.to_path_buf()).into());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read config file {:?}", path));
            }
        };

        serde_json::from_str(&contents).map_err(|source| {
            anyhow::Error::from(Error::ConfigParse {
                path: path.to_path_buf(),
                source,
            })
        })
    }

    /// Writes the config with sorted keys and two-space indentation.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory {:?}", parent))?;
        }

        // Going through `Value` sorts object keys.
        let value = serde_json::to_value(self).context("Failed to serialize workspace config")?;
        let mut contents =
            serde_json::to_string_pretty(&value).context("Failed to serialize workspace config")?;
        contents.push('\n');

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {:?}", path))?;
        Ok(())
    }

    /// Loads the config, writing the empty default first if none exists yet.
    pub fn load_or_init(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(?path, "writing default workspace config");
            Self::default().save(path)?;
        }
        Self::load(path)
    }

    /// Adds a module, returning `false` if it was already listed.
    pub fn add_module(&mut self, name: &str) -> Result<bool> {
        validate_name("module", name)?;
        if LIBRARIES
            .iter()
            .any(|library| library.name.eq_ignore_ascii_case(name))
        {
            return Err(Error::InvalidName {
                kind: "module",
                name: name.to_string(),
                reason: "is the name of a third-party library",
            }
            .into());
        }
        if self.modules.iter().any(|module| module == name) {
            return Ok(false);
        }
        self.modules.push(name.to_string());
        Ok(true)
    }

    /// Removes a module, returning `false` if it was not listed.
    pub fn remove_module(&mut self, name: &str) -> bool {
        let before = self.modules.len();
        self.modules.retain(|module| module != name);
        self.modules.len() != before
    }
}
