use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::WorkspaceConfig;
use crate::error::Error;
use crate::layout::BuildTarget;
use crate::libraries::LibraryDescriptor;
use crate::ui;

/// Modules that always receive the third-party libraries.
pub const CORE_MODULES: &[&str] = &["MinecraftGame", "MinecraftEditor"];

/// Core modules followed by the configured ones, without duplicates.
pub fn module_list(config: &WorkspaceConfig) -> Vec<String> {
    let mut modules: Vec<String> = Vec::with_capacity(CORE_MODULES.len() + config.modules.len());
    let names = CORE_MODULES
        .iter()
        .copied()
        .chain(config.modules.iter().map(String::as_str));
    for name in names {
        if !modules.iter().any(|module| module == name) {
            modules.push(name.to_string());
        }
    }
    modules
}

/// Summary of a completed distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistributionReport {
    pub modules: usize,
    pub copies: usize,
}

/// Copies every library's DLLs into every module's bin directory.
///
/// A module named like a library would copy each DLL onto itself, so that
/// is rejected before anything is touched. All module directories are
/// created first. Libraries are the outer loop,
/// so a missing file stops the run with earlier libraries already copied to
/// every module; nothing is rolled back.
pub fn distribute(
    root: &Path,
    target: BuildTarget,
    modules: &[String],
    libraries: &[LibraryDescriptor],
) -> Result<DistributionReport> {
    for module in modules {
        if let Some(library) = libraries
            .iter()
            .find(|library| library.name.eq_ignore_ascii_case(module))
        {
            return Err(Error::ModuleShadowsLibrary {
                module: module.clone(),
                library: library.name.to_string(),
            }
            .into());
        }
    }

    let mut destinations = Vec::with_capacity(modules.len());
    for module in modules {
        let dir = target.bin_dir(root, module)?;
        fs::create_dir_all(&dir).map_err(|source| Error::Filesystem {
            action: "Failed to create module directory",
            path: dir.clone(),
            source,
        })?;
        destinations.push((module.as_str(), dir));
    }

    let mut report = DistributionReport {
        modules: destinations.len(),
        copies: 0,
    };

    for library in libraries {
        let source_dir = target.bin_dir(root, library.name)?;
        for dll in library.dll_names(target.architecture)? {
            let origin = source_dir.join(&dll);
            if !origin.is_file() {
                return Err(Error::MissingSourceFile {
                    library: library.name.to_string(),
                    path: origin,
                }
                .into());
            }

            for (module, dir) in &destinations {
                ui::status("Copying", format!("{dll} to {module}"));
                let destination = dir.join(&dll);
                fs::copy(&origin, &destination).map_err(|source| Error::Filesystem {
                    action: "Failed to copy library to",
                    path: destination.clone(),
                    source,
                })?;
                report.copies += 1;
            }
        }
        tracing::debug!(library = library.name, %target, "distributed");
    }

    Ok(report)
}
