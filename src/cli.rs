use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::layout::{Architecture, BuildConfig};

/// Engine Workspace - Third-party dependency helper
///
/// tews builds the engine's native dependencies through the scripts in
/// `scripts/`, installs the prebuilt shader compiler, and copies the
/// resulting shared libraries into every module's binary directory.
#[derive(Parser, Debug)]
#[command(name = "tews", author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true, value_name = "DIR", env = "TEWS_ROOT")]
    pub root: Option<PathBuf>,

    /// Build configuration whose outputs are used
    #[arg(
        long = "config",
        global = true,
        value_enum,
        ignore_case = true,
        default_value = "debug",
        env = "TEWS_BUILD_CONFIG"
    )]
    pub build_config: BuildConfig,

    /// Target architecture (32 or 64)
    #[arg(long, global = true, value_name = "ARCH", default_value = "64", env = "TEWS_ARCH")]
    pub arch: Architecture,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build third-party dependencies and install the shader compiler
    ///
    /// Runs the PhysX, GameNetworkingSockets and Assimp build scripts in
    /// order, then downloads shaderc. Stops at the first failing step.
    Setup {
        /// Do not download the shader compiler
        #[arg(long)]
        skip_shaderc: bool,
    },

    /// Copy dependency DLLs into every module's binary directory
    #[command(name = "updateLibs", alias = "update-libs")]
    UpdateLibs,

    /// Show or edit the modules listed in workspace.json
    Modules {
        #[command(subcommand)]
        action: Option<ModuleAction>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ModuleAction {
    /// List every module that receives libraries
    List,

    /// Add a module to workspace.json
    Add {
        /// Module name (its binary directory name)
        #[arg(value_name = "MODULE")]
        name: String,
    },

    /// Remove a module from workspace.json
    Remove {
        /// Module name
        #[arg(value_name = "MODULE")]
        name: String,
    },
}
