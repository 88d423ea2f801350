use crate::cli::{Cli, Commands, ModuleAction};
use crate::layout::BuildTarget;
use crate::Workspace;
use anyhow::{Context, Result};
use std::env;

mod modules;
mod setup;
mod update_libs;

pub fn execute(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => env::current_dir().context("Failed to determine current directory")?,
    };

    // Create workspace - this is the root entry point
    let workspace = Workspace::open(root, BuildTarget::new(cli.build_config, cli.arch))?;

    match cli.command {
        Commands::Setup { skip_shaderc } => setup::execute(&workspace, skip_shaderc),

        Commands::UpdateLibs => update_libs::execute(&workspace),

        Commands::Modules { action } => {
            modules::execute(&workspace, action.unwrap_or(ModuleAction::List))
        }
    }
}
