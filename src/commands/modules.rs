use crate::cli::ModuleAction;
use crate::distribute::{module_list, CORE_MODULES};
use crate::{ui, Workspace};
use anyhow::Result;

pub fn execute(workspace: &Workspace, action: ModuleAction) -> Result<()> {
    match action {
        ModuleAction::List => {
            for module in module_list(workspace.config()) {
                let label = if CORE_MODULES.contains(&module.as_str()) {
                    "Core"
                } else {
                    "Module"
                };
                ui::status(label, &module);
            }
            Ok(())
        }

        ModuleAction::Add { name } => {
            let mut config = workspace.config().clone();
            if CORE_MODULES.contains(&name.as_str()) {
                ui::info(format!("'{name}' is a core module and always receives libraries."));
            } else if config.add_module(&name)? {
                workspace.save_config(&config)?;
                ui::success("Added", format!("module '{name}'"));
            } else {
                ui::info(format!("Module '{name}' is already listed."));
            }
            Ok(())
        }

        ModuleAction::Remove { name } => {
            let mut config = workspace.config().clone();
            if config.remove_module(&name) {
                workspace.save_config(&config)?;
                ui::success("Removed", format!("module '{name}'"));
                Ok(())
            } else {
                anyhow::bail!("Module '{name}' is not listed in workspace.json");
            }
        }
    }
}
