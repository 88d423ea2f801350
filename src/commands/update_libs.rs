use crate::distribute::{distribute, module_list};
use crate::libraries::LIBRARIES;
use crate::{ui, Workspace};
use anyhow::Result;

pub fn execute(workspace: &Workspace) -> Result<()> {
    let target = workspace.target();
    let modules = module_list(workspace.config());

    let report = distribute(workspace.root(), target, &modules, LIBRARIES)?;
    ui::success(
        "Updated",
        format!(
            "{} libraries in {} module(s) for {target} ({} files copied)",
            LIBRARIES.len(),
            report.modules,
            report.copies
        ),
    );
    Ok(())
}
