use crate::installers::ShadercInstaller;
use crate::layout::BuildTarget;
use crate::scripts::ScriptInvoker;
use crate::workspace::WorkspacePath;
use crate::{ui, Workspace};
use anyhow::Result;

/// A build script run by `setup`, with its positional arguments.
struct ScriptStep {
    label: &'static str,
    script: &'static str,
    args: Vec<String>,
}

fn script_steps(target: BuildTarget) -> Vec<ScriptStep> {
    let bits = target.architecture.bits().to_string();
    vec![
        ScriptStep {
            label: "PhysX",
            script: "physx-build.sh",
            args: vec![target.config.physx_preset().to_string(), bits.clone()],
        },
        ScriptStep {
            label: "GameNetworkingSockets setup",
            script: "gns-setup.sh",
            args: Vec::new(),
        },
        ScriptStep {
            label: "GameNetworkingSockets",
            script: "gns-build.sh",
            args: Vec::new(),
        },
        ScriptStep {
            label: "Assimp",
            script: "assimp-build.sh",
            args: vec![target.config.to_string(), bits],
        },
    ]
}

pub fn execute(workspace: &Workspace, skip_shaderc: bool) -> Result<()> {
    let target = workspace.target();
    ui::status("Setup", format!("workspace at {}", workspace.root().display()));

    let invoker = ScriptInvoker::new(workspace.path(WorkspacePath::Scripts), workspace.root());
    for step in script_steps(target) {
        let progress = ui::Progress::new(
            "Building",
            format!("{} ({} x{})", step.label, target.config, target.architecture),
        );
        invoker.run_script(step.script, &step.args)?;
        progress.success("Built");
    }

    let progress = ui::Progress::new("Installing", "shaderc");
    if skip_shaderc {
        progress.skip("--skip-shaderc");
    } else {
        let installer = ShadercInstaller::new(
            workspace.path(WorkspacePath::Intermediate),
            workspace.path(WorkspacePath::Shaderc),
        )?;
        let url = installer.install()?;
        tracing::debug!(%url, "shaderc installed");
        progress.success("Installed");
        ui::info(format!("shaderc headers and library in {}", installer.destination().display()));
    }

    ui::success("Setup", "complete. Run 'tews updateLibs' to distribute libraries.");
    Ok(())
}
