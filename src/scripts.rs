use anyhow::Result;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::process::{self, Invocation, ProcessOutput};

/// Directory holding the third-party build scripts, relative to the workspace.
pub const SCRIPTS_DIR: &str = "scripts";

const DEFAULT_INTERPRETER: &str = "bash";

/// Runs named shell scripts from the workspace's scripts directory.
#[derive(Debug, Clone)]
pub struct ScriptInvoker {
    scripts_dir: PathBuf,
    working_dir: PathBuf,
    interpreter: OsString,
}

impl ScriptInvoker {
    /// Scripts are looked up in `scripts_dir` and run from `working_dir`.
    pub fn new(scripts_dir: impl Into<PathBuf>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            scripts_dir: scripts_dir.into(),
            working_dir: working_dir.into(),
            interpreter: DEFAULT_INTERPRETER.into(),
        }
    }

    pub fn with_interpreter(mut self, interpreter: impl Into<OsString>) -> Self {
        self.interpreter = interpreter.into();
        self
    }

    pub fn script_path(&self, name: &str) -> PathBuf {
        self.scripts_dir.join(name)
    }

    /// Runs `<interpreter> <scripts_dir>/<name> args...` from the working directory.
    ///
    /// The script's existence is left to the interpreter to report; a
    /// non-zero exit becomes `Error::ProcessFailed`.
    pub fn run_script<I, S>(&self, name: &str, args: I) -> Result<ProcessOutput>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let invocation = Invocation::new(&self.interpreter)
            .arg(self.script_path(name))
            .args(args)
            .current_dir(&self.working_dir);

        process::run(&invocation)?.into_result()
    }
}
