use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fmt;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use crate::error::Error;

/// Lines of output kept in a `ProcessFailed` error.
const FAILURE_TAIL_LINES: usize = 20;

/// An external command to run to completion.
#[derive(Debug, Clone)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    working_dir: Option<PathBuf>,
    env: BTreeMap<OsString, OsString>,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            env: BTreeMap::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets a variable on top of the inherited environment.
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Exit status and merged stdout/stderr of a finished process.
#[derive(Debug)]
pub struct ProcessOutput {
    pub command: String,
    pub status: ExitStatus,
    pub lines: Vec<String>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    pub fn code(&self) -> Option<i32> {
        self.status.code()
    }

    /// Turns a non-zero exit into `Error::ProcessFailed`.
    pub fn into_result(self) -> Result<Self> {
        if self.success() {
            return Ok(self);
        }

        let code = self.code();
        let skip = self.lines.len().saturating_sub(FAILURE_TAIL_LINES);
        Err(Error::ProcessFailed {
            command: self.command,
            code,
            tail: self.lines.into_iter().skip(skip).collect(),
        }
        .into())
    }
}

/// Runs `invocation`, echoing each output line to stdout as it arrives.
///
/// Stdout and stderr share one pipe so lines keep the order the child wrote
/// them in. Blocks until the child exits; there is no timeout.
pub fn run(invocation: &Invocation) -> Result<ProcessOutput> {
    let command_line = invocation.to_string();
    tracing::debug!(command = %command_line, cwd = ?invocation.working_dir, "running");

    let (reader, writer) = io::pipe().context("Failed to create output pipe")?;
    let error_writer = writer
        .try_clone()
        .context("Failed to duplicate output pipe")?;

    // The command owns the parent's copies of the write end; it has to be
    // dropped before reading or the pipe never reaches EOF.
    let mut child = {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(&invocation.env)
            .stdout(writer)
            .stderr(error_writer);
        if let Some(dir) = &invocation.working_dir {
            command.current_dir(dir);
        }
        command.spawn().map_err(|source| Error::ProcessLaunch {
            command: command_line.clone(),
            source,
        })?
    };

    let mut lines = Vec::new();
    let mut reader = BufReader::new(reader);
    let mut buffer = Vec::new();
    let stdout = io::stdout();
    loop {
        buffer.clear();
        let read = reader
            .read_until(b'\n', &mut buffer)
            .with_context(|| format!("Failed to read output of `{command_line}`"))?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(&buffer);
        let line = line.trim_end_matches(['\r', '\n']);
        {
            let mut handle = stdout.lock();
            let _ = writeln!(handle, "{line}");
            let _ = handle.flush();
        }
        lines.push(line.to_string());
    }

    let status = child
        .wait()
        .with_context(|| format!("Failed to wait for `{command_line}`"))?;
    tracing::debug!(command = %command_line, %status, "finished");

    Ok(ProcessOutput {
        command: command_line,
        status,
        lines,
    })
}
