use anstyle::{AnsiColor, Style};
use is_terminal::IsTerminal;
use std::fmt::Display;
use std::io::{self, Write};
use std::time::{Duration, Instant};

const STATUS_WIDTH: usize = 12;

#[derive(Debug, Clone, Copy)]
enum StatusKind {
    Pending,
    Success,
    Info,
    Warn,
    Error,
}

impl StatusKind {
    fn to_stderr(self) -> bool {
        matches!(self, StatusKind::Warn | StatusKind::Error)
    }

    fn style(self) -> Style {
        let style = Style::new().bold();
        let color = match self {
            StatusKind::Pending => AnsiColor::Cyan,
            StatusKind::Success => AnsiColor::Green,
            StatusKind::Info => AnsiColor::Blue,
            StatusKind::Warn => AnsiColor::Yellow,
            StatusKind::Error => AnsiColor::Red,
        };
        style.fg_color(Some(color.into()))
    }
}

fn supports_color(to_stderr: bool) -> bool {
    let terminal = if to_stderr {
        io::stderr().is_terminal()
    } else {
        io::stdout().is_terminal()
    };
    terminal && std::env::var_os("NO_COLOR").is_none()
}

fn write_status(kind: StatusKind, label: &str, message: &str) {
    let to_stderr = kind.to_stderr();
    let mut handle: Box<dyn Write> = if to_stderr {
        Box::new(io::stderr().lock())
    } else {
        Box::new(io::stdout().lock())
    };

    let padded_label = format!("{:>width$}", label, width = STATUS_WIDTH);
    let (prefix, suffix) = if supports_color(to_stderr) {
        let style = kind.style();
        (style.render().to_string(), style.render_reset().to_string())
    } else {
        (String::new(), String::new())
    };

    for (idx, line) in message.split('\n').enumerate() {
        if idx == 0 {
            let _ = writeln!(handle, "{prefix}{padded_label}{suffix} {line}");
        } else {
            let _ = writeln!(handle, "{:>width$} {line}", "", width = STATUS_WIDTH);
        }
    }
    let _ = handle.flush();
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 {
        match secs % 60 {
            0 => format!("{}m", secs / 60),
            rem => format!("{}m {rem}s", secs / 60),
        }
    } else if duration.as_secs_f64() >= 1.0 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

pub fn status(label: &str, message: impl Display) {
    write_status(StatusKind::Pending, label, &message.to_string());
}

pub fn info(message: impl Display) {
    write_status(StatusKind::Info, "Info", &message.to_string());
}

pub fn success(label: &str, message: impl Display) {
    write_status(StatusKind::Success, label, &message.to_string());
}

/// A timed step: prints a pending line now and a result line when finished.
///
/// Dropping an unfinished step reports it as aborted, which is what happens
/// when `?` propagates an error out of the step.
pub struct Progress {
    message: String,
    started: Instant,
    complete: bool,
}

impl Progress {
    pub fn new(label: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        write_status(StatusKind::Pending, label, &message);

        Self {
            message,
            started: Instant::now(),
            complete: false,
        }
    }

    pub fn success(mut self, label: &str) {
        self.complete = true;
        let elapsed = format_duration(self.started.elapsed());
        write_status(
            StatusKind::Success,
            label,
            &format!("{} in {elapsed}", self.message),
        );
    }

    pub fn skip(mut self, reason: impl Display) {
        self.complete = true;
        write_status(
            StatusKind::Warn,
            "Skipped",
            &format!("{} ({reason})", self.message),
        );
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if !self.complete {
            let elapsed = format_duration(self.started.elapsed());
            write_status(
                StatusKind::Error,
                "Failed",
                &format!("{} after {elapsed}", self.message),
            );
        }
    }
}
