//! External command execution for deploy transports.
//!
//! ```ignore
//! Cmd::new("rsync").args(["-avz", "--delete"]).arg(src).arg(dest).run()?;
//! let url = Cmd::new("git").args(["remote", "get-url", "origin"]).cwd(root).stdout()?;
//! ```

use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    fmt,
    path::{Path, PathBuf},
    process::{Command, Output},
    sync::LazyLock,
};

use anyhow::{Context, Result, bail};
use regex::Regex;

use crate::log;

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl Cmd {
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument. Empty arguments are dropped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    pub fn args<I, S>(self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        args.into_iter().fold(self, Self::arg)
    }

    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    fn program_name(&self) -> Cow<'_, str> {
        self.program.to_string_lossy()
    }

    /// Run to completion, logging stderr and failing on a non-zero exit.
    pub fn run(self) -> Result<Output> {
        let name = self.program_name().into_owned();
        let program = which::which(&self.program)
            .with_context(|| format!("`{name}` not found in PATH"))?;

        let mut cmd = Command::new(program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .with_context(|| format!("failed to execute `{name}`"))?;

        if !output.status.success() {
            bail!(format_error(&name, &output));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let stderr = strip_ansi(stderr.trim());
        if !stderr.is_empty() {
            log!(&name; "{stderr}");
        }
        Ok(output)
    }

    /// Run and return trimmed stdout.
    pub fn stdout(self) -> Result<String> {
        let output = self.run()?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program_name())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// Strip ANSI colour codes from tool output.
fn strip_ansi(s: &str) -> Cow<'_, str> {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ansi regex"));
    RE.replace_all(s, "")
}

fn format_error(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);

    let mut msg = format!("command `{name}` failed with {}", output.status);
    for stream in [stderr.trim(), stdout.trim()] {
        if !stream.is_empty() {
            msg.push('\n');
            msg.push_str(&strip_ansi(stream));
        }
    }
    msg
}
