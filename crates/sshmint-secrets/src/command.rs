// ABOUTME: Runs keyring helper programs with the secret piped over stdin.
// ABOUTME: Secrets never appear in the argument list of a child process.

use crate::error::{Result, StoreError};
use std::ffi::{OsStr, OsString};
use std::io::Write;
use std::process::{Command, Stdio};

/// A helper program and the arguments that always precede per-call ones.
#[derive(Debug, Clone)]
pub struct Program {
    program: OsString,
    leading: Vec<OsString>,
}

impl Program {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            leading: Vec::new(),
        }
    }

    /// Append an argument passed before every call's own arguments.
    pub fn with_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.leading.push(arg.into());
        self
    }

    pub fn display_name(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Run the program with `args`, write `stdin` to it and wait.
    pub(crate) fn run<I, S>(&self, args: I, stdin: &[u8]) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = self.display_name();
        let mut child = Command::new(&self.program)
            .args(&self.leading)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| StoreError::Spawn {
                program: program.clone(),
                source,
            })?;

        if let Some(mut input) = child.stdin.take() {
            // a helper that exits without reading is reported by its status
            if let Err(e) = input.write_all(stdin) {
                if e.kind() != std::io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            return Err(StoreError::Failed {
                program,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        tracing::debug!(program = %program, "helper completed");
        Ok(())
    }
}
