//! External utility invocation.

use std::process::{Command, Stdio};

use crate::error::CommandError;

/// Runs a program to completion and returns its stdout.
pub trait CommandRunner: Send + Sync {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError>;
}

/// [`CommandRunner`] backed by `std::process::Command`.
///
/// Blocks until the child exits. There is no timeout.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommand;

impl CommandRunner for SystemCommand {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        log::trace!("running {program} {}", args.join(" "));
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CommandError::Spawn {
                program: program.to_string(),
                source,
            })?;

        if !output.status.success() {
            return Err(CommandError::Status {
                program: program.to_string(),
                code: output.status.code(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Runner that refuses to launch anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCommands;

impl CommandRunner for NoCommands {
    fn run(&self, program: &str, _args: &[&str]) -> Result<String, CommandError> {
        Err(CommandError::Spawn {
            program: program.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Unsupported, "subprocesses disabled"),
        })
    }
}
