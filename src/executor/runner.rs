use super::error::CommandError;
use crate::traits::{CommandExecutor, Output};
use std::path::Path;

/// How captured stdout is handed back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Decode as UTF-8
    Text,
    /// Return the raw bytes untouched
    Binary,
}

/// Captured stdout of a successful command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapturedOutput {
    Text(String),
    Binary(Vec<u8>),
}

impl CapturedOutput {
    pub fn into_text(self) -> String {
        match self {
            CapturedOutput::Text(text) => text,
            CapturedOutput::Binary(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            CapturedOutput::Text(text) => text.into_bytes(),
            CapturedOutput::Binary(bytes) => bytes,
        }
    }
}

/// Runs external commands synchronously and turns non-zero exits into errors.
///
/// On failure the command line, exit code and captured output are reported
/// through `Output` before the error is returned. Nothing is retried.
pub struct CommandRunner<'a> {
    executor: &'a dyn CommandExecutor,
    output: &'a dyn Output,
}

impl<'a> CommandRunner<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, output: &'a dyn Output) -> Self {
        Self { executor, output }
    }

    pub fn execute(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
        mode: OutputMode,
    ) -> Result<CapturedOutput, CommandError> {
        let command = command_line(program, args);
        tracing::debug!(command = %command, cwd = ?working_dir, "running external command");

        let result = self
            .executor
            .execute(program, args, working_dir)
            .map_err(|err| CommandError::Spawn {
                command: command.clone(),
                reason: format!("{:#}", err),
            })?;

        tracing::debug!(command = %command, status = %result.status, "external command finished");

        if !result.status.success() {
            let err = CommandError::Failed {
                command,
                exit_code: result.status.code(),
                stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
            };
            self.report(&err);
            return Err(err);
        }

        match mode {
            OutputMode::Binary => Ok(CapturedOutput::Binary(result.stdout)),
            OutputMode::Text => String::from_utf8(result.stdout)
                .map(CapturedOutput::Text)
                .map_err(|_| CommandError::NonUtf8Output { command }),
        }
    }

    /// Run with the terminal attached so the command can talk to the operator.
    ///
    /// Nothing is captured, so a failure reports only the command line and
    /// exit code; the command's own output is already on screen.
    pub fn execute_interactive(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<(), CommandError> {
        let command = command_line(program, args);
        tracing::debug!(command = %command, cwd = ?working_dir, "running interactive command");

        let status = self
            .executor
            .execute_interactive(program, args, working_dir)
            .map_err(|err| CommandError::Spawn {
                command: command.clone(),
                reason: format!("{:#}", err),
            })?;

        tracing::debug!(command = %command, status = %status, "interactive command finished");

        if !status.success() {
            let err = CommandError::Failed {
                command,
                exit_code: status.code(),
                stdout: String::new(),
                stderr: String::new(),
            };
            self.report(&err);
            return Err(err);
        }

        Ok(())
    }

    fn report(&self, err: &CommandError) {
        if let CommandError::Failed {
            command,
            stdout,
            stderr,
            ..
        } = err
        {
            self.output.error(&format!("Command failed: {}", command));
            let code = err
                .exit_code()
                .map_or_else(|| "none".to_string(), |code| code.to_string());
            self.output.key_value("Exit code", &code);

            for captured in [stdout, stderr] {
                let captured = captured.trim();
                if !captured.is_empty() {
                    self.output.dimmed(captured);
                }
            }
        }
    }
}

/// Program and arguments joined for display
pub fn command_line(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
