use thiserror::Error;

/// Failure of an external command; always fatal to the run
#[derive(Debug, Error)]
pub enum CommandError {
    /// The binary could not be started at all (missing from PATH, bad cwd)
    #[error("failed to run `{command}`: {reason}")]
    Spawn { command: String, reason: String },

    /// The binary ran and exited unsuccessfully
    #[error("`{command}` failed with {}", describe_exit(*exit_code))]
    Failed {
        command: String,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },

    /// Text output was requested but the binary printed something else
    #[error("`{command}` produced output that is not valid UTF-8")]
    NonUtf8Output { command: String },
}

impl CommandError {
    /// Exit code of a failed command, if it exited normally
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            CommandError::Failed { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}

fn describe_exit(exit_code: Option<i32>) -> String {
    match exit_code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
