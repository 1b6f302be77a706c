use anyhow::Result;
use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};
#[cfg(test)]
use std::sync::Mutex;

/// Trait for executing system commands, allowing for mocking in tests
pub trait CommandExecutor: Send + Sync {
    /// Run `program` with `args` to completion and capture stdout and stderr.
    ///
    /// No shell is involved; every argument reaches the program verbatim.
    /// Stdin stays attached to the terminal so the program can still ask the
    /// operator something. When `working_dir` is `None` the child inherits
    /// the current directory.
    fn execute(&self, program: &str, args: &[&str], working_dir: Option<&Path>) -> Result<Output>;

    /// Run a command interactively (inherits stdin/stdout/stderr)
    fn execute_interactive(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<ExitStatus>;
}

/// Real command executor using std::process::Command
pub struct RealCommandExecutor;

impl RealCommandExecutor {
    fn command(program: &str, args: &[&str], working_dir: Option<&Path>) -> Command {
        let mut command = Command::new(program);
        command.args(args).stdin(Stdio::inherit());

        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        command
    }
}

impl CommandExecutor for RealCommandExecutor {
    fn execute(&self, program: &str, args: &[&str], working_dir: Option<&Path>) -> Result<Output> {
        let output = Self::command(program, args, working_dir).output()?;
        Ok(output)
    }

    fn execute_interactive(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<ExitStatus> {
        let mut child = Self::command(program, args, working_dir)
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        Ok(child.wait()?)
    }
}

/// A recorded invocation, as seen by a mock executor
#[cfg(test)]
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<std::path::PathBuf>,
    /// Run with the terminal attached instead of captured
    pub interactive: bool,
}

#[cfg(test)]
impl RecordedCommand {
    /// Program and arguments joined by single spaces
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Mock command executor for testing
///
/// Each configured result is consumed by the first invocation whose command
/// line starts with `command`. Unmatched invocations succeed with empty output.
/// Interactive invocations only use the configured exit code.
#[cfg(test)]
pub struct MockCommandExecutor {
    outputs: Mutex<Vec<MockCommandResult>>,
    calls: Mutex<Vec<RecordedCommand>>,
}

#[cfg(test)]
#[derive(Clone, Debug)]
pub struct MockCommandResult {
    pub command: String,
    pub exit_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: String,
}

#[cfg(test)]
impl MockCommandResult {
    pub fn success(command: &str, stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            command: command.to_string(),
            exit_code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failure(command: &str, exit_code: i32, stderr: &str) -> Self {
        Self {
            command: command.to_string(),
            exit_code,
            stdout: Vec::new(),
            stderr: stderr.to_string(),
        }
    }
}

#[cfg(test)]
impl MockCommandExecutor {
    pub fn new() -> Self {
        Self::with_outputs(Vec::new())
    }

    pub fn with_outputs(outputs: Vec<MockCommandResult>) -> Self {
        Self {
            outputs: Mutex::new(outputs),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Every invocation seen so far, in order
    pub fn calls(&self) -> Vec<RecordedCommand> {
        self.calls.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Default for MockCommandExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl MockCommandExecutor {
    fn record(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
        interactive: bool,
    ) -> Option<MockCommandResult> {
        let recorded = RecordedCommand {
            program: program.to_string(),
            args: args.iter().map(|arg| arg.to_string()).collect(),
            working_dir: working_dir.map(Path::to_path_buf),
            interactive,
        };
        let command_line = recorded.command_line();
        self.calls.lock().unwrap().push(recorded);

        let mut outputs = self.outputs.lock().unwrap();
        outputs
            .iter()
            .position(|r| command_line.starts_with(&r.command))
            .map(|index| outputs.remove(index))
    }
}

#[cfg(test)]
impl CommandExecutor for MockCommandExecutor {
    fn execute(&self, program: &str, args: &[&str], working_dir: Option<&Path>) -> Result<Output> {
        let output = match self.record(program, args, working_dir, false) {
            Some(mock_result) => Output {
                status: create_exit_status(mock_result.exit_code),
                stdout: mock_result.stdout,
                stderr: mock_result.stderr.into_bytes(),
            },
            None => Output {
                status: create_exit_status(0),
                stdout: Vec::new(),
                stderr: Vec::new(),
            },
        };
        Ok(output)
    }

    fn execute_interactive(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<ExitStatus> {
        let code = self
            .record(program, args, working_dir, true)
            .map_or(0, |mock_result| mock_result.exit_code);
        Ok(create_exit_status(code))
    }
}

/// Build an `ExitStatus` whose `code()` is `code`
#[cfg(test)]
pub fn create_exit_status(code: i32) -> ExitStatus {
    // ExitStatus can't be constructed directly; go through the raw wait status
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_mock_executor_matches_by_prefix() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult::success(
            "terraform state list",
            "aws_instance.a\n",
        )]);

        let output = executor
            .execute("terraform", &["state", "list"], Some(&PathBuf::from("/src")))
            .unwrap();
        assert_eq!(String::from_utf8_lossy(&output.stdout), "aws_instance.a\n");

        // The configured result is consumed
        let output = executor.execute("terraform", &["state", "list"], None).unwrap();
        assert!(output.stdout.is_empty());
    }

    #[test]
    fn test_mock_executor_default_success_and_records_calls() {
        let executor = MockCommandExecutor::new();
        let output = executor
            .execute("terraform", &["init"], Some(&PathBuf::from("/dst")))
            .unwrap();
        assert!(output.status.success());

        let calls = executor.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].command_line(), "terraform init");
        assert_eq!(calls[0].working_dir, Some(PathBuf::from("/dst")));
    }

    #[test]
    fn test_mock_executor_failure_exit_code() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult::failure(
            "terraform state mv",
            1,
            "Error: Invalid target address",
        )]);

        let output = executor.execute("terraform", &["state", "mv"], None).unwrap();
        assert!(!output.status.success());
        assert_eq!(output.status.code(), Some(1));
    }

    #[cfg(unix)]
    #[test]
    fn test_real_executor_runs_in_working_dir() {
        let temp = tempfile::tempdir().unwrap();
        let output = RealCommandExecutor
            .execute("pwd", &[], Some(temp.path()))
            .unwrap();
        assert!(output.status.success());

        let printed = PathBuf::from(String::from_utf8_lossy(&output.stdout).trim());
        assert_eq!(
            printed.canonicalize().unwrap(),
            temp.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_real_executor_missing_program_is_error() {
        let result = RealCommandExecutor.execute(
            "tfmove-definitely-not-a-real-binary",
            &[],
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_mock_executor_records_interactive_calls() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult::failure(
            "terraform init",
            1,
            "",
        )]);

        let status = executor
            .execute_interactive("terraform", &["init"], Some(&PathBuf::from("/src")))
            .unwrap();
        assert_eq!(status.code(), Some(1));

        let calls = executor.calls();
        assert!(calls[0].interactive);
        assert_eq!(calls[0].working_dir, Some(PathBuf::from("/src")));
    }

    /// What the test process's own stdin points at, if anything
    #[cfg(target_os = "linux")]
    fn own_stdin() -> Option<String> {
        std::fs::read_link("/proc/self/fd/0")
            .ok()
            .map(|target| target.to_string_lossy().into_owned())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_real_executor_keeps_stdin_attached() {
        let Some(expected) = own_stdin() else {
            return;
        };

        let output = RealCommandExecutor
            .execute("readlink", &["/proc/self/fd/0"], None)
            .unwrap();
        assert!(output.status.success());
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), expected);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_real_interactive_keeps_stdin_attached() {
        let Some(expected) = own_stdin() else {
            return;
        };

        let script = format!("test \"$(readlink /proc/self/fd/0)\" = '{}'", expected);
        let status = RealCommandExecutor
            .execute_interactive("sh", &["-c", &script], None)
            .unwrap();
        assert!(status.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_real_interactive_reports_exit_code() {
        let temp = tempfile::tempdir().unwrap();
        let status = RealCommandExecutor
            .execute_interactive("sh", &["-c", "test -d . && exit 3"], Some(temp.path()))
            .unwrap();
        assert_eq!(status.code(), Some(3));
    }
}
