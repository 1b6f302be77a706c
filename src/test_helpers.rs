//! Test helpers for exercising the move workflow without a real Terraform
//!
//! `FakeTerraform` stands in for the binary: it keeps one "remote" state per
//! project directory and reads and writes local state files through a shared
//! `MockFileSystem`, so tests can inspect both sides after a run.

#![cfg(test)]

use crate::traits::command::create_exit_status;
use crate::traits::{CommandExecutor, FileSystem, MockFileSystem};
use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::{Arc, Mutex};

/// In-memory stand-in for the `terraform` binary.
///
/// A state is encoded as one resource address per line, which is exactly what
/// `state list` prints, so pulled files can be listed again without parsing.
pub struct FakeTerraform {
    fs: Arc<MockFileSystem>,
    remotes: Mutex<HashMap<PathBuf, Vec<String>>>,
    calls: Mutex<Vec<String>>,
    moves_seen: Mutex<usize>,
    pushes_seen: Mutex<usize>,
    fail_move_on: Option<usize>,
    fail_push_on: Option<usize>,
    ignore_moves: bool,
    installed: bool,
}

impl FakeTerraform {
    pub fn new(fs: Arc<MockFileSystem>) -> Self {
        Self {
            fs,
            remotes: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
            moves_seen: Mutex::new(0),
            pushes_seen: Mutex::new(0),
            fail_move_on: None,
            fail_push_on: None,
            ignore_moves: false,
            installed: true,
        }
    }

    /// Give `project_dir` a remote backend holding `resources`
    pub fn with_remote(self, project_dir: impl Into<PathBuf>, resources: &[&str]) -> Self {
        self.remotes.lock().unwrap().insert(
            project_dir.into(),
            resources.iter().map(|r| r.to_string()).collect(),
        );
        self
    }

    /// Make the `n`th `state mv` call (1-based) exit non-zero
    pub fn fail_move_on(mut self, n: usize) -> Self {
        self.fail_move_on = Some(n);
        self
    }

    /// Make the `n`th `state push` call (1-based) exit non-zero
    pub fn fail_push_on(mut self, n: usize) -> Self {
        self.fail_push_on = Some(n);
        self
    }

    /// Report every `state mv` as successful without touching either file
    pub fn ignore_moves(mut self) -> Self {
        self.ignore_moves = true;
        self
    }

    /// Behave as if the binary is missing from PATH
    pub fn not_installed(mut self) -> Self {
        self.installed = false;
        self
    }

    /// Current remote resources of a project
    pub fn remote(&self, project_dir: &str) -> Vec<String> {
        self.remotes
            .lock()
            .unwrap()
            .get(Path::new(project_dir))
            .cloned()
            .unwrap_or_default()
    }

    /// Every command line seen, without the program name
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls whose arguments start with `prefix`
    pub fn calls_starting_with(&self, prefix: &str) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| call.starts_with(prefix))
            .collect()
    }

    pub fn encode(resources: &[String]) -> Vec<u8> {
        resources
            .iter()
            .map(|r| format!("{}\n", r))
            .collect::<String>()
            .into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(bytes)
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Resources recorded in a local state file
    pub fn local(&self, path: &str) -> Vec<String> {
        self.fs
            .get_file_contents(Path::new(path))
            .map(|bytes| Self::decode(&bytes))
            .unwrap_or_default()
    }

    fn remote_of(&self, working_dir: Option<&Path>) -> Option<Vec<String>> {
        let dir = working_dir?;
        self.remotes.lock().unwrap().get(dir).cloned()
    }

    /// Bump a call counter and return the 1-based attempt number
    fn attempt(counter: &Mutex<usize>) -> usize {
        let mut seen = counter.lock().unwrap();
        *seen += 1;
        *seen
    }

    fn state_mv(&self, source: &str, destination: &str, address: &str) -> Result<Output> {
        let attempt = Self::attempt(&self.moves_seen);
        if self.fail_move_on == Some(attempt) {
            return Ok(failure(1, "Error: simulated state mv failure"));
        }
        if self.ignore_moves {
            return Ok(success(Vec::new()));
        }

        let mut source_resources = self.local(source);
        let Some(index) = source_resources.iter().position(|r| r == address) else {
            return Ok(failure(1, &format!("Error: Invalid source address {}", address)));
        };

        let mut destination_resources = self.local(destination);
        if destination_resources.iter().any(|r| r == address) {
            return Ok(failure(1, &format!("Error: Resource {} already exists", address)));
        }

        let moved = source_resources.remove(index);
        destination_resources.push(moved);
        self.fs
            .write(Path::new(source), &Self::encode(&source_resources))?;
        self.fs
            .write(Path::new(destination), &Self::encode(&destination_resources))?;

        Ok(success(format!("Move \"{}\" to \"{}\"\n", address, address).into_bytes()))
    }
}

impl CommandExecutor for FakeTerraform {
    fn execute(&self, _program: &str, args: &[&str], working_dir: Option<&Path>) -> Result<Output> {
        self.calls.lock().unwrap().push(args.join(" "));

        match args {
            ["version"] => {
                if !self.installed {
                    anyhow::bail!("No such file or directory (os error 2)");
                }
                Ok(success(b"Terraform v1.9.8\n".to_vec()))
            }
            ["init"] => match self.remote_of(working_dir) {
                Some(_) => Ok(success(b"Terraform has been successfully initialized!\n".to_vec())),
                None => Ok(failure(1, "Error: No configuration files")),
            },
            ["state", "list"] => match self.remote_of(working_dir) {
                Some(resources) => Ok(success(Self::encode(&resources))),
                None => Ok(failure(1, "Error: No state")),
            },
            ["state", "list", state_flag] => match state_flag.strip_prefix("-state=") {
                Some(path) => Ok(success(Self::encode(&self.local(path)))),
                None => Ok(failure(1, "Error: unexpected argument")),
            },
            ["state", "pull"] => match self.remote_of(working_dir) {
                Some(resources) => Ok(success(Self::encode(&resources))),
                None => Ok(failure(1, "Error: No state")),
            },
            ["state", "mv", state, state_out, from, to] => {
                let (Some(source), Some(destination)) = (
                    state.strip_prefix("-state="),
                    state_out.strip_prefix("-state-out="),
                ) else {
                    return Ok(failure(1, "Error: unexpected flags"));
                };
                if from != to {
                    return Ok(failure(1, "Error: renames are not simulated"));
                }
                self.state_mv(source, destination, from)
            }
            ["state", "push", file] => {
                if self.fail_push_on == Some(Self::attempt(&self.pushes_seen)) {
                    return Ok(failure(1, "Error: Failed to persist state"));
                }
                let Some(dir) = working_dir else {
                    return Ok(failure(1, "Error: No backend"));
                };
                let resources = self.local(file);
                let mut remotes = self.remotes.lock().unwrap();
                if !remotes.contains_key(dir) {
                    return Ok(failure(1, "Error: No backend"));
                }
                remotes.insert(dir.to_path_buf(), resources);
                Ok(success(Vec::new()))
            }
            _ => Ok(failure(1, &format!("Error: unknown command {:?}", args))),
        }
    }

    fn execute_interactive(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<ExitStatus> {
        Ok(self.execute(program, args, working_dir)?.status)
    }
}

fn success(stdout: Vec<u8>) -> Output {
    Output {
        status: create_exit_status(0),
        stdout,
        stderr: Vec::new(),
    }
}

fn failure(code: i32, stderr: &str) -> Output {
    Output {
        status: create_exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}
