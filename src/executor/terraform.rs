use super::error::CommandError;
use super::runner::{CommandRunner, OutputMode};
use crate::config::Flavor;
use crate::state::parse_resource_list;
use crate::traits::{CommandExecutor, Output};
use std::path::Path;

/// Fixed `terraform` / `tofu` invocations used by the move workflow
pub struct TerraformCli<'a> {
    executor: &'a dyn CommandExecutor,
    runner: CommandRunner<'a>,
    binary: &'static str,
}

impl<'a> TerraformCli<'a> {
    pub fn new(executor: &'a dyn CommandExecutor, output: &'a dyn Output, flavor: Flavor) -> Self {
        Self {
            executor,
            runner: CommandRunner::new(executor, output),
            binary: flavor.binary(),
        }
    }

    pub fn binary(&self) -> &str {
        self.binary
    }

    /// Check the binary is on PATH and runs, by asking for its version
    pub fn check_installed(&self) -> bool {
        match self.executor.execute(self.binary, &["version"], None) {
            Ok(output) => output.status.success(),
            Err(err) => {
                tracing::debug!(binary = self.binary, error = %err, "version probe failed");
                false
            }
        }
    }

    /// `init` inside a project directory, attached to the terminal.
    ///
    /// Backend migrations and missing backend settings are asked for
    /// interactively, and the operator sees provider downloads as they happen.
    pub fn init(&self, project_dir: &Path) -> Result<(), CommandError> {
        self.runner
            .execute_interactive(self.binary, &["init"], Some(project_dir))
    }

    /// Resources tracked by the project's configured backend.
    ///
    /// Filtering happens here rather than in a shell pipeline, so `filter` is
    /// never interpreted by anything but a substring match.
    pub fn list_resources(
        &self,
        project_dir: &Path,
        filter: Option<&str>,
    ) -> Result<Vec<String>, CommandError> {
        let listing = self
            .runner
            .execute(
                self.binary,
                &["state", "list"],
                Some(project_dir),
                OutputMode::Text,
            )?
            .into_text();
        Ok(parse_resource_list(&listing, filter))
    }

    /// Resources recorded in a local state file
    pub fn list_state_file(&self, state_file: &Path) -> Result<Vec<String>, CommandError> {
        let state_arg = state_flag("-state", state_file);
        let listing = self
            .runner
            .execute(
                self.binary,
                &["state", "list", &state_arg],
                None,
                OutputMode::Text,
            )?
            .into_text();
        Ok(parse_resource_list(&listing, None))
    }

    /// Raw bytes of the project's current remote state
    pub fn pull(&self, project_dir: &Path) -> Result<Vec<u8>, CommandError> {
        Ok(self
            .runner
            .execute(
                self.binary,
                &["state", "pull"],
                Some(project_dir),
                OutputMode::Binary,
            )?
            .into_bytes())
    }

    /// Move `resource` out of `source_file` into `destination_file`, keeping its address
    pub fn move_resource(
        &self,
        source_file: &Path,
        destination_file: &Path,
        resource: &str,
    ) -> Result<(), CommandError> {
        let state_arg = state_flag("-state", source_file);
        let state_out_arg = state_flag("-state-out", destination_file);
        self.runner.execute(
            self.binary,
            &["state", "mv", &state_arg, &state_out_arg, resource, resource],
            None,
            OutputMode::Binary,
        )?;
        Ok(())
    }

    /// Replace the project's remote state with `state_file`
    pub fn push(&self, project_dir: &Path, state_file: &Path) -> Result<(), CommandError> {
        let file_arg = state_file.to_string_lossy();
        self.runner.execute(
            self.binary,
            &["state", "push", &file_arg],
            Some(project_dir),
            OutputMode::Binary,
        )?;
        Ok(())
    }
}

fn state_flag(flag: &str, path: &Path) -> String {
    format!("{}={}", flag, path.to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockCommandExecutor, MockCommandResult, MockOutput};
    use std::path::PathBuf;

    fn args_of(executor: &MockCommandExecutor, index: usize) -> Vec<String> {
        executor.calls()[index].args.clone()
    }

    #[test]
    fn test_move_resource_argument_template() {
        let executor = MockCommandExecutor::new();
        let output = MockOutput::new();
        let cli = TerraformCli::new(&executor, &output, Flavor::Terraform);

        cli.move_resource(
            Path::new("/work/tmp/source.tfstate"),
            Path::new("/work/tmp/destination.tfstate"),
            "module.foo.aws_instance.bar",
        )
        .unwrap();

        let calls = executor.calls();
        assert_eq!(calls[0].program, "terraform");
        assert_eq!(calls[0].working_dir, None);
        assert_eq!(
            args_of(&executor, 0),
            vec![
                "state",
                "mv",
                "-state=/work/tmp/source.tfstate",
                "-state-out=/work/tmp/destination.tfstate",
                "module.foo.aws_instance.bar",
                "module.foo.aws_instance.bar",
            ]
        );
    }

    #[test]
    fn test_list_resources_filters_in_process() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult::success(
            "tofu state list",
            "module.a.x.one\nmodule.b.x.two\nmodule.a.x.three\n",
        )]);
        let output = MockOutput::new();
        let cli = TerraformCli::new(&executor, &output, Flavor::OpenTofu);

        let resources = cli
            .list_resources(Path::new("/src"), Some("module.a"))
            .unwrap();

        assert_eq!(resources, vec!["module.a.x.one", "module.a.x.three"]);
        // The filter never reaches the command line
        assert_eq!(args_of(&executor, 0), vec!["state", "list"]);
        assert_eq!(executor.calls()[0].working_dir, Some(PathBuf::from("/src")));
    }

    #[test]
    fn test_list_state_file_uses_state_flag() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult::success(
            "terraform state list -state=/work/tmp/destination.tfstate",
            "aws_instance.a\n",
        )]);
        let output = MockOutput::new();
        let cli = TerraformCli::new(&executor, &output, Flavor::Terraform);

        let resources = cli
            .list_state_file(Path::new("/work/tmp/destination.tfstate"))
            .unwrap();
        assert_eq!(resources, vec!["aws_instance.a"]);
    }

    #[test]
    fn test_pull_and_push_run_in_project_dir() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult::success(
            "terraform state pull",
            b"{\"version\": 4}".to_vec(),
        )]);
        let output = MockOutput::new();
        let cli = TerraformCli::new(&executor, &output, Flavor::Terraform);

        let state = cli.pull(Path::new("/dst")).unwrap();
        assert_eq!(state, b"{\"version\": 4}".to_vec());

        cli.push(Path::new("/dst"), Path::new("/work/tmp/destination.tfstate"))
            .unwrap();

        let calls = executor.calls();
        assert_eq!(
            calls[1].args,
            vec!["state", "push", "/work/tmp/destination.tfstate"]
        );
        assert_eq!(calls[1].working_dir, Some(PathBuf::from("/dst")));
    }

    #[test]
    fn test_init_failure_propagates() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult::failure(
            "terraform init",
            1,
            "Error: Backend initialization required",
        )]);
        let output = MockOutput::new();
        let cli = TerraformCli::new(&executor, &output, Flavor::Terraform);

        let err = cli.init(Path::new("/src")).unwrap_err();
        assert_eq!(err.exit_code(), Some(1));
    }

    #[test]
    fn test_check_installed() {
        let output = MockOutput::new();

        let present = MockCommandExecutor::new();
        assert!(TerraformCli::new(&present, &output, Flavor::Terraform).check_installed());

        let broken = MockCommandExecutor::with_outputs(vec![MockCommandResult::failure(
            "terraform version",
            127,
            "",
        )]);
        assert!(!TerraformCli::new(&broken, &output, Flavor::Terraform).check_installed());
    }

    #[test]
    fn test_init_is_interactive() {
        let executor = MockCommandExecutor::new();
        let output = MockOutput::new();
        let cli = TerraformCli::new(&executor, &output, Flavor::Terraform);

        cli.init(Path::new("/src")).unwrap();

        let calls = executor.calls();
        assert_eq!(calls[0].args, vec!["init"]);
        assert!(calls[0].interactive);
        assert_eq!(calls[0].working_dir, Some(PathBuf::from("/src")));
    }

    #[test]
    fn test_push_ignores_non_utf8_output() {
        let executor = MockCommandExecutor::with_outputs(vec![MockCommandResult::success(
            "terraform state push",
            vec![0xff, 0xfe],
        )]);
        let output = MockOutput::new();
        let cli = TerraformCli::new(&executor, &output, Flavor::Terraform);

        cli.push(Path::new("/dst"), Path::new("/work/tmp/destination.tfstate"))
            .unwrap();
        assert!(!executor.calls()[0].interactive);
    }
}
