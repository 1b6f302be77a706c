use crate::config::MoveConfig;
use crate::context::Context;
use crate::executor::TerraformCli;
use crate::prompt::Prompter;
use crate::state::StateFileType;
use crate::traits::{FileSystem, Output};
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;

/// How a move session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing matched the filter or nothing was selected
    NothingToMove,
    /// The operator declined before any state was touched
    Declined,
    /// Resources were moved in the scratch files but not uploaded
    MovedLocally { moved: Vec<String> },
    /// Both scratch files were pushed to their backends
    Uploaded { moved: Vec<String> },
}

/// Prints `[n/total]` headers for the phases of a session
struct Steps<'a> {
    output: &'a dyn Output,
    current: usize,
    total: usize,
}

impl<'a> Steps<'a> {
    fn new(output: &'a dyn Output, total: usize) -> Self {
        Self {
            output,
            current: 0,
            total,
        }
    }

    fn next(&mut self, description: &str) {
        self.current += 1;
        tracing::info!(step = self.current, "{}", description);
        self.output.step(self.current, self.total, description);
    }
}

/// Handles the interactive move of resources from one state to another.
///
/// There is no rollback: a failed move leaves earlier moves in the scratch
/// files, and remote state is only touched after the final confirmation.
pub struct MoveCommand;

impl MoveCommand {
    pub fn execute(ctx: &Context, config: &MoveConfig) -> Result<MoveOutcome> {
        let output = &*ctx.output;
        let terraform = TerraformCli::new(&*ctx.command, output, config.flavor);
        let prompter = Prompter::new(&*ctx.input, &*ctx.fs, output);
        let mut steps = Steps::new(output, if config.verify { 8 } else { 7 });

        output.section("Terraform State Move");

        steps.next("Checking prerequisites");
        let installed = terraform.check_installed();
        output.status_check(terraform.binary(), installed);
        if !installed {
            anyhow::bail!(
                "{} is not installed or not available in PATH",
                terraform.binary()
            );
        }

        steps.next("Selecting projects");
        let source = prompter.directory("Enter source project path:")?;
        let destination = prompter.directory("Enter destination project path:")?;
        if source == destination {
            anyhow::bail!(
                "Source and destination are the same project: {}",
                source.display()
            );
        }
        for project in [&source, &destination] {
            Self::warn_without_configuration(&*ctx.fs, output, project);
        }
        output.key_value("Source", &source.display().to_string());
        output.key_value("Destination", &destination.display().to_string());

        steps.next("Initializing projects");
        terraform
            .init(&source)
            .context("Failed to initialize the source project")?;
        terraform
            .init(&destination)
            .context("Failed to initialize the destination project")?;

        steps.next("Downloading state");
        config.scratch.ensure(&*ctx.fs)?;
        Self::download(ctx, &terraform, config, StateFileType::Source, &source)?;
        Self::download(ctx, &terraform, config, StateFileType::Destination, &destination)?;

        steps.next("Selecting resources");
        let filter = prompter.text("Enter the name of the module you want to migrate (empty for all):")?;
        let resources = terraform
            .list_resources(&source, Some(&filter))
            .context("Failed to list resources in the source state")?;
        if resources.is_empty() {
            output.warning("No resources in the source state match the filter");
            return Ok(MoveOutcome::NothingToMove);
        }
        output.info(&format!("{} resource(s) available", resources.len()));

        let selected = prompter.resources(
            "Select resources to move from source to destination project:",
            &resources,
        )?;
        if selected.is_empty() {
            output.warning("No resources selected");
            return Ok(MoveOutcome::NothingToMove);
        }

        output.info(&format!(
            "You are moving from {} to {} the following resources:",
            source.display(),
            destination.display()
        ));
        for resource in &selected {
            output.list_item(resource);
        }
        if !prompter.confirm("Confirm?")? {
            output.dimmed("Nothing was moved");
            return Ok(MoveOutcome::Declined);
        }

        steps.next("Moving resources");
        let source_file = config.scratch.state_file(StateFileType::Source);
        let destination_file = config.scratch.state_file(StateFileType::Destination);
        let moved = Self::move_all(
            &terraform,
            output,
            config,
            &source_file,
            &destination_file,
            &selected,
        )?;
        output.success(&format!("Moved {} resource(s) locally", moved.len()));

        if config.verify {
            steps.next("Verifying local state files");
            Self::verify(&terraform, output, &source_file, &destination_file, &moved)?;
        }

        steps.next("Uploading state");
        if !prompter.confirm("Do you want to upload the state files to their remote backends?")? {
            output.info("Exiting without upload");
            output.key_value(
                "Local state files",
                &config.scratch.root().display().to_string(),
            );
            return Ok(MoveOutcome::MovedLocally { moved });
        }

        terraform
            .push(&source, &source_file)
            .context("Failed to upload the source state; remote state is unchanged")?;
        terraform.push(&destination, &destination_file).with_context(|| {
            format!(
                "Failed to upload the destination state after the source state was uploaded; \
                 reconcile manually from {}",
                destination_file.display()
            )
        })?;

        output.success("State files updated in remote backends");
        Ok(MoveOutcome::Uploaded { moved })
    }

    fn download(
        ctx: &Context,
        terraform: &TerraformCli,
        config: &MoveConfig,
        kind: StateFileType,
        project: &Path,
    ) -> Result<()> {
        let state = terraform
            .pull(project)
            .with_context(|| format!("Failed to download the {} state", kind))?;
        let local = config.scratch.state_file(kind);
        ctx.fs.write(&local, &state)?;

        tracing::debug!(%kind, path = %local.display(), bytes = state.len(), "state downloaded");
        ctx.output
            .key_value(&format!("{} state", kind), &local.display().to_string());
        Ok(())
    }

    /// Move each resource in order, stopping at the first failure
    fn move_all(
        terraform: &TerraformCli,
        output: &dyn Output,
        config: &MoveConfig,
        source_file: &Path,
        destination_file: &Path,
        selected: &[String],
    ) -> Result<Vec<String>> {
        let mut moved = Vec::new();

        for resource in selected {
            if resource.trim().is_empty() {
                continue;
            }

            output.info(&format!("Moving: {}", resource));
            terraform
                .move_resource(source_file, destination_file, resource)
                .with_context(|| {
                    format!(
                        "Failed to move {} after {} successful move(s); no rollback was attempted \
                         and remote state is unchanged, the partial result is in {}",
                        resource,
                        moved.len(),
                        config.scratch.root().display()
                    )
                })?;
            moved.push(resource.clone());
        }

        Ok(moved)
    }

    /// Check every moved resource left the source file and reached the destination file
    fn verify(
        terraform: &TerraformCli,
        output: &dyn Output,
        source_file: &Path,
        destination_file: &Path,
        moved: &[String],
    ) -> Result<()> {
        let remaining = terraform
            .list_state_file(source_file)
            .context("Failed to list the local source state")?;
        let arrived = terraform
            .list_state_file(destination_file)
            .context("Failed to list the local destination state")?;

        let mut problems = 0;
        for resource in moved {
            if remaining.contains(resource) {
                output.warning(&format!("{} is still present in the source state", resource));
                problems += 1;
            }
            if !arrived.contains(resource) {
                output.warning(&format!(
                    "{} is missing from the destination state",
                    resource
                ));
                problems += 1;
            }
        }

        if problems == 0 {
            output.success("All moved resources verified in the local state files");
        } else {
            output.warning("Review the local state files before uploading");
        }
        Ok(())
    }

    /// Warn when a project directory holds no Terraform configuration files
    fn warn_without_configuration(fs: &dyn FileSystem, output: &dyn Output, project: &Path) {
        let has_configuration = match fs.read_dir(project) {
            Ok(entries) => entries.iter().any(|entry| is_configuration_file(entry)),
            Err(err) => {
                tracing::debug!(project = %project.display(), error = %err, "could not read project directory");
                false
            }
        };

        if !has_configuration {
            output.warning(&format!(
                "{} contains no .tf files; init may fail",
                project.display()
            ));
        }
    }
}

fn is_configuration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(".tf") || name.ends_with(".tf.json"))
}
