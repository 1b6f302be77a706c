use crate::state::ScratchDir;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Name of the scratch directory created under the working directory by default
pub const DEFAULT_SCRATCH_DIR_NAME: &str = "tmp";

/// Which binary implements the `state` subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Flavor {
    #[default]
    Terraform,
    #[value(name = "opentofu", alias = "tofu")]
    OpenTofu,
}

impl Flavor {
    /// Executable looked up on PATH
    pub fn binary(self) -> &'static str {
        match self {
            Flavor::Terraform => "terraform",
            Flavor::OpenTofu => "tofu",
        }
    }
}

/// Everything the move workflow needs besides the operator's answers
#[derive(Debug, Clone)]
pub struct MoveConfig {
    pub scratch: ScratchDir,
    pub flavor: Flavor,
    /// List both scratch files after moving and report mismatches
    pub verify: bool,
}

impl MoveConfig {
    /// Build the config, defaulting the scratch directory to `<cwd>/tmp`
    pub fn resolve(scratch_dir: Option<PathBuf>, flavor: Flavor, verify: bool) -> Result<Self> {
        let scratch_dir = match scratch_dir {
            Some(dir) => std::path::absolute(&dir)
                .with_context(|| format!("Invalid scratch directory: {}", dir.display()))?,
            None => {
                let cwd = std::env::current_dir()
                    .context("Failed to determine the current directory")?;
                Self::default_scratch_dir(&cwd)
            }
        };

        Ok(Self {
            scratch: ScratchDir::new(scratch_dir),
            flavor,
            verify,
        })
    }

    pub fn default_scratch_dir(cwd: &Path) -> PathBuf {
        cwd.join(DEFAULT_SCRATCH_DIR_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flavor_binaries() {
        assert_eq!(Flavor::Terraform.binary(), "terraform");
        assert_eq!(Flavor::OpenTofu.binary(), "tofu");
        assert_eq!(Flavor::default(), Flavor::Terraform);
    }

    #[test]
    fn test_default_scratch_dir_is_under_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let config = MoveConfig::resolve(None, Flavor::Terraform, true).unwrap();
        assert_eq!(config.scratch.root(), cwd.join("tmp"));
    }

    #[test]
    fn test_explicit_scratch_dir_is_made_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let config =
            MoveConfig::resolve(Some(PathBuf::from("state-work")), Flavor::OpenTofu, false)
                .unwrap();
        assert_eq!(config.scratch.root(), cwd.join("state-work"));
        assert_eq!(config.flavor, Flavor::OpenTofu);
        assert!(!config.verify);
    }
}
