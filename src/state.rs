//! Local working copies of the two Terraform states involved in a move.

use crate::traits::FileSystem;
use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};

/// Which side of the move a state file belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateFileType {
    Source,
    Destination,
}

impl StateFileType {
    /// Fixed file name of this state inside the scratch directory
    pub fn file_name(self) -> &'static str {
        match self {
            StateFileType::Source => "source.tfstate",
            StateFileType::Destination => "destination.tfstate",
        }
    }
}

impl fmt::Display for StateFileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateFileType::Source => write!(f, "source"),
            StateFileType::Destination => write!(f, "destination"),
        }
    }
}

/// Directory holding the downloaded state files for one session.
///
/// Never cleaned up: after a declined upload or a failed move the files are
/// the only record of what happened locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScratchDir {
    root: PathBuf,
}

impl ScratchDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the local copy for `kind`
    pub fn state_file(&self, kind: StateFileType) -> PathBuf {
        self.root.join(kind.file_name())
    }

    /// Create the directory if it does not exist yet
    pub fn ensure(&self, fs: &dyn FileSystem) -> Result<()> {
        if fs.is_dir(&self.root) {
            return Ok(());
        }

        fs.create_dir_all(&self.root)
            .with_context(|| format!("Failed to create scratch directory {}", self.root.display()))
    }
}

/// Split `state list` output into resource addresses.
///
/// Blank lines are dropped. A blank `filter` keeps everything, otherwise only
/// addresses containing it as a substring survive.
pub fn parse_resource_list(listing: &str, filter: Option<&str>) -> Vec<String> {
    let filter = filter.map(str::trim).filter(|f| !f.is_empty());

    listing
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| filter.is_none_or(|f| line.contains(f)))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::MockFileSystem;

    const LISTING: &str = "aws_instance.a\n\
        module.network.aws_vpc.main\n\
        module.network.aws_subnet.private[0]\n\
        \n\
        module.dns.aws_route53_zone.primary\n";

    #[test]
    fn test_state_file_names_are_distinct() {
        assert_ne!(
            StateFileType::Source.file_name(),
            StateFileType::Destination.file_name()
        );
    }

    #[test]
    fn test_state_file_lives_in_scratch_dir() {
        let scratch = ScratchDir::new("/work/tmp");
        assert_eq!(
            scratch.state_file(StateFileType::Source),
            PathBuf::from("/work/tmp/source.tfstate")
        );
        assert_eq!(
            scratch.state_file(StateFileType::Destination),
            PathBuf::from("/work/tmp/destination.tfstate")
        );
    }

    #[test]
    fn test_ensure_creates_missing_directory() {
        let fs = MockFileSystem::new();
        let scratch = ScratchDir::new("/work/tmp");

        scratch.ensure(&fs).unwrap();
        assert!(fs.is_dir(Path::new("/work/tmp")));

        // Second call is a no-op
        scratch.ensure(&fs).unwrap();
    }

    #[test]
    fn test_parse_drops_blank_lines() {
        let resources = parse_resource_list(LISTING, None);
        assert_eq!(resources.len(), 4);
        assert!(resources.iter().all(|r| !r.is_empty()));
    }

    #[test]
    fn test_parse_handles_crlf() {
        let resources = parse_resource_list("aws_instance.a\r\naws_instance.b\r\n", None);
        assert_eq!(resources, vec!["aws_instance.a", "aws_instance.b"]);
    }

    #[test]
    fn test_filter_is_substring_match() {
        let resources = parse_resource_list(LISTING, Some("module.network"));
        assert_eq!(
            resources,
            vec![
                "module.network.aws_vpc.main",
                "module.network.aws_subnet.private[0]"
            ]
        );
    }

    #[test]
    fn test_empty_filter_equals_no_filter() {
        let unfiltered = parse_resource_list(LISTING, None);
        assert_eq!(parse_resource_list(LISTING, Some("")), unfiltered);
        assert_eq!(parse_resource_list(LISTING, Some("   ")), unfiltered);
    }

    #[test]
    fn test_filter_treats_shell_metacharacters_literally() {
        let listing = "aws_instance.a\nweird; rm -rf /\n";
        assert_eq!(
            parse_resource_list(listing, Some("; rm")),
            vec!["weird; rm -rf /"]
        );
        assert!(parse_resource_list(listing, Some("$(whoami)")).is_empty());
    }

    #[test]
    fn test_filter_without_matches_is_empty() {
        assert!(parse_resource_list(LISTING, Some("module.compute")).is_empty());
    }
}
