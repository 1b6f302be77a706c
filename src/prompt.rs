//! Operator-facing questions asked during a move.

use crate::traits::user_input::expand_path;
use crate::traits::{FileSystem, Output, UserInput};
use anyhow::Result;
use std::path::PathBuf;

/// Synthetic first entry of the resource picker
pub const SELECT_ALL: &str = "Select ALL";

/// Asks the questions of a move session on top of a `UserInput`
pub struct Prompter<'a> {
    input: &'a dyn UserInput,
    fs: &'a dyn FileSystem,
    output: &'a dyn Output,
}

impl<'a> Prompter<'a> {
    pub fn new(input: &'a dyn UserInput, fs: &'a dyn FileSystem, output: &'a dyn Output) -> Self {
        Self { input, fs, output }
    }

    /// Ask until the answer names an existing directory; returns it expanded and absolute
    pub fn directory(&self, message: &str) -> Result<PathBuf> {
        loop {
            let raw = self.input.path(message)?;

            match expand_path(&raw) {
                Ok(path) if self.fs.is_dir(&path) => return Ok(path),
                Ok(_) => self
                    .output
                    .warning(&format!("'{}' is not a directory", raw.trim())),
                Err(err) => self
                    .output
                    .warning(&format!("'{}' is not a usable path: {}", raw.trim(), err)),
            }
        }
    }

    /// Free text; empty answers are allowed
    pub fn text(&self, message: &str) -> Result<String> {
        self.input.text(message, None)
    }

    /// Multi-select over `items` with a leading "select all" entry
    pub fn resources(&self, message: &str, items: &[String]) -> Result<Vec<String>> {
        let options = std::iter::once(SELECT_ALL.to_string())
            .chain(items.iter().cloned())
            .collect();

        let chosen = self.input.multi_select(message, options)?;
        Ok(resolve_selection(items, &chosen))
    }

    /// Yes/no question defaulting to yes
    pub fn confirm(&self, message: &str) -> Result<bool> {
        self.input.confirm(message, true)
    }
}

/// Expand the picker's answer into resources.
///
/// Choosing the select-all entry yields every item in list order regardless of
/// what else was ticked.
pub fn resolve_selection(items: &[String], chosen: &[String]) -> Vec<String> {
    if chosen.iter().any(|c| c == SELECT_ALL) {
        return items.to_vec();
    }

    items
        .iter()
        .filter(|item| chosen.contains(item))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{MockFileSystem, MockOutput, MockResponse, MockUserInput};
    use std::path::Path;

    fn items() -> Vec<String> {
        vec![
            "aws_instance.a".to_string(),
            "aws_instance.b".to_string(),
            "aws_instance.c".to_string(),
        ]
    }

    #[test]
    fn test_select_all_equals_manual_full_selection() {
        let all = resolve_selection(&items(), &[SELECT_ALL.to_string()]);
        let manual = resolve_selection(&items(), &items());
        assert_eq!(all, manual);
        assert_eq!(all, items());
    }

    #[test]
    fn test_select_all_with_extra_ticks_has_no_duplicates() {
        let chosen = vec![SELECT_ALL.to_string(), "aws_instance.b".to_string()];
        assert_eq!(resolve_selection(&items(), &chosen), items());
    }

    #[test]
    fn test_subset_selection() {
        let chosen = vec!["aws_instance.c".to_string(), "aws_instance.a".to_string()];
        assert_eq!(
            resolve_selection(&items(), &chosen),
            vec!["aws_instance.a".to_string(), "aws_instance.c".to_string()]
        );
        assert!(resolve_selection(&items(), &[]).is_empty());
    }

    #[test]
    fn test_resources_prompt_offers_select_all_first() {
        let input = MockUserInput::with_responses(vec![MockResponse::MultiSelect(vec![
            SELECT_ALL.to_string(),
        ])]);
        let fs = MockFileSystem::new();
        let output = MockOutput::new();
        let prompter = Prompter::new(&input, &fs, &output);

        let selected = prompter.resources("Pick resources", &items()).unwrap();
        assert_eq!(selected, items());
    }

    #[test]
    fn test_directory_reprompts_until_valid() {
        let input = MockUserInput::with_responses(vec![
            MockResponse::Path("/projects/missing".to_string()),
            MockResponse::Path("/projects/main.tf".to_string()),
            MockResponse::Path("/projects/network".to_string()),
        ]);
        let fs = MockFileSystem::new();
        fs.add_file("/projects/main.tf", "");
        fs.add_dir("/projects/network");
        let output = MockOutput::new();
        let prompter = Prompter::new(&input, &fs, &output);

        let dir = prompter.directory("Source project").unwrap();

        assert_eq!(dir, Path::new("/projects/network"));
        assert_eq!(output.get_warnings().len(), 2);
        assert_eq!(input.prompts().len(), 3);
    }

    #[test]
    fn test_directory_interrupt_aborts() {
        let input = MockUserInput::with_responses(vec![MockResponse::Interrupt]);
        let fs = MockFileSystem::new();
        let output = MockOutput::new();
        let prompter = Prompter::new(&input, &fs, &output);

        let err = prompter.directory("Source project").unwrap_err();
        assert!(err.downcast_ref::<crate::traits::Interrupted>().is_some());
    }

    #[test]
    fn test_text_allows_empty() {
        let input = MockUserInput::with_responses(vec![MockResponse::Text(String::new())]);
        let fs = MockFileSystem::new();
        let output = MockOutput::new();
        let prompter = Prompter::new(&input, &fs, &output);

        assert_eq!(prompter.text("Module filter").unwrap(), "");
    }
}
