use anyhow::Result;
use inquire::InquireError;
use inquire::validator::Validation;
use std::path::PathBuf;
#[cfg(test)]
use std::collections::VecDeque;
#[cfg(test)]
use std::sync::Mutex;

/// The operator interrupted a prompt (Ctrl-C or Esc); the whole run aborts
#[derive(Debug, thiserror::Error)]
#[error("interrupted by operator")]
pub struct Interrupted;

/// Trait for user input operations to enable testing with mocks
pub trait UserInput: Send + Sync {
    /// Ask for a directory path, returned exactly as typed
    fn path(&self, prompt: &str) -> Result<String>;

    /// Display a text input prompt
    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String>;

    /// Display a multi-selection prompt, returning the chosen options in list order
    fn multi_select(&self, prompt: &str, options: Vec<String>) -> Result<Vec<String>>;

    /// Display a confirmation prompt (yes/no)
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Expand a leading `~` to the home directory and make the path absolute.
///
/// The path is not required to exist.
pub fn expand_path(raw: &str) -> Result<PathBuf> {
    let raw = raw.trim();

    let expanded = if raw == "~" {
        home_dir()?
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home_dir()?.join(rest)
    } else {
        PathBuf::from(raw)
    };

    Ok(std::path::absolute(&expanded)?)
}

fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Could not determine the home directory"))
}

/// Map inquire's cancellation variants onto `Interrupted`
fn prompt_error(err: InquireError) -> anyhow::Error {
    match err {
        InquireError::OperationInterrupted | InquireError::OperationCanceled => Interrupted.into(),
        other => other.into(),
    }
}

/// Real user input implementation using inquire crate
pub struct InquireUserInput;

impl UserInput for InquireUserInput {
    fn path(&self, prompt: &str) -> Result<String> {
        use inquire::Text;
        let answer = Text::new(prompt)
            .with_help_message("~ expands to your home directory")
            .with_validator(|input: &str| {
                if input.trim().is_empty() {
                    return Ok(Validation::Invalid("A directory path is required".into()));
                }

                match expand_path(input) {
                    Ok(path) if path.is_dir() => Ok(Validation::Valid),
                    _ => Ok(Validation::Invalid("Input is not a directory".into())),
                }
            })
            .prompt()
            .map_err(prompt_error)?;
        Ok(answer)
    }

    fn text(&self, prompt: &str, default: Option<&str>) -> Result<String> {
        use inquire::Text;
        let mut text_prompt = Text::new(prompt);
        if let Some(default_val) = default {
            text_prompt = text_prompt.with_default(default_val);
        }
        let answer = text_prompt.prompt().map_err(prompt_error)?;
        Ok(answer)
    }

    fn multi_select(&self, prompt: &str, options: Vec<String>) -> Result<Vec<String>> {
        use inquire::MultiSelect;
        let answer = MultiSelect::new(prompt, options)
            .with_page_size(15)
            .prompt()
            .map_err(prompt_error)?;
        Ok(answer)
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        use inquire::Confirm;
        let answer = Confirm::new(prompt)
            .with_default(default)
            .prompt()
            .map_err(prompt_error)?;
        Ok(answer)
    }
}

/// Response type for mock user input
#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockResponse {
    Path(String),
    MultiSelect(Vec<String>),
    Text(String),
    Confirm(bool),
    /// Behave as if the operator pressed Ctrl-C
    Interrupt,
}

/// Mock user input implementation for testing
#[cfg(test)]
pub struct MockUserInput {
    responses: Mutex<VecDeque<MockResponse>>,
    prompts: Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockUserInput {
    pub fn new() -> Self {
        Self::with_responses(Vec::new())
    }

    /// Create mock with pre-configured responses
    pub fn with_responses(responses: Vec<MockResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts shown so far, in order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Number of configured responses that were never asked for
    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    /// Get the next response from the queue
    fn next_response(&self, prompt: &str) -> Result<MockResponse> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("No more mock responses available for '{}'", prompt))?;

        match response {
            MockResponse::Interrupt => Err(Interrupted.into()),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
impl Default for MockUserInput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl UserInput for MockUserInput {
    fn path(&self, prompt: &str) -> Result<String> {
        match self.next_response(prompt)? {
            MockResponse::Path(answer) => Ok(answer),
            other => anyhow::bail!("Expected Path response but got {:?}", other),
        }
    }

    fn text(&self, prompt: &str, _default: Option<&str>) -> Result<String> {
        match self.next_response(prompt)? {
            MockResponse::Text(answer) => Ok(answer),
            other => anyhow::bail!("Expected Text response but got {:?}", other),
        }
    }

    fn multi_select(&self, prompt: &str, options: Vec<String>) -> Result<Vec<String>> {
        match self.next_response(prompt)? {
            MockResponse::MultiSelect(answers) => {
                // Verify all answers are in the options
                for answer in &answers {
                    if !options.contains(answer) {
                        anyhow::bail!(
                            "Mock response '{}' is not in the provided options: {:?}",
                            answer,
                            options
                        )
                    }
                }
                // Real prompts hand back selections in list order
                Ok(options
                    .into_iter()
                    .filter(|option| answers.contains(option))
                    .collect())
            }
            other => anyhow::bail!("Expected MultiSelect response but got {:?}", other),
        }
    }

    fn confirm(&self, prompt: &str, _default: bool) -> Result<bool> {
        match self.next_response(prompt)? {
            MockResponse::Confirm(answer) => Ok(answer),
            other => anyhow::bail!("Expected Confirm response but got {:?}", other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_path_keeps_absolute_paths() {
        assert_eq!(
            expand_path("/srv/infra/network").unwrap(),
            PathBuf::from("/srv/infra/network")
        );
    }

    #[test]
    fn test_expand_path_trims_whitespace() {
        assert_eq!(
            expand_path("  /srv/infra  ").unwrap(),
            PathBuf::from("/srv/infra")
        );
    }

    #[test]
    fn test_expand_path_resolves_relative_against_cwd() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("projects/vpc").unwrap(), cwd.join("projects/vpc"));
    }

    #[test]
    fn test_expand_path_expands_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~").unwrap(), home);
            assert_eq!(expand_path("~/infra").unwrap(), home.join("infra"));
        }
    }

    #[test]
    fn test_mock_interrupt_surfaces_as_interrupted() {
        let input = MockUserInput::with_responses(vec![MockResponse::Interrupt]);
        let err = input.confirm("Proceed?", true).unwrap_err();
        assert!(err.downcast_ref::<Interrupted>().is_some());
    }

    #[test]
    fn test_mock_multi_select_returns_list_order() {
        let input = MockUserInput::with_responses(vec![MockResponse::MultiSelect(vec![
            "b".to_string(),
            "a".to_string(),
        ])]);
        let chosen = input
            .multi_select("Pick", vec!["a".to_string(), "b".to_string(), "c".to_string()])
            .unwrap();
        assert_eq!(chosen, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_mock_rejects_unknown_option() {
        let input =
            MockUserInput::with_responses(vec![MockResponse::MultiSelect(vec!["z".to_string()])]);
        assert!(input.multi_select("Pick", vec!["a".to_string()]).is_err());
    }
}
