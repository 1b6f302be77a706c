#[cfg(test)]
use std::sync::Mutex;

/// Output message captured by MockOutput for testing
#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub enum OutputMessage {
    Success(String),
    Error(String),
    Warning(String),
    Info(String),
    Section(String),
    Step(usize, usize, String),
    KeyValue(String, String),
    Dimmed(String),
    ListItem(String),
    StatusCheck(String, bool),
}

/// Trait for terminal output operations to enable testing with mocks
pub trait Output: Send + Sync {
    fn success(&self, message: &str);

    fn error(&self, message: &str);

    fn warning(&self, message: &str);

    fn info(&self, message: &str);

    /// Print a section header
    fn section(&self, title: &str);

    /// Print a numbered step of a multi-step run
    fn step(&self, number: usize, total: usize, description: &str);

    fn key_value(&self, key: &str, value: &str);

    /// Print a dimmed/muted message (captured command output, hints)
    fn dimmed(&self, message: &str);

    fn list_item(&self, text: &str);

    /// Print whether a prerequisite tool is available
    fn status_check(&self, item: &str, available: bool);
}

/// Real terminal output implementation using the output module
pub struct TerminalOutput;

impl Output for TerminalOutput {
    fn success(&self, message: &str) {
        crate::output::success(message);
    }

    fn error(&self, message: &str) {
        crate::output::error(message);
    }

    fn warning(&self, message: &str) {
        crate::output::warning(message);
    }

    fn info(&self, message: &str) {
        crate::output::info(message);
    }

    fn section(&self, title: &str) {
        crate::output::section(title);
    }

    fn step(&self, number: usize, total: usize, description: &str) {
        crate::output::step(number, total, description);
    }

    fn key_value(&self, key: &str, value: &str) {
        crate::output::key_value(key, value);
    }

    fn dimmed(&self, message: &str) {
        crate::output::dimmed(message);
    }

    fn list_item(&self, text: &str) {
        crate::output::list_item(text);
    }

    fn status_check(&self, item: &str, available: bool) {
        crate::output::status_check(item, available);
    }
}

/// Mock output implementation for testing (captures output)
#[cfg(test)]
pub struct MockOutput {
    messages: Mutex<Vec<OutputMessage>>,
}

#[cfg(test)]
impl MockOutput {
    pub fn new() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
        }
    }

    /// Get all captured messages
    pub fn get_messages(&self) -> Vec<OutputMessage> {
        self.messages.lock().unwrap().clone()
    }

    pub fn contains_message(&self, message: &OutputMessage) -> bool {
        self.messages.lock().unwrap().contains(message)
    }

    pub fn get_errors(&self) -> Vec<String> {
        self.collect(|m| match m {
            OutputMessage::Error(msg) => Some(msg.clone()),
            _ => None,
        })
    }

    pub fn get_warnings(&self) -> Vec<String> {
        self.collect(|m| match m {
            OutputMessage::Warning(msg) => Some(msg.clone()),
            _ => None,
        })
    }

    pub fn get_list_items(&self) -> Vec<String> {
        self.collect(|m| match m {
            OutputMessage::ListItem(item) => Some(item.clone()),
            _ => None,
        })
    }

    /// Get all messages formatted as text
    pub fn to_text(&self) -> String {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .map(|msg| match msg {
                OutputMessage::Success(s) => format!("✓ {}", s),
                OutputMessage::Error(s) => format!("✗ {}", s),
                OutputMessage::Warning(s) => format!("⚠ {}", s),
                OutputMessage::Info(s) => s.clone(),
                OutputMessage::Section(s) => format!("\n=== {} ===", s),
                OutputMessage::Step(n, total, s) => format!("[{}/{}] {}", n, total, s),
                OutputMessage::KeyValue(k, v) => format!("{}: {}", k, v),
                OutputMessage::Dimmed(s) => s.clone(),
                OutputMessage::ListItem(s) => format!("• {}", s),
                OutputMessage::StatusCheck(item, true) => format!("{} available", item),
                OutputMessage::StatusCheck(item, false) => format!("{} not found", item),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn collect(&self, pick: impl Fn(&OutputMessage) -> Option<String>) -> Vec<String> {
        self.messages.lock().unwrap().iter().filter_map(pick).collect()
    }

    fn push(&self, message: OutputMessage) {
        self.messages.lock().unwrap().push(message);
    }
}

#[cfg(test)]
impl Default for MockOutput {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl Output for MockOutput {
    fn success(&self, message: &str) {
        self.push(OutputMessage::Success(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.push(OutputMessage::Error(message.to_string()));
    }

    fn warning(&self, message: &str) {
        self.push(OutputMessage::Warning(message.to_string()));
    }

    fn info(&self, message: &str) {
        self.push(OutputMessage::Info(message.to_string()));
    }

    fn section(&self, title: &str) {
        self.push(OutputMessage::Section(title.to_string()));
    }

    fn step(&self, number: usize, total: usize, description: &str) {
        self.push(OutputMessage::Step(number, total, description.to_string()));
    }

    fn key_value(&self, key: &str, value: &str) {
        self.push(OutputMessage::KeyValue(key.to_string(), value.to_string()));
    }

    fn dimmed(&self, message: &str) {
        self.push(OutputMessage::Dimmed(message.to_string()));
    }

    fn list_item(&self, text: &str) {
        self.push(OutputMessage::ListItem(text.to_string()));
    }

    fn status_check(&self, item: &str, available: bool) {
        self.push(OutputMessage::StatusCheck(item.to_string(), available));
    }
}
