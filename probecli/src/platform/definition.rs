//! Platform definition for appliance-specific configuration.

use regex::Regex;

use crate::channel::PromptMatcher;
use crate::error::ChannelError;

/// Placeholder replaced by the (escaped) short hostname in prompt templates.
const HOST_PLACEHOLDER: &str = "{host}";

/// Platform definition containing all appliance-specific configuration.
#[derive(Debug, Clone)]
pub struct PlatformDefinition {
    /// Platform name (e.g., "endace_probe").
    pub name: String,

    /// Prompt pattern templates, in priority order. `{host}` expands to
    /// the regex-escaped short hostname.
    pub prompt_templates: Vec<String>,

    /// Pattern for the "apply changes anyway?" confirmation question.
    pub confirmation_pattern: String,

    /// Reply sent when the confirmation question is seen.
    pub confirmation_reply: String,

    /// Pattern extracting an inline device error. Must have a group named
    /// `error`.
    pub error_pattern: String,

    /// Lines matching this pattern are sent as-is in CMS profile mode.
    pub profile_passthrough: String,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,
}

impl PlatformDefinition {
    /// Create a new platform definition with minimal required fields.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompt_templates: vec![],
            confirmation_pattern: String::new(),
            confirmation_reply: "YES".to_string(),
            error_pattern: String::new(),
            profile_passthrough: String::new(),
            terminal_width: 80,
            terminal_height: 40,
        }
    }

    /// Add a prompt template.
    pub fn with_prompt(mut self, template: impl Into<String>) -> Self {
        self.prompt_templates.push(template.into());
        self
    }

    /// Set the confirmation question pattern.
    pub fn with_confirmation(mut self, pattern: impl Into<String>) -> Self {
        self.confirmation_pattern = pattern.into();
        self
    }

    /// Set the inline error pattern.
    pub fn with_error_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.error_pattern = pattern.into();
        self
    }

    /// Set the CMS profile pass-through pattern.
    pub fn with_profile_passthrough(mut self, pattern: impl Into<String>) -> Self {
        self.profile_passthrough = pattern.into();
        self
    }

    /// Set terminal dimensions.
    pub fn with_terminal_size(mut self, width: u32, height: u32) -> Self {
        self.terminal_width = width;
        self.terminal_height = height;
        self
    }

    /// Expand the prompt templates for `host` and build the session's
    /// prompt matcher.
    pub fn prompt_matcher(&self, host: &str) -> Result<PromptMatcher, ChannelError> {
        let escaped = regex::escape(short_hostname(host));
        let patterns = self
            .prompt_templates
            .iter()
            .map(|t| Regex::new(&t.replace(HOST_PLACEHOLDER, &escaped)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PromptMatcher::new(
            patterns,
            Regex::new(&self.confirmation_pattern)?,
        ))
    }

    /// Compile the inline error pattern.
    pub fn error_regex(&self) -> Result<Regex, ChannelError> {
        Ok(Regex::new(&self.error_pattern)?)
    }

    /// Compile the CMS profile pass-through pattern.
    pub fn passthrough_regex(&self) -> Result<Regex, ChannelError> {
        Ok(Regex::new(&self.profile_passthrough)?)
    }
}

/// The hostname up to its first dot; appliance prompts show only this part.
pub fn short_hostname(host: &str) -> &str {
    host.split('.').next().unwrap_or(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_hostname() {
        assert_eq!(short_hostname("probe1.lab.example.com"), "probe1");
        assert_eq!(short_hostname("probe1"), "probe1");
        assert_eq!(short_hostname(""), "");
    }

    #[test]
    fn test_prompt_templates_are_escaped() {
        let platform = PlatformDefinition::new("test")
            .with_prompt(r"{host}\s#")
            .with_confirmation("anyway");

        let matcher = platform.prompt_matcher("a+b.example").unwrap();
        assert!(matcher.matches_any("a+b #"));
        assert!(!matcher.matches_any("aab #"));
    }
}
