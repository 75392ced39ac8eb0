//! Prompt matching over decoded session text.

use log::debug;
use regex::Regex;

use crate::error::ChannelError;

/// The ordered, append-only set of prompt patterns for one session.
///
/// Patterns are searched anywhere in the decoded text of the current
/// command cycle. The confirmation pattern is kept apart from the prompt
/// patterns and is always checked first.
#[derive(Debug, Clone)]
pub struct PromptMatcher {
    /// Prompt patterns, in the order they were added.
    patterns: Vec<Regex>,

    /// Pattern for the "apply configuration changes anyway?" question.
    confirmation: Regex,
}

impl PromptMatcher {
    /// Create a matcher from already-compiled patterns.
    pub fn new(patterns: Vec<Regex>, confirmation: Regex) -> Self {
        Self {
            patterns,
            confirmation,
        }
    }

    /// Compile and append a prompt pattern.
    pub fn append(&mut self, pattern: &str) -> Result<(), ChannelError> {
        let regex = Regex::new(pattern)?;
        self.append_regex(regex);
        Ok(())
    }

    /// Append an already-compiled prompt pattern.
    pub fn append_regex(&mut self, regex: Regex) {
        debug!("Adding prompt pattern {:?}", regex.as_str());
        self.patterns.push(regex);
    }

    /// True if any prompt pattern matches anywhere in `text`.
    pub fn matches_any(&self, text: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(text))
    }

    /// Return the text matched by the first matching prompt pattern.
    pub fn find_prompt<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.patterns
            .iter()
            .find_map(|p| p.find(text))
            .map(|m| m.as_str())
    }

    /// True if `text` contains the confirmation question.
    pub fn is_confirmation(&self, text: &str) -> bool {
        self.confirmation.is_match(text)
    }

    /// The active prompt patterns.
    pub fn patterns(&self) -> &[Regex] {
        &self.patterns
    }

    /// The confirmation pattern.
    pub fn confirmation(&self) -> &Regex {
        &self.confirmation
    }

    /// Number of active prompt patterns.
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True if no prompt pattern is active.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> PromptMatcher {
        PromptMatcher::new(
            vec![Regex::new(r".*probe1\s[#>]\s").unwrap()],
            Regex::new(r".*configuration\smode\sanyway:\s").unwrap(),
        )
    }

    #[test]
    fn test_matches_anywhere() {
        let m = matcher();
        assert!(m.matches_any("show version\r\nprobe1 # "));
        assert!(m.matches_any("probe1 > "));
        assert!(!m.matches_any("probe2 # "));
    }

    #[test]
    fn test_append_extends_set() {
        let mut m = matcher();
        assert!(!m.matches_any("[root@vm1 ~]# "));
        m.append(r"\[root@vm1 ~\]#\s").unwrap();
        assert_eq!(m.len(), 2);
        assert!(m.matches_any("[root@vm1 ~]# "));
    }

    #[test]
    fn test_append_rejects_bad_regex() {
        let mut m = matcher();
        assert!(matches!(
            m.append("(unclosed"),
            Err(ChannelError::InvalidPattern(_))
        ));
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn test_find_prompt_returns_matched_text() {
        let m = matcher();
        assert_eq!(m.find_prompt("out\nprobe1 # "), Some("probe1 # "));
        assert_eq!(m.find_prompt("out\n"), None);
    }

    #[test]
    fn test_confirmation_is_separate() {
        let m = matcher();
        let text = "Apply changes and leave configuration mode anyway: ";
        assert!(m.is_confirmation(text));
        assert!(!m.matches_any(text));
    }
}
