//! CMS profile mode: commands become profile directives.
//!
//! When building a CMS configuration profile, each script line is wrapped
//! as `cmc profile <name> command <n> "<line>"` instead of being run on the
//! CMS itself. Sequence numbers start at 10 and step by 10 so entries can be
//! inserted later. Mode-entry commands (`enable`, `configure terminal`) are
//! needed on the CMS itself and pass through untouched.

use regex::Regex;

/// First profile command number.
pub const FIRST_SEQUENCE: u32 = 10;

/// Gap between profile command numbers.
pub const SEQUENCE_STEP: u32 = 10;

/// Rewrites script lines into CMS profile commands.
#[derive(Debug, Clone)]
pub struct ProfileWriter {
    name: String,
    next: u32,
    passthrough: Regex,
}

impl ProfileWriter {
    /// Create a writer for profile `name`.
    pub fn new(name: impl Into<String>, passthrough: Regex) -> Self {
        Self {
            name: name.into(),
            next: FIRST_SEQUENCE,
            passthrough,
        }
    }

    /// Profile name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Sequence number the next wrapped line will get.
    pub fn next_sequence(&self) -> u32 {
        self.next
    }

    /// Wrap `line` as a profile command, or return it unchanged if it is a
    /// mode-entry command.
    pub fn rewrite(&mut self, line: &str) -> String {
        let line = line.trim_end();
        if self.passthrough.is_match(line) {
            return line.to_string();
        }

        let wrapped = format!(
            "cmc profile {} command {} \"{}\"",
            self.name, self.next, line
        );
        self.next += SEQUENCE_STEP;
        wrapped
    }
}
