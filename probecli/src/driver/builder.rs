//! Builder for creating sessions.

use std::time::Duration;

use super::profile::ProfileWriter;
use super::session::Session;
use crate::channel::PromptMatcher;
use crate::error::Result;
use crate::platform::{PlatformDefinition, probe};
use crate::transport::ShellChannel;

/// Default idle timeout for a command cycle.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(5);

/// Default number of confirmation questions answered per cycle.
pub const DEFAULT_MAX_CONFIRMATIONS: usize = 3;

/// Builder for constructing a [`Session`] around an open channel.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use probecli::driver::SessionBuilder;
///
/// let builder = SessionBuilder::new()
///     .idle_timeout(Duration::from_secs(10))
///     .cms_profile("edge-probes");
/// ```
#[derive(Debug, Clone)]
pub struct SessionBuilder {
    platform: PlatformDefinition,
    idle_timeout: Duration,
    max_confirmations: usize,
    profile: Option<String>,
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionBuilder {
    /// Create a builder for the EndaceProbe platform.
    pub fn new() -> Self {
        Self {
            platform: probe::platform(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_confirmations: DEFAULT_MAX_CONFIRMATIONS,
            profile: None,
        }
    }

    /// Use a custom platform definition.
    pub fn platform(mut self, platform: PlatformDefinition) -> Self {
        self.platform = platform;
        self
    }

    /// Set how long a read may stay silent before the cycle times out.
    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set how many confirmation questions one cycle may answer.
    pub fn max_confirmations(mut self, max: usize) -> Self {
        self.max_confirmations = max;
        self
    }

    /// Rewrite commands into the named CMS profile.
    pub fn cms_profile(mut self, name: impl Into<String>) -> Self {
        self.profile = Some(name.into());
        self
    }

    /// Set or clear CMS profile mode.
    pub fn cms_profile_opt(mut self, name: Option<String>) -> Self {
        self.profile = name;
        self
    }

    /// The platform the session will use.
    pub fn platform_definition(&self) -> &PlatformDefinition {
        &self.platform
    }

    /// Build the session.
    ///
    /// `matcher` carries the prompt patterns collected so far, normally
    /// the platform defaults for the host plus any `@prompt` additions.
    pub fn build<C: ShellChannel>(self, channel: C, matcher: PromptMatcher) -> Result<Session<C>> {
        let error_pattern = self.platform.error_regex()?;
        let profile = match self.profile {
            Some(name) => Some(ProfileWriter::new(name, self.platform.passthrough_regex()?)),
            None => None,
        };

        Ok(Session::new(
            channel,
            matcher,
            error_pattern,
            self.platform.confirmation_reply,
            self.idle_timeout,
            self.max_confirmations,
            profile,
        ))
    }
}
