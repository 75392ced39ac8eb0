//! Response types for command cycles.

use std::time::Duration;

/// Output collected for one command cycle.
#[derive(Debug, Clone)]
pub struct Response {
    /// The command that was written to the channel, without its newline.
    pub command: String,

    /// Decoded output since the last automatic confirmation reply (or the
    /// whole cycle if there was none).
    pub output: String,

    /// Every byte received during the cycle, confirmation exchanges included.
    pub raw: Vec<u8>,

    /// Text matched by the prompt pattern, if the cycle ended on a prompt.
    pub prompt: Option<String>,

    /// Inline device error extracted from `output`.
    pub error: Option<String>,

    /// Number of confirmation questions answered automatically.
    pub confirmations: usize,

    /// Time taken by the cycle.
    pub elapsed: Duration,
}

impl Response {
    /// Check if the device reported no inline error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Get the raw bytes as a string (lossy UTF-8).
    pub fn raw_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.raw)
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.output)
    }
}

/// How a command cycle ended.
#[derive(Debug, Clone)]
pub enum Cycle {
    /// A prompt pattern matched; the device is ready for the next command.
    PromptMatched(Response),

    /// Nothing recognizable arrived before the idle timeout.
    TimedOut(Response),

    /// The device closed the channel.
    Closed(Response),
}

impl Cycle {
    /// The response, whatever the outcome.
    pub fn response(&self) -> &Response {
        match self {
            Cycle::PromptMatched(r) | Cycle::TimedOut(r) | Cycle::Closed(r) => r,
        }
    }

    /// Consume the cycle and return its response.
    pub fn into_response(self) -> Response {
        match self {
            Cycle::PromptMatched(r) | Cycle::TimedOut(r) | Cycle::Closed(r) => r,
        }
    }

    /// True if the cycle ended on a prompt.
    pub fn is_matched(&self) -> bool {
        matches!(self, Cycle::PromptMatched(_))
    }
}
