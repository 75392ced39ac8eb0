//! Channel layer: response accumulation and prompt detection.
//!
//! This module holds the per-cycle response buffer and the set of
//! prompt patterns the session engine checks it against.

mod buffer;
mod patterns;

pub use buffer::ResponseBuffer;
pub use patterns::PromptMatcher;
