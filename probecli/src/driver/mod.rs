//! Session engine for driving a device shell.
//!
//! The driver layer sends script lines, reads the device's output until a
//! known prompt appears, answers confirmation questions, and rewrites
//! commands in CMS profile mode.

mod builder;
pub mod profile;
mod response;
mod session;

pub use builder::{DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_CONFIRMATIONS, SessionBuilder};
pub use profile::ProfileWriter;
pub use response::{Cycle, Response};
pub use session::Session;
