//! Platform definitions for the appliances probecli talks to.
//!
//! A platform supplies the defaults a session starts from: prompt
//! patterns derived from the target hostname, the confirmation question
//! the appliance asks before applying risky changes, and the way the CLI
//! reports errors inline.

mod definition;
pub mod probe;

pub use definition::{PlatformDefinition, short_hostname};
