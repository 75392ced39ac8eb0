//! # probecli
//!
//! Scripted SSH CLI sessions for network appliances and the consoles of the
//! VMs they host.
//!
//! probecli reads a line-oriented command script, substitutes `<NAME>`
//! placeholders, and sends each line to the appliance over an interactive
//! SSH shell. A command is complete when one of the known prompt patterns
//! shows up in its output, or when the device goes quiet for the idle
//! timeout.
//!
//! ## Features
//!
//! - Async SSH sessions via russh
//! - Prompt detection across chunk boundaries, with incremental UTF-8 decoding
//! - `@prompt`, `@sleep` and `@exit` script directives
//! - Automatic answers to "apply configuration anyway" questions
//! - CMS profile mode, which turns each line into a profile command
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use probecli::{RunConfig, Runner, SshConfig};
//! use secrecy::SecretString;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), probecli::Error> {
//!     let ssh = SshConfig::new("probe1.lab", "admin", SecretString::from("secret".to_string()));
//!     let mut config = RunConfig::new("deploy-vm.txt", ssh);
//!     config.vm_name = Some("fw1".to_string());
//!
//!     let summary = Runner::new(config).run().await?;
//!     println!("{} commands sent", summary.commands_sent);
//!     Ok(())
//! }
//! ```

pub mod channel;
pub mod driver;
pub mod error;
pub mod platform;
pub mod runner;
pub mod script;
pub mod transport;

// Re-export main types for convenience
pub use channel::{PromptMatcher, ResponseBuffer};
pub use driver::{Cycle, Response, Session, SessionBuilder};
pub use error::{Error, Result};
pub use platform::PlatformDefinition;
pub use runner::{DeviceError, RunConfig, RunSummary, Runner};
pub use script::{ScriptReader, VariableStore};
pub use transport::{ChannelRead, HostKeyVerification, ShellChannel, SshConfig};
