//! SSH transport layer wrapping russh.
//!
//! This module provides the low-level SSH connection management,
//! handling connection setup, authentication, host key checks and the
//! interactive shell channel the session engine drives.

pub mod config;
mod shell;
mod ssh;

pub use config::{HostKeyVerification, SshConfig};
pub use shell::{ChannelRead, ShellChannel, SshShell};
pub use ssh::SshTransport;
