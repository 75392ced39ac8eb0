//! Error types for probecli.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for probecli operations.
#[derive(Error, Debug)]
pub enum Error {
    /// SSH transport-level errors
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Shell channel errors
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Session engine errors
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    /// Script file and macro errors
    #[error("Script error: {0}")]
    Script(#[from] ScriptError),
}

/// Transport layer errors (SSH connection, authentication).
#[derive(Error, Debug)]
pub enum TransportError {
    /// SSH handshake or protocol error
    #[error("SSH error: {0}")]
    Ssh(#[from] russh::Error),

    /// Authentication failed
    #[error("Authentication failed for user '{user}'")]
    AuthenticationFailed { user: String },

    /// The host is not present in known_hosts and strict checking is on
    #[error("Host key for {host}:{port} is not in known_hosts")]
    HostKeyUnknown { host: String, port: u16 },

    /// The host key does not match the one recorded in known_hosts
    #[error("Host key for {host}:{port} changed (known_hosts line {line})")]
    HostKeyChanged { host: String, port: u16, line: usize },

    /// known_hosts could not be read or written
    #[error("known_hosts error: {0}")]
    KnownHosts(String),

    /// Operation timed out
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Shell channel errors.
#[derive(Error, Debug)]
pub enum ChannelError {
    /// Failed to open the PTY shell
    #[error("Failed to open shell channel: {0}")]
    ShellOpenFailed(russh::Error),

    /// Channel closed before the write could be delivered
    #[error("Channel closed")]
    Closed,

    /// SSH protocol error on the channel
    #[error("Channel SSH error: {0}")]
    Ssh(russh::Error),

    /// Invalid regex pattern
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}

/// Session engine errors.
#[derive(Error, Debug)]
pub enum DriverError {
    /// The device kept asking for confirmation within one command cycle
    #[error("Device asked for confirmation {count} times while running '{command}'")]
    ConfirmationLoop { command: String, count: usize },
}

/// Script reading and macro errors.
#[derive(Error, Debug)]
pub enum ScriptError {
    /// The script file could not be opened
    #[error("Cannot open file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading a line from the script failed
    #[error("Cannot read line {line} of {path}: {source}")]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },

    /// An `@prompt` directive carried a pattern that does not compile
    #[error("Invalid @prompt pattern on line {line}: {source}")]
    InvalidPrompt {
        line: usize,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised for a single macro directive.
///
/// These never abort a run on their own; the runner reports them and moves
/// to the next line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MacroError {
    /// The line starts with `@` but is not `@name [argument]`
    #[error("Malformed macro directive: '{0}'")]
    Malformed(String),

    /// The macro name is not known in execution mode
    #[error("Unknown macro '@{0}'")]
    Unknown(String),

    /// The macro is known but its argument is unusable
    #[error("Invalid argument for '@{name}': '{argument}'")]
    InvalidArgument { name: String, argument: String },
}

/// Result type alias using probecli's Error.
pub type Result<T> = std::result::Result<T, Error>;
