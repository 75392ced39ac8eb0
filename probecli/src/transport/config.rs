//! SSH connection configuration.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

/// Host key verification mode, analogous to OpenSSH's `StrictHostKeyChecking`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostKeyVerification {
    /// Reject unknown and changed keys. Connection fails if the host
    /// is not already in known_hosts.
    Strict,

    /// Accept and auto-learn unknown keys, but reject changed keys.
    #[default]
    AcceptNew,

    /// Accept all keys without checking. For lab use only.
    Disabled,
}

/// SSH connection configuration.
#[derive(Debug, Clone)]
pub struct SshConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// SSH port (default: 22).
    pub port: u16,

    /// Username for authentication.
    pub username: String,

    /// Password for authentication.
    pub password: SecretString,

    /// Connection timeout.
    pub timeout: Duration,

    /// Terminal width for PTY.
    pub terminal_width: u32,

    /// Terminal height for PTY.
    pub terminal_height: u32,

    /// Host key verification mode.
    pub host_key_verification: HostKeyVerification,

    /// Path to known_hosts file. `None` uses `~/.ssh/known_hosts`.
    pub known_hosts_path: Option<PathBuf>,
}

impl SshConfig {
    /// Create a configuration with default port, timeout and terminal size.
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: SecretString,
    ) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: username.into(),
            password,
            timeout: Duration::from_secs(5),
            terminal_width: 80,
            terminal_height: 40,
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Get the socket address for connection.
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SshConfig::new("probe1.lab", "admin", SecretString::from("pw".to_string()));
        assert_eq!(config.port, 22);
        assert_eq!(config.socket_addr(), "probe1.lab:22");
        assert_eq!(config.host_key_verification, HostKeyVerification::AcceptNew);
        assert_eq!((config.terminal_width, config.terminal_height), (80, 40));
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let config = SshConfig::new("probe1", "admin", SecretString::from("hunter2".to_string()));
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
