use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use probecli::{HostKeyVerification, RunConfig, Runner, SshConfig};
use secrecy::SecretString;

#[derive(Parser, Debug)]
#[command(
    name = "probecli",
    about = "Run a file of CLI commands on an appliance over SSH",
    version
)]
struct Args {
    /// Path to file containing CLI commands
    #[arg(short = 'f', long = "file")]
    file: PathBuf,

    /// Name of target appliance
    #[arg(short = 'd', long)]
    host: String,

    /// Username for authentication
    #[arg(short, long)]
    user: String,

    /// Password for authentication
    #[arg(short, long, env = "PROBECLI_PASSWORD", hide_env_values = true)]
    password: String,

    /// URL to location of image file (fills <URL> and <IMAGE>)
    #[arg(short = 'U', long)]
    url: Option<String>,

    /// Name to assign to the VM (fills <VMNAME>)
    #[arg(short = 'N', long = "vm-name")]
    vm_name: Option<String>,

    /// CMS profile name, use when the target is a CMS and a profile is being created
    #[arg(short = 'c', long = "cms-profile")]
    cms_profile: Option<String>,

    /// Enable debug output
    #[arg(short = 'v', long)]
    debug: bool,

    /// SSH port
    #[arg(long, default_value_t = 22)]
    port: u16,

    /// Seconds of silence before a command is considered finished
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    /// Seconds allowed for the SSH connection to come up
    #[arg(long = "connect-timeout", default_value_t = 5)]
    connect_timeout: u64,

    /// Host key checking policy
    #[arg(long = "host-key", value_enum, default_value_t = HostKeyMode::AcceptNew)]
    host_key: HostKeyMode,

    /// known_hosts file to check host keys against
    #[arg(long = "known-hosts")]
    known_hosts: Option<PathBuf>,

    /// Log file (defaults to the script path with a .log extension)
    #[arg(long = "log-file", conflicts_with = "no_log_file")]
    log_file: Option<PathBuf>,

    /// Only log to stderr
    #[arg(long = "no-log-file")]
    no_log_file: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum HostKeyMode {
    Strict,
    AcceptNew,
    Disabled,
}

impl From<HostKeyMode> for HostKeyVerification {
    fn from(mode: HostKeyMode) -> Self {
        match mode {
            HostKeyMode::Strict => HostKeyVerification::Strict,
            HostKeyMode::AcceptNew => HostKeyVerification::AcceptNew,
            HostKeyMode::Disabled => HostKeyVerification::Disabled,
        }
    }
}

/// Writes log output to stderr and, if present, a log file.
struct Tee {
    file: Option<File>,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Some(file) = self.file.as_mut() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Some(file) = self.file.as_mut() {
            file.flush()?;
        }
        Ok(())
    }
}

fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if debug { "debug" } else { "info" };

    let file = log_file
        .map(|path| {
            File::create(path)
                .with_context(|| format!("Failed to create log file: {}", path.display()))
        })
        .transpose()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Pipe(Box::new(Tee { file })))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file = if args.no_log_file {
        None
    } else {
        Some(
            args.log_file
                .clone()
                .unwrap_or_else(|| args.file.with_extension("log")),
        )
    };
    init_logging(args.debug, log_file.as_deref())?;

    let mut ssh = SshConfig::new(&args.host, &args.user, SecretString::from(args.password));
    ssh.port = args.port;
    ssh.timeout = Duration::from_secs(args.connect_timeout);
    ssh.host_key_verification = args.host_key.into();
    ssh.known_hosts_path = args.known_hosts;

    let mut config = RunConfig::new(&args.file, ssh);
    config.url = args.url;
    config.vm_name = args.vm_name;
    config.cms_profile = args.cms_profile;
    config.idle_timeout = Duration::from_secs(args.timeout);

    let summary = Runner::new(config)
        .run()
        .await
        .with_context(|| format!("Failed to run {} on {}", args.file.display(), args.host))?;

    info!(
        "Finished: {} commands sent, {} device errors, {} timeouts",
        summary.commands_sent,
        summary.device_errors.len(),
        summary.timeouts
    );
    for e in &summary.device_errors {
        warn!("Line {}: '{}' returned {}", e.line, e.command, e.message);
    }

    Ok(())
}
