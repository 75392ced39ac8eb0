//! Two-pass script runner.
//!
//! Pass one reads the script before any connection exists and applies
//! `@prompt` directives, so prompts of nested consoles or other vendors'
//! CLIs are known before the first command goes out. Pass two opens the
//! shell and sends every line, handling `@sleep` and `@exit` on the way.

use std::path::PathBuf;
use std::time::Duration;

use log::{debug, error, info, warn};
use regex::Regex;

use crate::channel::PromptMatcher;
use crate::driver::{Cycle, DEFAULT_IDLE_TIMEOUT, DEFAULT_MAX_CONFIRMATIONS, Session, SessionBuilder};
use crate::error::{MacroError, Result, ScriptError};
use crate::platform::{PlatformDefinition, probe};
use crate::script::{Macro, MacroInvocation, Mode, ScriptReader, VMNAME, VariableStore};
use crate::transport::{ShellChannel, SshConfig, SshTransport};

/// Everything needed for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Path of the command script.
    pub script: PathBuf,

    /// Connection to the target appliance.
    pub ssh: SshConfig,

    /// Image URL, fills `<URL>` and `<IMAGE>`.
    pub url: Option<String>,

    /// VM name, fills `<VMNAME>`.
    pub vm_name: Option<String>,

    /// CMS profile to write commands into instead of running them.
    pub cms_profile: Option<String>,

    /// Idle timeout for each command cycle.
    pub idle_timeout: Duration,

    /// Confirmation questions answered per cycle before giving up.
    pub max_confirmations: usize,
}

impl RunConfig {
    /// Create a run configuration with default timeouts and no variables.
    pub fn new(script: impl Into<PathBuf>, ssh: SshConfig) -> Self {
        Self {
            script: script.into(),
            ssh,
            url: None,
            vm_name: None,
            cms_profile: None,
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            max_confirmations: DEFAULT_MAX_CONFIRMATIONS,
        }
    }
}

/// An inline error the device reported for a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceError {
    /// Script line number.
    pub line: usize,

    /// Command as written to the channel.
    pub command: String,

    /// The `% ...` message.
    pub message: String,
}

/// What happened during the execution pass.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Commands written to the device.
    pub commands_sent: usize,

    /// Errors the device reported inline.
    pub device_errors: Vec<DeviceError>,

    /// Cycles that ended on the idle timeout.
    pub timeouts: usize,

    /// Directives that could not be executed, by line number.
    pub macro_errors: Vec<(usize, MacroError)>,

    /// Placeholders left unsubstituted, by line number.
    pub missing_variables: Vec<(usize, String)>,

    /// The run stopped at an `@exit` directive.
    pub exited_early: bool,

    /// The device closed the channel before the script ended.
    pub closed_by_peer: bool,
}

/// Runs a command script against one appliance.
pub struct Runner {
    config: RunConfig,
    platform: PlatformDefinition,
    variables: VariableStore,
}

impl Runner {
    /// Create a runner for the EndaceProbe platform.
    pub fn new(config: RunConfig) -> Self {
        Self::with_platform(config, probe::platform())
    }

    /// Create a runner for a custom platform.
    pub fn with_platform(mut config: RunConfig, platform: PlatformDefinition) -> Self {
        let mut variables = VariableStore::new();
        match config.url {
            Some(ref url) => variables.set_url(url.clone()),
            None => info!("No URL available, lines using <URL> or <IMAGE> will be sent unchanged"),
        }
        if let Some(ref name) = config.vm_name {
            variables.set(VMNAME, Some(name.clone()));
        }

        config.ssh.terminal_width = platform.terminal_width;
        config.ssh.terminal_height = platform.terminal_height;

        Self {
            config,
            platform,
            variables,
        }
    }

    /// The variables substituted into command lines.
    pub fn variables(&self) -> &VariableStore {
        &self.variables
    }

    /// Mutable access to the variables, for values beyond the defaults.
    pub fn variables_mut(&mut self) -> &mut VariableStore {
        &mut self.variables
    }

    /// The run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Builder for sessions matching this run's configuration.
    pub fn session_builder(&self) -> SessionBuilder {
        SessionBuilder::new()
            .platform(self.platform.clone())
            .idle_timeout(self.config.idle_timeout)
            .max_confirmations(self.config.max_confirmations)
            .cms_profile_opt(self.config.cms_profile.clone())
    }

    /// Prompt patterns for the target host, before any `@prompt`.
    pub fn default_matcher(&self) -> Result<PromptMatcher> {
        Ok(self.platform.prompt_matcher(&self.config.ssh.host)?)
    }

    /// Run the whole script: discovery, connect, execution, close.
    ///
    /// The shell channel and the SSH session are closed on every path out
    /// of the execution pass.
    pub async fn run(&self) -> Result<RunSummary> {
        debug!("Opening {} for reading commands", self.config.script.display());
        let reader = ScriptReader::open(&self.config.script)?;

        let mut matcher = self.default_matcher()?;
        self.discover(&reader, &mut matcher)?;

        let transport = SshTransport::connect(self.config.ssh.clone()).await?;
        let result = self.run_on(&transport, &reader, matcher).await;

        if let Err(e) = transport.close().await {
            warn!("Failed to close connection cleanly: {}", e);
        }
        result
    }

    async fn run_on(
        &self,
        transport: &SshTransport,
        reader: &ScriptReader,
        matcher: PromptMatcher,
    ) -> Result<RunSummary> {
        let shell = transport.open_shell().await?;
        let mut session = self.session_builder().build(shell, matcher)?;

        let result = self.drive(reader, &mut session).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close shell channel: {}", e);
        }
        result
    }

    async fn drive<C: ShellChannel>(
        &self,
        reader: &ScriptReader,
        session: &mut Session<C>,
    ) -> Result<RunSummary> {
        session.drain_banner().await?;
        self.execute(reader, session).await
    }

    /// Pass one: apply every `@prompt` directive to `matcher`.
    ///
    /// Other directives are ignored here. Returns the number of patterns
    /// added.
    pub fn discover(&self, reader: &ScriptReader, matcher: &mut PromptMatcher) -> Result<usize> {
        let mut added = 0;
        for line in reader.lines()? {
            let line = line?;
            let Some(parsed) = MacroInvocation::parse(&line.text) else {
                continue;
            };
            let invocation = match parsed {
                Ok(invocation) => invocation,
                Err(e) => {
                    debug!("Line {}: {} (ignored before connecting)", line.number, e);
                    continue;
                }
            };

            match Macro::interpret(&invocation, Mode::Discovery) {
                Ok(Some(Macro::Prompt(pattern))) => {
                    let regex = Regex::new(&pattern).map_err(|source| ScriptError::InvalidPrompt {
                        line: line.number,
                        source,
                    })?;
                    matcher.append_regex(regex);
                    added += 1;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Line {}: {}", line.number, e);
                }
            }
        }
        Ok(added)
    }

    /// Pass two: send every command line through `session`.
    ///
    /// Device errors, timeouts and bad directives are reported and the run
    /// continues. `@exit` stops before any later line is looked at.
    pub async fn execute<C: ShellChannel>(
        &self,
        reader: &ScriptReader,
        session: &mut Session<C>,
    ) -> Result<RunSummary> {
        let mut summary = RunSummary::default();
        let profile_mode = session.is_profile_mode();

        for line in reader.lines()? {
            let line = line?;

            if let Some(parsed) = MacroInvocation::parse(&line.text) {
                let directive = parsed.and_then(|inv| Macro::interpret(&inv, Mode::Execution));
                match directive {
                    Ok(Some(Macro::Exit)) => {
                        info!("@exit macro found on line {}, terminating", line.number);
                        summary.exited_early = true;
                        return Ok(summary);
                    }
                    Ok(Some(Macro::Sleep(duration))) if profile_mode => {
                        debug!("Skipping @sleep {:?} while writing a CMS profile", duration);
                    }
                    Ok(Some(Macro::Sleep(duration))) => {
                        info!("@sleep macro found, sleeping for {:?}", duration);
                        tokio::time::sleep(duration).await;
                    }
                    Ok(Some(Macro::Prompt(_))) | Ok(None) => {}
                    Err(e) => {
                        error!("Line {}: {}", line.number, e);
                        summary.macro_errors.push((line.number, e));
                    }
                }
                continue;
            }

            let substitution = self.variables.substitute(&line.text);
            summary.missing_variables.extend(
                substitution
                    .missing
                    .into_iter()
                    .map(|name| (line.number, name)),
            );

            let cycle = session.execute(&substitution.line).await?;
            summary.commands_sent += 1;

            let closed = matches!(cycle, Cycle::Closed(_));
            if matches!(cycle, Cycle::TimedOut(_)) {
                summary.timeouts += 1;
            }

            let response = cycle.into_response();
            if let Some(message) = response.error {
                summary.device_errors.push(DeviceError {
                    line: line.number,
                    command: response.command,
                    message,
                });
            }

            if closed {
                info!("Device closed the session after line {}", line.number);
                summary.closed_by_peer = true;
                break;
            }
        }

        Ok(summary)
    }
}
