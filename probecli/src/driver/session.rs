//! Session engine: send a command, read until the device is ready again.

use std::time::{Duration, Instant};

use log::{debug, error, info, trace};
use regex::Regex;

use super::profile::ProfileWriter;
use super::response::{Cycle, Response};
use crate::channel::{PromptMatcher, ResponseBuffer};
use crate::error::{DriverError, Result};
use crate::transport::{ChannelRead, ShellChannel};

/// Drives one interactive shell channel, one command at a time.
///
/// Prompt-based framing is the only way to tell where a response ends, so
/// a command is never written before the previous cycle has resolved to a
/// prompt match, an idle timeout or a closed channel.
pub struct Session<C: ShellChannel> {
    /// The exclusively owned shell channel.
    channel: C,

    /// Active prompt patterns.
    matcher: PromptMatcher,

    /// Output of the current cycle.
    buffer: ResponseBuffer,

    /// Extracts the device's inline `% ...` errors.
    error_pattern: Regex,

    /// Written when the device asks for confirmation.
    confirmation_reply: String,

    /// How long a read may stay silent before the cycle times out.
    idle_timeout: Duration,

    /// Automatic confirmations allowed per cycle.
    max_confirmations: usize,

    /// Set in CMS profile mode.
    profile: Option<ProfileWriter>,

    /// Last command written, for reporting.
    last_command: String,

    /// Commands written so far, confirmation replies excluded.
    commands_sent: usize,
}

impl<C: ShellChannel> Session<C> {
    pub(crate) fn new(
        channel: C,
        matcher: PromptMatcher,
        error_pattern: Regex,
        confirmation_reply: String,
        idle_timeout: Duration,
        max_confirmations: usize,
        profile: Option<ProfileWriter>,
    ) -> Self {
        Self {
            channel,
            matcher,
            buffer: ResponseBuffer::new(),
            error_pattern,
            confirmation_reply,
            idle_timeout,
            max_confirmations,
            profile,
            last_command: String::new(),
            commands_sent: 0,
        }
    }

    /// Write one script line to the device.
    ///
    /// In CMS profile mode the line is first rewritten as a profile
    /// command. Returns the text actually written, without the newline.
    pub async fn send(&mut self, line: &str) -> Result<String> {
        let line = line.trim_end_matches(['\r', '\n']);
        let command = match self.profile.as_mut() {
            Some(profile) => profile.rewrite(line),
            None => line.to_string(),
        };

        self.buffer.clear();
        info!("Sent command: {}", command);
        self.write_line(&command).await?;
        self.last_command = command.clone();
        self.commands_sent += 1;
        Ok(command)
    }

    /// Read until a prompt matches, the channel goes idle, or it closes.
    ///
    /// A confirmation question is answered in place and the same cycle keeps
    /// reading; it never ends the cycle by itself.
    pub async fn receive(&mut self) -> Result<Cycle> {
        let start = Instant::now();
        let mut raw = Vec::new();
        let mut confirmations = 0;

        loop {
            match self.channel.read(self.idle_timeout).await? {
                ChannelRead::Data(chunk) => {
                    trace!("received {} bytes", chunk.len());
                    self.buffer.extend(&chunk);
                }
                ChannelRead::Idle => {
                    debug!(
                        "Timeout of {:?} exceeded without a prompt after '{}'",
                        self.idle_timeout, self.last_command
                    );
                    let response = self.finish(raw, None, confirmations, start);
                    return Ok(Cycle::TimedOut(response));
                }
                ChannelRead::Closed => {
                    debug!("Channel closed after '{}'", self.last_command);
                    let response = self.finish(raw, None, confirmations, start);
                    return Ok(Cycle::Closed(response));
                }
            }

            if self.matcher.is_confirmation(self.buffer.text()) {
                confirmations += 1;
                if confirmations > self.max_confirmations {
                    return Err(DriverError::ConfirmationLoop {
                        command: self.last_command.clone(),
                        count: confirmations,
                    }
                    .into());
                }

                let (_, bytes) = self.buffer.take();
                raw.extend_from_slice(&bytes);

                let reply = self.confirmation_reply.clone();
                info!("Confirmation requested, replying {}", reply);
                self.write_line(&reply).await?;
                continue;
            }

            if let Some(prompt) = self.matcher.find_prompt(self.buffer.text()) {
                let prompt = prompt.to_string();
                let response = self.finish(raw, Some(prompt), confirmations, start);
                return Ok(Cycle::PromptMatched(response));
            }
        }
    }

    /// Send a line and wait for its cycle to resolve.
    pub async fn execute(&mut self, line: &str) -> Result<Cycle> {
        self.send(line).await?;
        self.receive().await
    }

    /// Consume the login banner and first prompt after the shell opens.
    pub async fn drain_banner(&mut self) -> Result<Cycle> {
        self.buffer.clear();
        self.last_command.clear();
        self.receive().await
    }

    /// Close the channel. The session cannot be used afterwards.
    pub async fn close(mut self) -> Result<()> {
        self.channel.close().await?;
        Ok(())
    }

    /// The active prompt patterns.
    pub fn matcher(&self) -> &PromptMatcher {
        &self.matcher
    }

    /// The underlying channel.
    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// True if the session is rewriting commands into a CMS profile.
    pub fn is_profile_mode(&self) -> bool {
        self.profile.is_some()
    }

    /// Number of commands sent, confirmation replies excluded.
    pub fn commands_sent(&self) -> usize {
        self.commands_sent
    }

    async fn write_line(&mut self, line: &str) -> Result<()> {
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.channel.write(&data).await?;
        Ok(())
    }

    fn finish(
        &mut self,
        mut raw: Vec<u8>,
        prompt: Option<String>,
        confirmations: usize,
        start: Instant,
    ) -> Response {
        let (output, bytes) = self.buffer.take();
        raw.extend_from_slice(&bytes);

        if !output.is_empty() {
            debug!("Command returned: {:?}", output);
        }

        let error = self
            .error_pattern
            .captures(&output)
            .and_then(|caps| caps.name("error"))
            .map(|m| m.as_str().trim().to_string());
        if let Some(ref message) = error {
            error!("Command returned error: {}", message);
        }

        Response {
            command: self.last_command.clone(),
            output,
            raw,
            prompt,
            error,
            confirmations,
            elapsed: start.elapsed(),
        }
    }
}
