//! In-memory shell channel for driving sessions without a device.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use probecli::error::ChannelError;
use probecli::platform::probe;
use probecli::{ChannelRead, PromptMatcher, ShellChannel};

/// Everything written to a [`MockChannel`], one entry per write.
#[derive(Clone, Default)]
pub struct Written(Arc<Mutex<Vec<Vec<u8>>>>);

impl Written {
    pub fn lines(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap()
            .iter()
            .map(|w| String::from_utf8_lossy(w).into_owned())
            .collect()
    }
}

/// A scripted device: each write releases the next queued reply.
#[derive(Default)]
pub struct MockChannel {
    written: Written,
    replies: VecDeque<Vec<ChannelRead>>,
    pending: VecDeque<ChannelRead>,
    closed: bool,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output available before anything is written.
    pub fn banner(mut self, chunks: &[&str]) -> Self {
        self.pending
            .extend(chunks.iter().map(|c| ChannelRead::Data(c.as_bytes().to_vec())));
        self
    }

    /// Chunks the device sends after the next unanswered write.
    pub fn reply(self, chunks: &[&str]) -> Self {
        self.reply_bytes(&chunks.iter().map(|c| c.as_bytes()).collect::<Vec<_>>())
    }

    pub fn reply_bytes(mut self, chunks: &[&[u8]]) -> Self {
        self.replies.push_back(
            chunks
                .iter()
                .map(|c| ChannelRead::Data(c.to_vec()))
                .collect(),
        );
        self
    }

    /// The next write gets no output at all.
    pub fn silent(mut self) -> Self {
        self.replies.push_back(Vec::new());
        self
    }

    /// The device prints `chunks` and hangs up after the next write.
    pub fn reply_then_close(mut self, chunks: &[&str]) -> Self {
        let mut events: Vec<ChannelRead> = chunks
            .iter()
            .map(|c| ChannelRead::Data(c.as_bytes().to_vec()))
            .collect();
        events.push(ChannelRead::Closed);
        self.replies.push_back(events);
        self
    }

    pub fn written(&self) -> Written {
        self.written.clone()
    }
}

impl ShellChannel for MockChannel {
    async fn write(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.written.0.lock().unwrap().push(data.to_vec());
        if let Some(reply) = self.replies.pop_front() {
            self.pending.extend(reply);
        }
        Ok(())
    }

    async fn read(&mut self, _idle: Duration) -> Result<ChannelRead, ChannelError> {
        if self.closed {
            return Ok(ChannelRead::Closed);
        }
        match self.pending.pop_front() {
            Some(ChannelRead::Closed) => {
                self.closed = true;
                Ok(ChannelRead::Closed)
            }
            Some(event) => Ok(event),
            None => Ok(ChannelRead::Idle),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        self.closed = true;
        Ok(())
    }
}

/// Default EndaceProbe prompts for host `probe1`.
pub fn probe_matcher() -> PromptMatcher {
    probe::platform().prompt_matcher("probe1").unwrap()
}
