//! Interactive shell channel abstraction.

use std::future::Future;
use std::time::Duration;

use log::trace;
use russh::client::Msg;
use russh::{Channel, ChannelMsg};

use crate::error::ChannelError;

/// Outcome of a single read from a shell channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelRead {
    /// Bytes arrived from the device.
    Data(Vec<u8>),

    /// Nothing arrived within the idle timeout.
    Idle,

    /// The peer closed the channel.
    Closed,
}

/// A bidirectional byte stream to an interactive device shell.
///
/// Authentication, encryption and host key handling are the
/// implementation's business; the session engine only writes bytes, reads
/// bytes and checks whether the stream is still open.
pub trait ShellChannel: Send {
    /// Write `data` to the device verbatim.
    fn write(&mut self, data: &[u8]) -> impl Future<Output = Result<(), ChannelError>> + Send;

    /// Wait up to `idle` for the next chunk of output.
    fn read(
        &mut self,
        idle: Duration,
    ) -> impl Future<Output = Result<ChannelRead, ChannelError>> + Send;

    /// True once the peer has closed the channel or `close` was called.
    fn is_closed(&self) -> bool;

    /// Close the channel.
    fn close(&mut self) -> impl Future<Output = Result<(), ChannelError>> + Send;
}

/// PTY shell on an SSH session.
pub struct SshShell {
    channel: Channel<Msg>,
    closed: bool,
}

impl SshShell {
    pub(crate) fn new(channel: Channel<Msg>) -> Self {
        Self {
            channel,
            closed: false,
        }
    }
}

impl ShellChannel for SshShell {
    async fn write(&mut self, data: &[u8]) -> Result<(), ChannelError> {
        if self.closed {
            return Err(ChannelError::Closed);
        }
        self.channel.data(data).await.map_err(ChannelError::Ssh)
    }

    async fn read(&mut self, idle: Duration) -> Result<ChannelRead, ChannelError> {
        if self.closed {
            return Ok(ChannelRead::Closed);
        }

        let deadline = tokio::time::Instant::now() + idle;
        loop {
            let msg = match tokio::time::timeout_at(deadline, self.channel.wait()).await {
                Err(_) => return Ok(ChannelRead::Idle),
                Ok(msg) => msg,
            };

            match msg {
                Some(ChannelMsg::Data { data }) => return Ok(ChannelRead::Data(data.to_vec())),
                Some(ChannelMsg::ExtendedData { data, .. }) => {
                    return Ok(ChannelRead::Data(data.to_vec()));
                }
                Some(ChannelMsg::Eof) | Some(ChannelMsg::Close) | None => {
                    self.closed = true;
                    return Ok(ChannelRead::Closed);
                }
                Some(other) => trace!("ignoring channel message {:?}", other),
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(&mut self) -> Result<(), ChannelError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.channel.close().await.map_err(ChannelError::Ssh)
    }
}
