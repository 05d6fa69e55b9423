//! The transaction engine: one command out, every reply line in.
//!
//! A transaction writes a framed command and then reads lines until a read
//! comes back empty, which happens when the channel's read timeout expires
//! without data. Replies carry no request identifiers, so transactions on a
//! channel must never overlap; [`Transactor`] takes `&mut self` to enforce it.
//!
//! There is no overall deadline. A device that keeps talking keeps the
//! transaction alive.

use std::io;

use log::{debug, error, trace};
use snafu::{ResultExt, Snafu};

use crate::channel::ByteChannel;
use crate::command::IntoFrame;
use crate::types::Reply;

/// Error type for this module
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// Writing the command to the channel failed.
    #[snafu(display("Failed to send command"))]
    Write { source: io::Error },
    /// Reading the reply from the channel failed.
    #[snafu(display("Failed to receive reply"))]
    Read { source: io::Error },
}

/// Sends commands over a [`ByteChannel`] and collects the replies.
///
/// # Example
///
/// ```
/// use at_proto::{Command, LineChannel, Transactor};
/// # use std::io::{self, Read, Write};
/// # struct Device(Vec<u8>);
/// # impl Read for Device {
/// #     fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
/// #         let len = self.0.len().min(buf.len());
/// #         buf[..len].copy_from_slice(&self.0[..len]);
/// #         self.0.drain(..len);
/// #         Ok(len)
/// #     }
/// # }
/// # impl Write for Device {
/// #     fn write(&mut self, buf: &[u8]) -> io::Result<usize> { Ok(buf.len()) }
/// #     fn flush(&mut self) -> io::Result<()> { Ok(()) }
/// # }
/// # let serial = Device(b"OK\r\n".to_vec());
/// let mut at = Transactor::new(LineChannel::new(serial));
/// let reply = at.execute(Command::Test);
/// assert!(reply.contains("OK"));
/// ```
#[derive(Debug)]
pub struct Transactor<C> {
    channel: C,
}

impl<C> Transactor<C>
where
    C: ByteChannel,
{
    pub fn new(channel: C) -> Self {
        Self { channel }
    }

    /// Run one transaction, degrading any I/O error to an empty [`Reply`].
    ///
    /// The error is logged, the caller sees the same thing as for a device
    /// that didn't answer.
    pub fn execute(&mut self, command: impl IntoFrame) -> Reply {
        match self.try_execute(command) {
            Ok(reply) => reply,
            Err(err) => {
                error!("{}: {}", err, source_of(&err));
                Reply::empty()
            }
        }
    }

    /// Run one transaction, returning I/O errors to the caller.
    ///
    /// # Errors
    /// Returns [`Error::Write`] if the command couldn't be sent and
    /// [`Error::Read`] if the channel failed with anything but a timeout
    /// while the reply was drained.
    pub fn try_execute(&mut self, command: impl IntoFrame) -> Result<Reply, Error> {
        let frame = command.into_frame();
        trace!("Sending {:?}", String::from_utf8_lossy(&frame));
        self.channel.write_all(&frame).context(WriteSnafu)?;

        let mut data = Vec::new();
        loop {
            let line = self.channel.read_line().context(ReadSnafu)?;
            if line.is_empty() {
                break;
            }
            trace!("Received line {:?}", String::from_utf8_lossy(&line));
            data.extend_from_slice(&line);
        }

        let reply = Reply::from_lossy(&data);
        debug!("Received: {:?}", reply.as_str());
        Ok(reply)
    }

    pub fn get_ref(&self) -> &C {
        &self.channel
    }

    pub fn get_mut(&mut self) -> &mut C {
        &mut self.channel
    }

    pub fn into_inner(self) -> C {
        self.channel
    }
}

fn source_of(err: &Error) -> &io::Error {
    match err {
        Error::Write { source } | Error::Read { source } => source,
    }
}
