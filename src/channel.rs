//! The byte channel the protocol runs over.
//!
//! [`ByteChannel`] is the seam between the protocol engine and the transport.
//! [`LineChannel`] implements it for any blocking `Read + Write` stream whose
//! reads time out, such as an opened serial port.

use std::io::{self, ErrorKind, Read, Write};

use crate::buffer::Buffer;

/// Duplex byte stream with line oriented, timeout bounded reads.
pub trait ByteChannel {
    /// Write all of `data` to the device.
    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;

    /// Read one line, including its `\n`.
    ///
    /// Returns whatever was received before the read timed out, which is an
    /// empty vector if nothing arrived.
    fn read_line(&mut self) -> io::Result<Vec<u8>>;
}

impl<C: ByteChannel + ?Sized> ByteChannel for &mut C {
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        (**self).write_all(data)
    }

    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        (**self).read_line()
    }
}

/// Line reader and writer over a `Read + Write` stream.
#[derive(Debug)]
pub struct LineChannel<IO> {
    io: IO,
    buffer: Buffer,
}

impl<IO> LineChannel<IO>
where
    IO: Read + Write,
{
    pub fn new(io: IO) -> Self {
        Self {
            io,
            buffer: Buffer::new(),
        }
    }

    pub fn get_ref(&self) -> &IO {
        &self.io
    }

    pub fn get_mut(&mut self) -> &mut IO {
        &mut self.io
    }

    /// Unwrap the stream. Buffered but unread data is discarded.
    pub fn into_inner(self) -> IO {
        self.io
    }
}

impl<IO> ByteChannel for LineChannel<IO>
where
    IO: Read + Write,
{
    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.io.write_all(data)?;
        self.io.flush()
    }

    fn read_line(&mut self) -> io::Result<Vec<u8>> {
        let mut chunk = [0; 64];
        loop {
            if let Some(line) = self.buffer.take_line() {
                return Ok(line);
            }
            match self.io.read(&mut chunk) {
                Ok(0) => return Ok(self.buffer.take_all()),
                Ok(len) => self.buffer.write(&chunk[..len]),
                Err(err) if is_timeout(&err) => return Ok(self.buffer.take_all()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock)
}
