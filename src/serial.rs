//! Native serial port transport, enabled by the `serial` feature.

use std::io;
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::channel::LineChannel;
use crate::session::Connect;

/// Baud rate HM-10 modules ship with.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// How long a single line read waits for data.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Serial port settings.
///
/// Framing is fixed at eight data bits, no parity, one stop bit and no flow
/// control. Only the path, baud rate and read timeout are configurable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub path: String,
    pub baud_rate: u32,
    pub timeout: Duration,
}

impl SerialConfig {
    pub fn new(path: impl Into<String>, baud_rate: u32) -> Self {
        Self {
            path: path.into(),
            baud_rate,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the per line read timeout. It bounds how long a silent device
    /// stalls a transaction.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Connect for SerialConfig {
    type Channel = LineChannel<Box<dyn SerialPort>>;

    fn port_name(&self) -> &str {
        &self.path
    }

    fn connect(&mut self) -> io::Result<Self::Channel> {
        let port = serialport::new(&self.path, self.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(self.timeout)
            .open()?;
        Ok(LineChannel::new(port))
    }
}
