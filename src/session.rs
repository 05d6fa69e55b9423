//! See [`Session`] for more details.

use std::io;
use std::thread;
use std::time::Duration;

use log::{error, info, warn};
use snafu::{ResultExt, Snafu};

use crate::channel::ByteChannel;
use crate::command::{Command, IntoFrame};
use crate::transaction::Transactor;
use crate::types::{CapabilityList, ParsedStatus, Reply};

/// Error type for this module
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum Error {
    /// The channel to the device couldn't be opened.
    #[snafu(display("Failed to open serial port {}", port))]
    Open { port: String, source: io::Error },
}

/// Opens the channel a [`Session`] talks over.
pub trait Connect {
    /// The channel produced by a successful connect.
    type Channel: ByteChannel;

    /// Name of the port, used in log messages and errors.
    fn port_name(&self) -> &str;

    /// Open the channel.
    /// # Errors
    /// Returns the transport's error if the port can't be opened.
    fn connect(&mut self) -> io::Result<Self::Channel>;
}

/// Where a [`Session`] is in its lifecycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// No channel is held.
    Closed,
    /// The channel is open, liveness hasn't been checked.
    Open,
    /// The device answered the liveness probe with `OK`.
    Verified,
    /// The device gave no reply, or no `OK`, to the liveness probe.
    Unverified,
}

/// A device session: one channel and the capabilities seen through it.
///
/// The session owns its channel. It is released by [`close()`](Self::close),
/// or when the session is dropped, whichever comes first.
///
/// Queries are only meaningful once [`verify_liveness()`](Self::verify_liveness)
/// succeeded. They still run on an unverified session, but log a warning.
/// On a closed session they do no I/O and return empty results.
///
/// # Example
///
/// ```no_run
/// # #[cfg(feature = "serial")]
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use at_proto::{SerialConfig, Session};
///
/// let mut session = Session::new(SerialConfig::new("/dev/ttyUSB0", 9600));
/// session.open()?;
/// if session.verify_liveness() {
///     for opcode in session.list_capabilities() {
///         println!("{}", opcode);
///     }
///     println!("{:?}", session.query_work_mode());
/// }
/// # Ok(()) }
/// # #[cfg(not(feature = "serial"))]
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct Session<T: Connect> {
    connector: T,
    transactor: Option<Transactor<T::Channel>>,
    state: SessionState,
    capabilities: CapabilityList,
}

impl<T: Connect> Session<T> {
    /// Create a session in the `Closed` state.
    pub fn new(connector: T) -> Self {
        Self {
            connector,
            transactor: None,
            state: SessionState::Closed,
            capabilities: CapabilityList::new(),
        }
    }

    /// Open the channel.
    ///
    /// Opening an already open session is not an error, the session is left
    /// as is.
    /// # Errors
    /// Returns [`Error::Open`] if the channel can't be opened. The session
    /// stays `Closed`.
    pub fn open(&mut self) -> Result<(), Error> {
        if self.transactor.is_some() {
            warn!("Serial port {} already opened", self.connector.port_name());
            return Ok(());
        }
        let port = self.connector.port_name().to_owned();
        let channel = self.connector.connect().context(OpenSnafu { port })?;
        self.transactor = Some(Transactor::new(channel));
        self.state = SessionState::Open;
        info!("Opened serial port {}", self.connector.port_name());
        Ok(())
    }

    /// Send the liveness probe. Returns true if the reply contains `OK`.
    ///
    /// Moves the session to `Verified` or `Unverified`.
    pub fn verify_liveness(&mut self) -> bool {
        if self.transactor.is_none() {
            error!("AT not sent. Serial port {} is closed", self.connector.port_name());
            return false;
        }
        let reply = self.execute(Command::Test);
        if reply.is_empty() {
            error!("AT sent. No data received");
        } else {
            info!("AT sent. Received: {}", reply.trim_end());
        }

        let alive = reply.contains("OK");
        self.state = if alive {
            SessionState::Verified
        } else {
            SessionState::Unverified
        };
        alive
    }

    /// Repeat the liveness probe until it succeeds, at most `attempts` times,
    /// sleeping `interval` after each failed attempt but the last.
    pub fn wait_until_alive(&mut self, attempts: usize, interval: Duration) -> bool {
        for attempt in 1..=attempts {
            if self.verify_liveness() {
                return true;
            }
            if self.transactor.is_none() {
                break;
            }
            if attempt < attempts {
                info!("No OK within timeout, trying again ({}/{})", attempt, attempts);
                thread::sleep(interval);
            }
        }
        false
    }

    /// Ask the device for the commands it supports.
    ///
    /// The returned list replaces the one held by the session.
    pub fn list_capabilities(&mut self) -> &CapabilityList {
        self.warn_unverified(Command::Help);
        let reply = self.execute(Command::Help);
        self.capabilities = reply.capabilities();
        info!("Device lists {} commands", self.capabilities.len());
        &self.capabilities
    }

    /// The capabilities from the last [`list_capabilities()`](Self::list_capabilities),
    /// without talking to the device.
    pub fn capabilities(&self) -> &CapabilityList {
        &self.capabilities
    }

    /// Returns true if `opcode` is in the capability list.
    ///
    /// The list is empty until [`list_capabilities()`](Self::list_capabilities)
    /// has run, so this is false for everything before that.
    pub fn is_supported(&self, opcode: &str) -> bool {
        self.capabilities.is_supported(opcode)
    }

    /// Query the work mode. The mode is the parameter of the reply.
    pub fn query_work_mode(&mut self) -> ParsedStatus {
        self.warn_unverified(Command::WorkModeQuery);
        self.execute(Command::WorkModeQuery).parse_status()
    }

    /// Send `opcode` if the device listed it as supported.
    ///
    /// Returns None, without sending anything, for unsupported opcodes.
    pub fn send_if_supported(&mut self, opcode: &str) -> Option<Reply> {
        if self.is_supported(opcode) {
            Some(self.execute(opcode))
        } else {
            warn!("{} is not supported by the device, not sent", opcode);
            None
        }
    }

    /// Run a single transaction. A closed session returns an empty reply.
    pub fn execute(&mut self, command: impl IntoFrame) -> Reply {
        match self.transactor.as_mut() {
            Some(transactor) => transactor.execute(command),
            None => {
                warn!("Serial port {} is closed", self.connector.port_name());
                Reply::empty()
            }
        }
    }

    /// Release the channel. Safe to call any number of times.
    pub fn close(&mut self) {
        if let Some(transactor) = self.transactor.take() {
            info!("Closing serial port {}", self.connector.port_name());
            drop(transactor);
        }
        self.capabilities.clear();
        self.state = SessionState::Closed;
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.transactor.is_some()
    }

    pub fn connector(&self) -> &T {
        &self.connector
    }

    fn warn_unverified(&self, command: Command) {
        if self.state != SessionState::Verified {
            warn!(
                "Sending {} to a device in state {:?}",
                command, self.state
            );
        }
    }
}

impl<T: Connect> Drop for Session<T> {
    fn drop(&mut self) {
        self.close();
    }
}
