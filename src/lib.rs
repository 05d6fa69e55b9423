//! Host side driver for peripherals speaking line oriented AT commands,
//! such as the HM-10 Bluetooth LE module.
//!
//! Commands are text terminated by `\r\n`. The device answers with zero or
//! more lines, and the end of a reply is only detectable by the line going
//! quiet for one read timeout. The crate is layered accordingly:
//!
//! * [`Command`] and [`encode()`] produce correctly framed commands.
//! * [`ByteChannel`] is the transport seam. [`LineChannel`] adapts any
//!   blocking `Read + Write` stream with a read timeout, e.g. a serial port.
//! * [`Transactor`] writes one command and drains the reply lines into a [`Reply`].
//! * [`parse_status()`] and [`parse_capabilities()`] extract structured
//!   information from reply text.
//! * [`Session`] ties a channel to the device's [`CapabilityList`] and tracks
//!   whether the device passed the liveness check.
//!
//! Logging goes through the [`log`] facade; install a logger in the
//! application to see it.

mod buffer;
pub mod channel;
pub mod command;
mod nom_parser;
#[cfg(feature = "serial")]
pub mod serial;
pub mod session;
pub mod transaction;
pub mod types;

pub use channel::{ByteChannel, LineChannel};
pub use command::{encode, Command, IntoFrame, TERMINATOR};
pub use nom_parser::{parse_capabilities, parse_status};
#[cfg(feature = "serial")]
pub use serial::SerialConfig;
pub use session::{Connect, Session, SessionState};
pub use transaction::Transactor;
pub use types::{CapabilityList, ParsedStatus, Reply};
