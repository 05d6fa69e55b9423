//! The command catalog and the wire framing of outbound commands.
//!
//! Every command sent to the device must end with [`TERMINATOR`]. Catalog
//! commands carry it in their canonical text, caller-supplied strings get it
//! through [`encode()`].

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use snafu::Snafu;

/// The two byte sequence ending every outbound command.
pub const TERMINATOR: &str = "\r\n";

/// Error type for this module
#[derive(Debug, Snafu, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The text isn't the opcode of any command in the catalog.
    #[snafu(display("Unknown command {:?}", text))]
    UnknownCommand { text: String },
}

/// Commands known to the terminal.
///
/// Opcodes ending in `?` are queries.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Command {
    /// `AT`, the liveness probe. A healthy device answers `OK`.
    Test,
    /// `AT+HELP`, lists the commands the device supports.
    Help,
    /// `AT+IMME`, the work mode opcode without argument.
    WorkMode,
    /// `AT+IMME?`, queries the work mode.
    WorkModeQuery,
}

impl Command {
    /// All catalog commands.
    pub const ALL: [Command; 4] = [
        Command::Test,
        Command::Help,
        Command::WorkMode,
        Command::WorkModeQuery,
    ];

    /// Canonical text, including the terminator.
    pub const fn as_str(self) -> &'static str {
        match self {
            Command::Test => "AT\r\n",
            Command::Help => "AT+HELP\r\n",
            Command::WorkMode => "AT+IMME\r\n",
            Command::WorkModeQuery => "AT+IMME?\r\n",
        }
    }

    /// The bare opcode, i.e. the canonical text without the terminator.
    pub fn opcode(self) -> &'static str {
        let text = self.as_str();
        &text[..text.len() - TERMINATOR.len()]
    }

    /// The bytes sent on the wire.
    pub const fn as_bytes(self) -> &'static [u8] {
        self.as_str().as_bytes()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.opcode())
    }
}

impl FromStr for Command {
    type Err = Error;

    /// Parses an opcode such as `AT+HELP`, with or without terminator.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let opcode = s.trim_end_matches(|c| c == '\r' || c == '\n');
        Command::ALL
            .iter()
            .copied()
            .find(|cmd| cmd.opcode() == opcode)
            .ok_or_else(|| Error::UnknownCommand { text: s.to_owned() })
    }
}

/// Frame a caller supplied command for the wire.
///
/// Every `\r` and `\n` is stripped and the terminator appended exactly once,
/// so `"AT"`, `"AT\r"`, `"AT\n"` and `"AT\r\n"` all encode to `AT\r\n`.
pub fn encode(raw: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(raw.len() + TERMINATOR.len());
    frame.extend(raw.bytes().filter(|&b| b != b'\r' && b != b'\n'));
    frame.extend_from_slice(TERMINATOR.as_bytes());
    frame
}

/// Anything that can be turned into a framed command.
pub trait IntoFrame {
    /// Convert self to the bytes sent on the wire, terminator included.
    fn into_frame(self) -> Cow<'static, [u8]>;
}

impl IntoFrame for Command {
    fn into_frame(self) -> Cow<'static, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl IntoFrame for &str {
    fn into_frame(self) -> Cow<'static, [u8]> {
        Cow::Owned(encode(self))
    }
}

impl IntoFrame for &String {
    fn into_frame(self) -> Cow<'static, [u8]> {
        Cow::Owned(encode(self))
    }
}

impl IntoFrame for String {
    fn into_frame(self) -> Cow<'static, [u8]> {
        Cow::Owned(encode(&self))
    }
}
