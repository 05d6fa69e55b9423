//! This module defines the data extracted from the device: raw replies,
//! status/parameter pairs and the list of supported commands.

use core::iter::FromIterator;
use core::ops::Deref;
use std::fmt;

use crate::nom_parser;

/// The text received in response to one command.
///
/// All lines read before the channel ran dry, concatenated in arrival order.
/// Bytes which aren't valid UTF-8 are replaced with `U+FFFD`. An empty reply
/// means the device didn't answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply(String);

impl Reply {
    /// A reply with no data, as produced by a silent device.
    pub const fn empty() -> Self {
        Self(String::new())
    }

    pub(crate) fn from_lossy(data: &[u8]) -> Self {
        Self(String::from_utf8_lossy(data).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Split the reply into status and parameter, see [`crate::parse_status`].
    pub fn parse_status(&self) -> ParsedStatus {
        nom_parser::parse_status(&self.0)
    }

    /// Read the reply as a help dump, see [`crate::parse_capabilities`].
    pub fn capabilities(&self) -> CapabilityList {
        nom_parser::parse_capabilities(&self.0)
    }
}

impl Deref for Reply {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl From<Reply> for String {
    fn from(reply: Reply) -> Self {
        reply.0
    }
}

impl PartialEq<&str> for Reply {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status word and parameter of a `STATUS+SOMETHING:PARAM` reply.
///
/// Either part is `None` when its delimiter wasn't found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ParsedStatus {
    status: Option<String>,
    parameter: Option<String>,
}

impl ParsedStatus {
    pub fn new(status: Option<String>, parameter: Option<String>) -> Self {
        Self { status, parameter }
    }

    /// The text before the first `+`.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    /// The text after the first `:`, without a trailing `\r\n`.
    pub fn parameter(&self) -> Option<&str> {
        self.parameter.as_deref()
    }

    /// Returns true if neither field could be extracted.
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.parameter.is_none()
    }

    pub fn into_parts(self) -> (Option<String>, Option<String>) {
        (self.status, self.parameter)
    }
}

/// Command tokens reported by the device, such as `AT+NAME`, in the order
/// the device listed them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilityList(Vec<String>);

impl CapabilityList {
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Exact, case sensitive membership test.
    ///
    /// Always false for an empty list, so the help command has to be issued
    /// before the answer means anything.
    pub fn is_supported(&self, opcode: &str) -> bool {
        self.0.iter().any(|token| token == opcode)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl Deref for CapabilityList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromIterator<String> for CapabilityList {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a CapabilityList {
    type Item = &'a String;
    type IntoIter = core::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<Vec<String>> for CapabilityList {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl fmt::Display for CapabilityList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for token in &self.0 {
            writeln!(f, "{}", token)?;
        }
        Ok(())
    }
}
