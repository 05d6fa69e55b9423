use nom::bytes::complete::{tag, take_till, take_until};
use nom::combinator::rest;
use nom::error::Error;
use nom::sequence::{preceded, terminated};
use nom::IResult;

use crate::command::TERMINATOR;
use crate::types::{CapabilityList, ParsedStatus};

type Buf = str;

/// Extract the status word and parameter from a reply following the
/// `STATUS+SOMETHING:PARAM` convention.
///
/// Both fields are best effort. A missing `+` leaves the status absent, a
/// missing `:` leaves the parameter absent.
///
/// ```
/// let parsed = at_proto::parse_status("OK+Get:0\r\n");
/// assert_eq!(parsed.status(), Some("OK"));
/// assert_eq!(parsed.parameter(), Some("0"));
/// ```
pub fn parse_status(reply: &str) -> ParsedStatus {
    let status = status(reply).ok().map(|(_, status)| status.to_owned());
    let parameter = parameter(reply).ok().map(|(_, param)| {
        param
            .strip_suffix(TERMINATOR)
            .unwrap_or(param)
            .to_owned()
    });
    ParsedStatus::new(status, parameter)
}

/// Extract the command tokens listed in a help dump, in order of appearance.
///
/// ```
/// let caps = at_proto::parse_capabilities("AT\r\nAT+NAME\r\nAT+PIN set\r\n");
/// assert_eq!(&caps[..], ["AT", "AT+NAME", "AT+PIN"]);
/// ```
pub fn parse_capabilities(reply: &str) -> CapabilityList {
    reply
        .split('\n')
        .filter_map(|line| capability(line).ok().map(|(_, token)| token.to_owned()))
        .collect()
}

/// Everything before the first `+`.
fn status(buf: &Buf) -> IResult<&Buf, &Buf> {
    terminated(take_until("+"), tag("+"))(buf)
}

/// Everything after the first `:`.
fn parameter(buf: &Buf) -> IResult<&Buf, &Buf> {
    preceded(terminated(take_until(":"), tag(":")), rest)(buf)
}

/// The command token of a help line: from the first `AT`, with the line's
/// last character dropped, up to the first space.
///
/// The last character is dropped unconditionally since the device ends its
/// lines with `\r`. On a line without one, the token loses a real character.
fn capability(line: &Buf) -> IResult<&Buf, &Buf> {
    let (from_at, _) = take_until::<_, _, Error<&Buf>>("AT")(line)?;
    let end = from_at.char_indices().last().map_or(0, |(pos, _)| pos);
    take_till(|c: char| c == ' ')(&from_at[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status() {
        assert_eq!(status("OK+Get:1"), Ok(("Get:1", "OK")));
        assert_eq!(status("+Get"), Ok(("Get", "")));
        assert!(status("OK\r\n").is_err());
    }

    #[test]
    fn test_parameter() {
        assert_eq!(parameter("OK+Get:1\r\n"), Ok(("", "1\r\n")));
        assert_eq!(parameter("a:b:c"), Ok(("", "b:c")));
        assert!(parameter("OK").is_err());
    }

    #[test]
    fn test_parse_status() {
        let parsed = parse_status("OK+SOME:VALUE\r\n");
        assert_eq!(parsed.status(), Some("OK"));
        assert_eq!(parsed.parameter(), Some("VALUE"));

        let parsed = parse_status("OK\r\n");
        assert_eq!(parsed.status(), None);
        assert_eq!(parsed.parameter(), None);

        let parsed = parse_status("");
        assert_eq!(parsed, ParsedStatus::default());
    }

    #[test]
    fn test_parse_status_fields_are_independent() {
        let parsed = parse_status("OK+Set");
        assert_eq!(parsed.status(), Some("OK"));
        assert_eq!(parsed.parameter(), None);

        let parsed = parse_status("Mode:1\r\n");
        assert_eq!(parsed.status(), None);
        assert_eq!(parsed.parameter(), Some("1"));
    }

    #[test]
    fn test_parse_status_strips_only_trailing_terminator() {
        let parsed = parse_status("OK+Get:0\r\nOK+Get:1\r\n");
        assert_eq!(parsed.parameter(), Some("0\r\nOK+Get:1"));
        let parsed = parse_status("OK+Get:0\n");
        assert_eq!(parsed.parameter(), Some("0\n"));
    }

    #[test]
    fn test_capability_line() {
        assert_eq!(capability("AT+NAME\r"), Ok(("", "AT+NAME")));
        assert_eq!(capability("  AT+PIN set pin\r"), Ok((" set pin", "AT+PIN")));
        assert_eq!(capability("* AT+ROLE\r"), Ok(("", "AT+ROLE")));
        // no carriage return, last character is lost
        assert_eq!(capability("AT+NAME"), Ok(("", "AT+NAM")));
        assert!(capability("OK\r").is_err());
    }

    #[test]
    fn test_parse_capabilities() {
        let caps = parse_capabilities("AT\r\nAT+NAME\r\nAT+PIN set\r\n");
        assert_eq!(&caps[..], ["AT", "AT+NAME", "AT+PIN"]);
    }

    #[test]
    fn test_parse_capabilities_skips_other_lines() {
        let reply = "********\r\nCommand  Description\r\nAT+ROLE  get role\r\nOK\r\n\r\nAT+ROLE  set role\r\n";
        let caps = parse_capabilities(reply);
        assert_eq!(&caps[..], ["AT+ROLE", "AT+ROLE"]);
        assert!(parse_capabilities("").is_empty());
        assert!(parse_capabilities("OK\r\n").is_empty());
    }
}
