//! Parsing of `/proc/<pid>/maps` lines.
//!
//! Each line has the fixed layout
//!
//! ```text
//! 00400000-00452000 r-xp 00000000 08:02 173521      /usr/bin/dbus-daemon
//! ```
//!
//! Every field is kept verbatim as text. A line that breaks the layout in any
//! mandatory field is rejected on its own; the rest of the map still parses.

use std::fmt;

use thiserror::Error;
use tracing::{debug, warn};

const ADDRESS_MAX_DIGITS: usize = 16;
const PERMISSIONS_LEN: usize = 4;
const OFFSET_MAX_DIGITS: usize = 8;
const DEVICE_PART_DIGITS: usize = 2;
const INODE_MAX_DIGITS: usize = 9;

/// One mapped region, as described by a single maps line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRegion {
    address_range: String,
    start: u64,
    end: u64,
    permissions: String,
    offset: String,
    device_id: String,
    inode: String,
    pathname: Option<String>,
}

impl MemoryRegion {
    /// The `start-end` pair exactly as it appeared in the line.
    pub fn address_range(&self) -> &str {
        &self.address_range
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    /// Length of the range in bytes. Ranges with `end < start` are not
    /// rejected by the parser, so this saturates at zero.
    pub fn size(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }

    pub fn permissions(&self) -> &str {
        &self.permissions
    }

    pub fn offset(&self) -> &str {
        &self.offset
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn inode(&self) -> &str {
        &self.inode
    }

    /// Backing file or pseudo-path tag such as `[heap]`. `None` for
    /// anonymous mappings.
    pub fn pathname(&self) -> Option<&str> {
        self.pathname.as_deref()
    }
}

impl fmt::Display for MemoryRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.address_range, self.permissions, self.offset, self.device_id, self.inode
        )?;
        if let Some(pathname) = &self.pathname {
            write!(f, " {pathname}")?;
        }
        Ok(())
    }
}

/// The first mandatory field a rejected line got wrong (or was missing).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("malformed address range")]
    AddressRange,

    #[error("permissions must be exactly 4 characters")]
    Permissions,

    #[error("malformed offset")]
    Offset,

    #[error("malformed device id")]
    DeviceId,

    #[error("malformed inode")]
    Inode,
}

/// A maps line that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line_number}: {kind}: {line:?}")]
pub struct ParseFailure {
    /// 1-based position of the line in its input.
    pub line_number: usize,
    pub line: String,
    pub kind: ParseErrorKind,
}

/// Result of parsing a whole map: good regions and rejected lines, both in
/// input order.
#[derive(Debug, Default, Clone)]
pub struct ParsedMaps {
    pub regions: Vec<MemoryRegion>,
    pub failures: Vec<ParseFailure>,
}

/// Parses a single maps line.
pub fn parse_line(line: &str) -> Result<MemoryRegion, ParseErrorKind> {
    let mut rest = line.trim_end_matches(['\n', '\r']);

    let address_range = next_field(&mut rest).ok_or(ParseErrorKind::AddressRange)?;
    let (start, end) = parse_address_range(address_range).ok_or(ParseErrorKind::AddressRange)?;

    let permissions = next_field(&mut rest)
        .filter(|p| p.chars().count() == PERMISSIONS_LEN)
        .ok_or(ParseErrorKind::Permissions)?;

    let offset = next_field(&mut rest)
        .filter(|o| is_hex(o, OFFSET_MAX_DIGITS))
        .ok_or(ParseErrorKind::Offset)?;

    let device_id = next_field(&mut rest)
        .filter(|d| is_device_id(d))
        .ok_or(ParseErrorKind::DeviceId)?;

    let inode = next_field(&mut rest)
        .filter(|i| is_decimal(i, INODE_MAX_DIGITS))
        .ok_or(ParseErrorKind::Inode)?;

    let pathname = rest.trim_start();
    let pathname = (!pathname.is_empty()).then(|| pathname.to_string());

    Ok(MemoryRegion {
        address_range: address_range.to_string(),
        start,
        end,
        permissions: permissions.to_string(),
        offset: offset.to_string(),
        device_id: device_id.to_string(),
        inode: inode.to_string(),
        pathname,
    })
}

/// Parses every line, keeping the good ones and recording the rest.
///
/// Rejected lines are logged at `warn` and never stop the pass.
pub fn parse_lines<I, S>(lines: I) -> ParsedMaps
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedMaps::default();

    for (idx, line) in lines.into_iter().enumerate() {
        let line = line.as_ref();
        match parse_line(line) {
            Ok(region) => parsed.regions.push(region),
            Err(kind) => {
                let failure = ParseFailure {
                    line_number: idx + 1,
                    line: line.trim_end().to_string(),
                    kind,
                };
                warn!("No match for {}", failure);
                parsed.failures.push(failure);
            }
        }
    }

    debug!(
        "Parsed {} regions, {} unparseable lines",
        parsed.regions.len(),
        parsed.failures.len()
    );
    parsed
}

/// Parses the full text of a maps file.
pub fn parse_maps(text: &str) -> ParsedMaps {
    parse_lines(text.lines())
}

/// Pops the next whitespace-delimited field off `rest`.
fn next_field<'a>(rest: &mut &'a str) -> Option<&'a str> {
    let s = rest.trim_start();
    if s.is_empty() {
        return None;
    }
    let end = s.find(char::is_whitespace).unwrap_or(s.len());
    let (field, tail) = s.split_at(end);
    *rest = tail;
    Some(field)
}

fn parse_address_range(field: &str) -> Option<(u64, u64)> {
    let (start, end) = field.split_once('-')?;
    if !is_hex(start, ADDRESS_MAX_DIGITS) || !is_hex(end, ADDRESS_MAX_DIGITS) {
        return None;
    }
    let start = u64::from_str_radix(start, 16).ok()?;
    let end = u64::from_str_radix(end, 16).ok()?;
    Some((start, end))
}

fn is_device_id(field: &str) -> bool {
    match field.split_once(':') {
        Some((major, minor)) => {
            is_exact_decimal(major, DEVICE_PART_DIGITS) && is_exact_decimal(minor, DEVICE_PART_DIGITS)
        }
        None => false,
    }
}

fn is_hex(s: &str, max_digits: usize) -> bool {
    (1..=max_digits).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_hexdigit())
}

fn is_decimal(s: &str, max_digits: usize) -> bool {
    (1..=max_digits).contains(&s.len()) && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_exact_decimal(s: &str, digits: usize) -> bool {
    s.len() == digits && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_executable_line() {
        let region =
            parse_line("00400000-00452000 r-xp 00000000 08:02 173521 /usr/bin/dbus-daemon").unwrap();
        assert_eq!(region.address_range(), "00400000-00452000");
        assert_eq!(region.permissions(), "r-xp");
        assert_eq!(region.offset(), "00000000");
        assert_eq!(region.device_id(), "08:02");
        assert_eq!(region.inode(), "173521");
        assert_eq!(region.pathname(), Some("/usr/bin/dbus-daemon"));
        assert_eq!(region.start(), 0x0040_0000);
        assert_eq!(region.end(), 0x0045_2000);
        assert_eq!(region.size(), 0x52000);
    }

    #[test]
    fn test_parse_kernel_padding_before_pathname() {
        // The kernel pads the inode column before the pathname.
        let region = parse_line(
            "7f2a3c000000-7f2a3c021000 r--p 00000000 08:02 5001                       /usr/lib/libc.so.6",
        )
        .unwrap();
        assert_eq!(region.pathname(), Some("/usr/lib/libc.so.6"));
    }

    #[test]
    fn test_parse_anonymous_line() {
        let region = parse_line("7f2a3c021000-7f2a3c025000 rw-p 00000000 00:00 0 ").unwrap();
        assert_eq!(region.inode(), "0");
        assert_eq!(region.pathname(), None);

        let region = parse_line("7f2a3c021000-7f2a3c025000 rw-p 00000000 00:00 0").unwrap();
        assert_eq!(region.pathname(), None);
    }

    #[test]
    fn test_pathname_keeps_inner_spaces() {
        let region =
            parse_line("7f0000000000-7f0000001000 r--p 00000000 08:02 42 /tmp/my file (deleted)\n")
                .unwrap();
        assert_eq!(region.pathname(), Some("/tmp/my file (deleted)"));
    }

    #[test]
    fn test_display_reserializes_with_single_spaces() {
        let line = "ffffffffff600000-ffffffffff601000 --xp 00000000 00:00 0                  [vsyscall]";
        let region = parse_line(line).unwrap();
        assert_eq!(
            region.to_string(),
            "ffffffffff600000-ffffffffff601000 --xp 00000000 00:00 0 [vsyscall]"
        );
        assert_eq!(parse_line(&region.to_string()).unwrap(), region);
    }

    #[test]
    fn test_rejects_each_malformed_field() {
        let cases = [
            ("garbage text", ParseErrorKind::AddressRange),
            ("", ParseErrorKind::AddressRange),
            ("00400000 r-xp 00000000 08:02 1", ParseErrorKind::AddressRange),
            ("0040000g-00452000 r-xp 00000000 08:02 1", ParseErrorKind::AddressRange),
            ("00000000000000000-1 r-xp 00000000 08:02 1", ParseErrorKind::AddressRange),
            ("00400000-00452000 r-x 00000000 08:02 1", ParseErrorKind::Permissions),
            ("00400000-00452000 r-xp", ParseErrorKind::Offset),
            ("00400000-00452000 r-xp 000000000 08:02 1", ParseErrorKind::Offset),
            ("00400000-00452000 r-xp 0000zz00 08:02 1", ParseErrorKind::Offset),
            ("00400000-00452000 r-xp 00000000 8:02 1", ParseErrorKind::DeviceId),
            ("00400000-00452000 r-xp 00000000 0802 1", ParseErrorKind::DeviceId),
            ("00400000-00452000 r-xp 00000000 08:02", ParseErrorKind::Inode),
            ("00400000-00452000 r-xp 00000000 08:02 1234567890", ParseErrorKind::Inode),
            ("00400000-00452000 r-xp 00000000 08:02 12a4", ParseErrorKind::Inode),
        ];
        for (line, kind) in cases {
            assert_eq!(parse_line(line), Err(kind), "line: {line:?}");
        }
    }

    #[test]
    fn test_parse_lines_skips_bad_lines_and_reports_them() {
        let text = "\
00400000-00452000 r-xp 00000000 08:02 173521 /usr/bin/dbus-daemon
garbage text
7ffee0000000-7ffee0021000 rw-p 00000000 00:00 0 [heap]";

        let parsed = parse_maps(text);
        assert_eq!(parsed.regions.len(), 2);
        assert_eq!(parsed.failures.len(), 1);

        let failure = &parsed.failures[0];
        assert_eq!(failure.line_number, 2);
        assert_eq!(failure.line, "garbage text");
        assert_eq!(failure.kind, ParseErrorKind::AddressRange);
        assert!(failure.to_string().starts_with("line 2:"));
    }

    #[test]
    fn test_parse_empty_input() {
        let parsed = parse_maps("");
        assert!(parsed.regions.is_empty());
        assert!(parsed.failures.is_empty());
    }
}
