//! Character sanitization for wire-format fields.
//!
//! Two policies apply to the fields of the Wavefront line formats:
//!
//! - **identifiers** (metric names, tag keys) are restricted to a small ASCII alphabet, and any byte outside of it is
//!   replaced with `-`
//! - **values** (sources, tag values) may contain anything, but are trimmed, have quotes and newlines escaped, and are
//!   wrapped in double quotes
//!
//! Event lines use a third, stricter quoting scheme (see [`quote`]).
//!
//! Sanitization never fails: characters that cannot be represented are replaced or escaped, never rejected.

use std::{fmt::Write as _, sync::OnceLock};

use memchr::memchr2_iter;
use regex::Regex;

use crate::buf::LineBuilder;

/// Leading marker for delta metrics: `∆` (U+2206, INCREMENT).
pub const DELTA_PREFIX: &str = "\u{2206}";

/// Alternative leading marker for delta metrics: `Δ` (U+0394, GREEK CAPITAL LETTER DELTA).
pub const ALT_DELTA_PREFIX: &str = "\u{0394}";

/// Marker for internal metrics, allowed immediately after any delta marker.
const INTERNAL_PREFIX: u8 = b'~';

/// Returns `true` if the byte is allowed, as-is, in an identifier.
///
/// The range `','..='9'` covers `,`, `-`, `.`, `/`, and the ASCII digits.
const fn is_identifier_byte(b: u8) -> bool {
    matches!(b, b','..=b'9' | b'A'..=b'Z' | b'a'..=b'z' | b'_')
}

const fn sanitize_identifier_byte(b: u8) -> u8 {
    if is_identifier_byte(b) {
        b
    } else {
        b'-'
    }
}

/// Splits an identifier into its preserved head (delta marker and internal marker, if present) and the remainder.
fn split_identifier_head(s: &str) -> (&str, &str) {
    let mut head_len = if s.starts_with(DELTA_PREFIX) {
        DELTA_PREFIX.len()
    } else if s.starts_with(ALT_DELTA_PREFIX) {
        ALT_DELTA_PREFIX.len()
    } else {
        0
    };

    if s.as_bytes().get(head_len) == Some(&INTERNAL_PREFIX) {
        head_len += 1;
    }

    s.split_at(head_len)
}

/// Returns the bytes of `s` with the identifier policy applied.
///
/// A leading delta marker (`∆` or `Δ`) is preserved as-is, followed by an optional `~`. Every remaining byte is kept if
/// it is an ASCII letter, an ASCII digit, or one of `,`, `-`, `.`, `/`, and `_`, and replaced with `-` otherwise. Input
/// is processed byte-wise, so each byte of a multi-byte character becomes a separate `-`.
pub fn sanitized_identifier_bytes(s: &str) -> impl Iterator<Item = u8> + '_ {
    let (head, rest) = split_identifier_head(s);
    head.bytes().chain(rest.bytes().map(sanitize_identifier_byte))
}

/// Applies the identifier policy to `s`, returning the result as a new string.
///
/// See [`sanitized_identifier_bytes`] for the policy.
pub fn sanitize_identifier(s: &str) -> String {
    let (head, rest) = split_identifier_head(s);

    let mut sanitized = String::with_capacity(s.len());
    sanitized.push_str(head);
    sanitized.extend(rest.bytes().map(sanitize_identifier_byte).map(char::from));
    sanitized
}

/// Applies the identifier policy to `s`, writing the result to `buf`.
///
/// See [`sanitized_identifier_bytes`] for the policy.
pub fn write_sanitized_identifier(buf: &mut LineBuilder, s: &str) {
    buf.grow(s.len());
    buf.extend(sanitized_identifier_bytes(s));
}

/// Applies the value policy to `s`, writing the result to `buf`.
///
/// Leading and trailing whitespace is trimmed, every `"` is escaped as `\"`, every newline is escaped as `\n`, and the
/// result is wrapped in double quotes.
pub fn write_sanitized_value(buf: &mut LineBuilder, s: &str) {
    let trimmed = s.trim().as_bytes();

    buf.grow(trimmed.len() + 2);
    buf.write_byte(b'"');

    let mut start = 0;
    for pos in memchr2_iter(b'"', b'\n', trimmed) {
        buf.write_bytes(&trimmed[start..pos]);
        buf.write_bytes(if trimmed[pos] == b'"' { b"\\\"" } else { b"\\n" });
        start = pos + 1;
    }
    buf.write_bytes(&trimmed[start..]);

    buf.write_byte(b'"');
}

/// Applies the value policy to `s`, returning the result as a new string.
///
/// See [`write_sanitized_value`] for the policy.
pub fn sanitize_value(s: &str) -> String {
    let mut buf = LineBuilder::with_capacity(s.len() + 2);
    write_sanitized_value(&mut buf, s);
    buf.into_string()
}

/// Writes `s` as a double-quoted string literal to `buf`.
///
/// Quotes and backslashes are escaped with a backslash, common control characters use their short escapes (`\n`,
/// `\t`, and so on), remaining ASCII control characters are written as `\xNN`, and other non-printable characters are
/// written as `\uNNNN` or `\UNNNNNNNN`. Printable characters, including non-ASCII ones, are written as-is.
pub fn write_quoted(buf: &mut LineBuilder, s: &str) {
    buf.grow(s.len() + 2);
    buf.write_byte(b'"');
    write_escaped(buf, s);
    buf.write_byte(b'"');
}

/// Writes `s` to `buf` with the escaping rules of [`write_quoted`], but without the surrounding quotes.
pub(crate) fn write_escaped(buf: &mut LineBuilder, s: &str) {
    let mut start = 0;
    for escaped in needs_escape().find_iter(s) {
        buf.write_string(&s[start..escaped.start()]);
        for c in escaped.as_str().chars() {
            write_escaped_char(buf, c);
        }
        start = escaped.end();
    }
    buf.write_string(&s[start..]);
}

/// Matches every character that cannot be written as-is inside a quoted string literal.
///
/// Printable characters are letters, marks, numbers, punctuation, symbols, and the ASCII space. Everything else
/// (control and format characters, private-use and unassigned code points, and any other kind of space) is escaped,
/// as are quotes and backslashes.
fn needs_escape() -> &'static Regex {
    static NEEDS_ESCAPE: OnceLock<Regex> = OnceLock::new();
    NEEDS_ESCAPE.get_or_init(|| {
        Regex::new(r#"["\\]|[^\p{L}\p{M}\p{N}\p{P}\p{S} ]"#).expect("should not fail to compile escape pattern")
    })
}

fn write_escaped_char(buf: &mut LineBuilder, c: char) {
    if let Some(escaped) = short_escape(c) {
        buf.write_string(escaped);
        return;
    }

    // Writing to a `LineBuilder` never fails.
    let _ = if c < ' ' || c == '\u{7F}' {
        write!(buf, "\\x{:02x}", c as u32)
    } else if (c as u32) < 0x10000 {
        write!(buf, "\\u{:04x}", c as u32)
    } else {
        write!(buf, "\\U{:08x}", c as u32)
    };
}

/// Writes `s` as a double-quoted string literal, returning the result as a new string.
///
/// See [`write_quoted`] for the escaping rules.
pub fn quote(s: &str) -> String {
    let mut buf = LineBuilder::with_capacity(s.len() + 2);
    write_quoted(&mut buf, s);
    buf.into_string()
}

const fn short_escape(c: char) -> Option<&'static str> {
    match c {
        '"' => Some("\\\""),
        '\\' => Some("\\\\"),
        '\u{07}' => Some("\\a"),
        '\u{08}' => Some("\\b"),
        '\u{0C}' => Some("\\f"),
        '\n' => Some("\\n"),
        '\r' => Some("\\r"),
        '\t' => Some("\\t"),
        '\u{0B}' => Some("\\v"),
        _ => None,
    }
}

/// Returns `true` if `s` is a UUID in its canonical, hyphenated form.
///
/// The string must be exactly 36 characters long, with hyphens at positions 8, 13, 18, and 23, and hexadecimal digits
/// (of either case) everywhere else.
pub fn is_uuid_format(s: &str) -> bool {
    s.len() == 36
        && s.bytes().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => b == b'-',
            _ => b.is_ascii_hexdigit(),
        })
}
