//! Parsers for the response head: the status line and the header block.
//! Both are total over arbitrary bytes and signal malformed input with
//! `None`; the transport maps that onto the corresponding [`HttpError`]
//! kind.
//!
//! [`HttpError`]: crate::HttpError

use std::str;

/// A parsed `HTTP/<major>.<minor> <code> [reason]` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub version_major: u32,
    pub version_minor: u32,
    pub code: u16,
    pub reason: String,
}

/// The response headers the transport consumes. `content_length` is
/// `None` when the server advertised no length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    pub content_type: String,
    pub content_length: Option<u64>,
    pub location: String,
}

/// Parse a status line, with or without its trailing CRLF. The reason
/// phrase may be empty.
pub fn parse_status_line(line: &[u8]) -> Option<StatusLine> {
    let line = line.strip_suffix(b"\r\n").unwrap_or(line);
    let line = str::from_utf8(line).ok()?;

    let rest = line.strip_prefix("HTTP/")?;
    let (major, rest) = split_digits(rest)?;
    let rest = rest.strip_prefix('.')?;
    let (minor, rest) = split_digits(rest)?;
    let rest = rest.strip_prefix(' ')?;
    let (code, rest) = split_digits(rest)?;
    let reason = if rest.is_empty() {
        String::new()
    } else {
        rest.strip_prefix(' ')?.to_string()
    };

    Some(StatusLine {
        version_major: major.parse().ok()?,
        version_minor: minor.parse().ok()?,
        code: code.parse().ok()?,
        reason,
    })
}

/// Split a nonempty leading decimal run off `s`.
fn split_digits(s: &str) -> Option<(&str, &str)> {
    let len = s.bytes().take_while(u8::is_ascii_digit).count();
    if len == 0 { None } else { Some(s.split_at(len)) }
}

/// Extract `Content-Type`, `Content-Length` and `Location` from a header
/// block (trailing blank line included). Names match case-insensitively,
/// the last occurrence of a repeated header wins, and values are trimmed
/// of linear whitespace. A `Content-Length` that is not a plain decimal
/// number makes the whole block malformed.
pub fn parse_header_fields(block: &[u8]) -> Option<HeaderFields> {
    let mut storage = [httparse::EMPTY_HEADER; 64];
    let headers = match httparse::parse_headers(block, &mut storage).ok()? {
        httparse::Status::Complete((_, headers)) => headers,
        httparse::Status::Partial => return None,
    };

    let mut fields = HeaderFields::default();
    for header in headers {
        let value = str::from_utf8(header.value).ok()?.trim();
        if header.name.eq_ignore_ascii_case("content-type") {
            fields.content_type = value.to_string();
        } else if header.name.eq_ignore_ascii_case("content-length") {
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            fields.content_length = Some(value.parse().ok()?);
        } else if header.name.eq_ignore_ascii_case("location") {
            fields.location = value.to_string();
        }
    }
    Some(fields)
}
