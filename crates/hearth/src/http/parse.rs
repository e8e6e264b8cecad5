//! Byte-slice scanner for HTTP/1.1 request messages.
//!
//! This mirrors the original implementation's `find_method`/`find_uri`/
//! `find_version`/`find_header`/`find_body` scan functions, each advancing
//! an `offset` cursor through the input and failing with a phase-tagged
//! error rather than a generic parse failure. The scanner never honors
//! `Content-Length` to decide where the body ends — whatever remains in the
//! slice after the headers *is* the body (see `DESIGN.md`, Open Question 1).

use crate::error::{Error, ParsePhase, Result};
use crate::http::{Headers, Method, Version};

const CRLF: &[u8] = b"\r\n";

fn err(phase: ParsePhase) -> Error {
    Error::Parse { phase }
}

/// Longest-prefix match against the recognized method tokens, advancing
/// `offset` past the matched token and the single separating space.
pub(crate) fn method(bytes: &[u8], offset: &mut usize) -> Result<Method> {
    let rest = &bytes[*offset..];
    let matched = Method::ALL
        .into_iter()
        .find(|m| rest.starts_with(m.as_str().as_bytes()))
        .ok_or_else(|| err(ParsePhase::Method))?;

    *offset += matched.as_str().len();

    if bytes.get(*offset) != Some(&b' ') {
        return Err(err(ParsePhase::Method));
    }
    *offset += 1;

    Ok(matched)
}

/// URI must start with `/` and runs until the next space. No validation of
/// the byte set and no percent-decoding — the URI is retained exactly as
/// received for downstream routing.
pub(crate) fn uri<'a>(bytes: &'a [u8], offset: &mut usize) -> Result<&'a [u8]> {
    if bytes.get(*offset) != Some(&b'/') {
        return Err(err(ParsePhase::Uri));
    }

    let start = *offset;
    let end = bytes[start..]
        .iter()
        .position(|&b| b == b' ')
        .map(|p| start + p)
        .ok_or_else(|| err(ParsePhase::Uri))?;

    *offset = end + 1;
    Ok(&bytes[start..end])
}

/// Version must match `HTTP/1.1` verbatim, followed immediately by CRLF.
pub(crate) fn version(bytes: &[u8], offset: &mut usize) -> Result<Version> {
    let token = Version::Http11.as_str().as_bytes();
    if !bytes[*offset..].starts_with(token) {
        return Err(err(ParsePhase::Version));
    }
    *offset += token.len();

    if !bytes[*offset..].starts_with(CRLF) {
        return Err(err(ParsePhase::Version));
    }
    *offset += CRLF.len();

    Ok(Version::Http11)
}

/// Scans a single `Name: Value\r\n` header line starting at `offset`.
/// Returns `None` once the terminating empty `\r\n` line is reached
/// (consuming it). Exactly one colon separates name from value; the single
/// byte right after it is discarded as the separating space.
fn header<'a>(bytes: &'a [u8], offset: &mut usize) -> Result<Option<(&'a [u8], &'a [u8])>> {
    let line_start = *offset;
    let line_end = bytes[line_start..]
        .windows(CRLF.len())
        .position(|w| w == CRLF)
        .map(|p| line_start + p)
        .ok_or_else(|| err(ParsePhase::Headers))?;

    if line_end == line_start {
        *offset = line_end + CRLF.len();
        return Ok(None);
    }

    let colon = bytes[line_start..line_end]
        .iter()
        .position(|&b| b == b':')
        .map(|p| line_start + p)
        .ok_or_else(|| err(ParsePhase::Headers))?;

    // The byte right after the colon is the single separating space; the
    // value starts one byte past that.
    let value_start = colon + 2;
    if value_start > line_end {
        return Err(err(ParsePhase::Headers));
    }

    let name = &bytes[line_start..colon];
    let value = &bytes[value_start..line_end];
    *offset = line_end + CRLF.len();

    Ok(Some((name, value)))
}

/// Scans all header lines up to and including the terminating empty line.
pub(crate) fn headers(bytes: &[u8], offset: &mut usize) -> Result<Headers> {
    let mut result = Headers::new();

    while let Some((name, value)) = header(bytes, offset)? {
        let name = std::str::from_utf8(name).map_err(|_| err(ParsePhase::Headers))?;
        let value = std::str::from_utf8(value).map_err(|_| err(ParsePhase::Headers))?;
        result.set(name, value);
    }

    Ok(result)
}

/// Everything remaining after the headers forms the body, verbatim.
pub(crate) fn body(bytes: &[u8], offset: usize) -> Vec<u8> {
    if offset >= bytes.len() {
        Vec::new()
    } else {
        bytes[offset..].to_vec()
    }
}
