use crate::error::Result;
use crate::http::{parse, Headers, Status, Version};

const CRLF: &str = "\r\n";
const CONTENT_LENGTH: &str = "Content-Length";

/// A response message. The `Content-Length` header is kept in sync with the
/// body by [`Response::set_body`]: setting a non-empty body sets/updates the
/// header, setting an empty body removes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    version: Version,
    status: Status,
    headers: Headers,
    body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            version: Version::Http11,
            status: Status::Ok,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = status;
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Sets the body. A non-empty body sets `Content-Length` to its length;
    /// an empty body removes the header entirely.
    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        let body = body.into();
        if body.is_empty() {
            self.headers.remove(CONTENT_LENGTH);
        } else {
            self.headers.set(CONTENT_LENGTH, body.len().to_string());
        }
        self.body = body;
    }

    /// Parses a complete response message from a contiguous byte slice.
    /// The status line (`HTTP/1.1 CODE REASON\r\n`) differs from a request
    /// line enough — a status code and free-form reason phrase rather than
    /// a URI — that it gets its own small scan rather than reusing
    /// `parse::version`, which only validates the request-line token.
    pub fn parse(bytes: &[u8]) -> Result<Response> {
        use crate::error::{Error, ParsePhase};

        let token = Version::Http11.as_str().as_bytes();
        if !bytes.starts_with(token) {
            return Err(Error::Parse {
                phase: ParsePhase::Version,
            });
        }
        let mut offset = token.len();

        if bytes.get(offset) != Some(&b' ') {
            return Err(Error::Parse {
                phase: ParsePhase::Version,
            });
        }
        offset += 1;

        let code_start = offset;
        let code_end = bytes[code_start..]
            .iter()
            .position(|&b| b == b' ')
            .map(|p| code_start + p)
            .ok_or(Error::Parse {
                phase: ParsePhase::Version,
            })?;
        let code_str = std::str::from_utf8(&bytes[code_start..code_end]).map_err(|_| {
            Error::Parse {
                phase: ParsePhase::Version,
            }
        })?;
        let code: u16 = code_str.parse().map_err(|_| Error::Parse {
            phase: ParsePhase::Version,
        })?;
        offset = code_end + 1;

        let line_end = bytes[offset..]
            .windows(2)
            .position(|w| w == b"\r\n")
            .map(|p| offset + p)
            .ok_or(Error::Parse {
                phase: ParsePhase::Version,
            })?;
        // Reason phrase runs from `offset` to `line_end`; its contents are
        // not validated, only its presence.
        offset = line_end + 2;

        let headers = parse::headers(bytes, &mut offset)?;
        let body = parse::body(bytes, offset);

        let mut response = Response {
            version: Version::Http11,
            status: Status::from_code(code),
            headers,
            body: Vec::new(),
        };
        response.body = body;
        Ok(response)
    }

    /// Serializes the response: `HTTP/1.1 CODE REASON\r\n`, headers, a
    /// terminating CRLF, then the body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.body.len());
        out.extend_from_slice(self.version.as_str().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.status.code().to_string().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.status.reason().as_bytes());
        out.extend_from_slice(CRLF.as_bytes());

        for (name, value) in self.headers.iter() {
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(b": ");
            out.extend_from_slice(value.as_bytes());
            out.extend_from_slice(CRLF.as_bytes());
        }

        out.extend_from_slice(CRLF.as_bytes());
        out.extend_from_slice(&self.body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_nonempty_body_sets_content_length() {
        let mut response = Response::new();
        response.set_body(b"Hello, world!".to_vec());
        assert_eq!(response.header("Content-Length"), Some("13"));
    }

    #[test]
    fn setting_empty_body_removes_content_length() {
        let mut response = Response::new();
        response.set_body(b"data".to_vec());
        response.set_body(Vec::new());
        assert_eq!(response.header("Content-Length"), None);
    }

    #[test]
    fn hello_root_serializes_per_scenario_1() {
        let mut response = Response::new();
        response.set_header("Connection", "close");
        response.set_body(b"Hello, world!".to_vec());

        let bytes = response.to_bytes();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(text.contains("Connection: close\r\n"));
        assert!(text.contains("Content-Length: 13\r\n"));
        assert!(text.ends_with("\r\n\r\nHello, world!"));
    }

    #[test]
    fn serialize_then_parse_round_trips() {
        let mut response = Response::new();
        response.set_status(Status::NotFound);
        response.set_header("Connection", "close");
        response.set_body(b"404 Not found".to_vec());

        let bytes = response.to_bytes();
        let parsed = Response::parse(&bytes).unwrap();
        assert_eq!(parsed.status(), Status::NotFound);
        assert_eq!(parsed.body(), response.body());
        assert_eq!(parsed.header("Connection"), Some("close"));
    }
}
