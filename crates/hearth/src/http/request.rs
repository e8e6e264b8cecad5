use std::collections::HashMap;
use std::str::FromStr;

use crate::error::{ParamError, Result};
use crate::http::{parse, Headers, Method, Version};

const CRLF: &str = "\r\n";

/// A parsed HTTP/1.1 request. `uri` is retained exactly as received (no
/// percent-decoding); `path_params` is populated by the route tree during
/// dispatch, not by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: Method,
    uri: String,
    version: Version,
    headers: Headers,
    body: Vec<u8>,
    path_params: HashMap<String, String>,
}

impl Request {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            version: Version::Http11,
            headers: Headers::new(),
            body: Vec::new(),
            path_params: HashMap::new(),
        }
    }

    /// Parses a complete request message from a contiguous byte slice. The
    /// parser does not consult `Content-Length` — whatever trails the
    /// headers in `bytes` becomes the body.
    pub fn parse(bytes: &[u8]) -> Result<Request> {
        let mut offset = 0;

        let method = parse::method(bytes, &mut offset)?;
        let uri = parse::uri(bytes, &mut offset)?;
        let uri = String::from_utf8_lossy(uri).into_owned();
        let version = parse::version(bytes, &mut offset)?;
        let headers = parse::headers(bytes, &mut offset)?;
        let body = parse::body(bytes, offset);

        Ok(Request {
            method,
            uri,
            version,
            headers,
            body,
            path_params: HashMap::new(),
        })
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    pub fn set_body(&mut self, body: impl Into<Vec<u8>>) {
        self.body = body.into();
    }

    /// Binds a path parameter captured by the route tree during dispatch.
    /// Not part of the wire format — these never round-trip through
    /// `to_string`/`parse`.
    pub fn bind_path_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.path_params.insert(name.into(), value.into());
    }

    /// Reads back the raw (unparsed) string bound to a path parameter.
    pub fn path_param_str(&self, name: &str) -> std::result::Result<&str, ParamError> {
        self.path_params
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| ParamError::NotFound(name.to_string()))
    }

    /// Reads a path parameter and parses it into `T`. Distinguishes a
    /// missing binding from one that failed to parse, per the crate's
    /// error taxonomy.
    pub fn get_path_param<T>(&self, name: &str) -> std::result::Result<T, ParamError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = self.path_param_str(name)?;
        raw.parse::<T>().map_err(|e| ParamError::Invalid {
            name: name.to_string(),
            value: raw.to_string(),
            message: e.to_string(),
        })
    }

    /// Serializes the request back to its wire representation:
    /// `METHOD URI HTTP/1.1\r\n`, headers, a terminating CRLF, then the body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(64 + self.body.len());
        out.extend_from_slice(self.method.as_str().as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.uri.as_bytes());
        out.push(b' ');
        out.extend_from_slice(self.version.as_str().as_bytes());
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
    fn parses_hello_root_request() {
        let raw = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.method(), Method::Get);
        assert_eq!(req.uri(), "/");
        assert_eq!(req.header("Host"), Some("x"));
        assert!(req.body().is_empty());
    }

    #[test]
    fn parses_request_with_body() {
        let raw = b"POST /world HTTP/1.1\r\nHost: x\r\nContent-Length: 0\r\n\r\n";
        let req = Request::parse(raw).unwrap();
        assert_eq!(req.method(), Method::Post);
        assert_eq!(req.uri(), "/world");
    }

    #[test]
    fn rejects_unknown_method() {
        let raw = b"NOTAMETHOD / HTTP/1.1\r\n\r\n";
        assert!(Request::parse(raw).is_err());
    }

    #[test]
    fn path_param_not_found_vs_invalid() {
        let mut req = Request::new(Method::Get, "/users/abc");
        req.bind_path_param("id", "abc");

        assert_eq!(
            req.get_path_param::<u32>("missing"),
            Err(ParamError::NotFound("missing".to_string()))
        );

        match req.get_path_param::<u32>("id") {
            Err(ParamError::Invalid { name, value, .. }) => {
                assert_eq!(name, "id");
                assert_eq!(value, "abc");
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn serialize_then_parse_round_trips() {
        let mut req = Request::new(Method::Post, "/world");
        req.set_header("Host", "x");
        req.set_body(b"hi".to_vec());
        req.set_header("Content-Length", "2");

        let bytes = req.to_bytes();
        let parsed = Request::parse(&bytes).unwrap();
        assert_eq!(parsed.method(), req.method());
        assert_eq!(parsed.uri(), req.uri());
        assert_eq!(parsed.body(), req.body());
        assert_eq!(parsed.header("Host"), req.header("Host"));
    }
}
