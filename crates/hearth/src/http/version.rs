/// The only HTTP version this codec recognizes. Anything else fails the
/// version phase of parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Version {
    Http11,
}

impl Version {
    pub const TOKEN: &'static str = "HTTP/1.1";

    pub const fn as_str(self) -> &'static str {
        match self {
            Version::Http11 => Version::TOKEN,
        }
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
