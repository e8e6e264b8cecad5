use crate::error::{Error, Result};

/// A validated route path. The original source checks this at compile time
/// via a `consteval` constructor; Rust has no equivalent without a
/// proc-macro crate the teacher doesn't carry, so validation happens at
/// route-registration time instead — failing fast, before `Server::start`,
/// per the registration-errors-are-fatal policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutePath<'a> {
    raw: &'a str,
}

impl<'a> RoutePath<'a> {
    /// Validates `path`: non-empty, starts with `/`, and every byte after
    /// the leading slash is in the permitted set
    /// `A-Z a-z 0-9 - _ . ~ ! $ & ' ( ) * + , ; = : @ /`.
    pub fn new(path: &'a str) -> Result<Self> {
        if !Self::validate(path) {
            return Err(Error::InvalidPath(path.to_string()));
        }
        Ok(Self { raw: path })
    }

    fn validate(path: &str) -> bool {
        if path.is_empty() || !path.starts_with('/') {
            return false;
        }

        path.bytes().skip(1).all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'-' | b'_'
                        | b'.'
                        | b'~'
                        | b'!'
                        | b'$'
                        | b'&'
                        | b'\''
                        | b'('
                        | b')'
                        | b'*'
                        | b'+'
                        | b','
                        | b';'
                        | b'='
                        | b':'
                        | b'@'
                        | b'/'
                )
        })
    }

    pub fn get(&self) -> &'a str {
        self.raw
    }

    /// The `/`-delimited segments between slashes, in order, as borrowed
    /// slices. The root path `/` yields zero parts.
    pub fn parts(&self) -> Vec<&'a str> {
        self.raw
            .split('/')
            .skip(1)
            .filter(|segment| !segment.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_path() {
        assert!(RoutePath::new("").is_err());
    }

    #[test]
    fn rejects_path_without_leading_slash() {
        assert!(RoutePath::new("users").is_err());
    }

    #[test]
    fn rejects_disallowed_byte() {
        assert!(RoutePath::new("/users<id>").is_err());
    }

    #[test]
    fn accepts_path_parameter_segment() {
        let path = RoutePath::new("/users/:id").unwrap();
        assert_eq!(path.parts(), vec!["users", ":id"]);
    }

    #[test]
    fn root_path_has_no_parts() {
        let path = RoutePath::new("/").unwrap();
        assert!(path.parts().is_empty());
    }
}
