/// One of the nine methods the codec recognizes. Matching is a longest-prefix
/// scan against these tokens, in the order listed here (see
/// [`crate::http::parse::method`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Connect,
    Options,
    Trace,
    Patch,
}

/// Total number of recognized methods. Route nodes size their per-method
/// handler-slot array to this.
pub const METHOD_COUNT: usize = 9;

impl Method {
    /// All recognized methods, longest tokens first where a prefix
    /// relationship would otherwise be ambiguous (none of these tokens are
    /// prefixes of one another, but the order also fixes iteration order
    /// for `find_*`-style scans).
    pub const ALL: [Method; METHOD_COUNT] = [
        Method::Get,
        Method::Head,
        Method::Post,
        Method::Put,
        Method::Delete,
        Method::Connect,
        Method::Options,
        Method::Trace,
        Method::Patch,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Connect => "CONNECT",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Patch => "PATCH",
        }
    }

    /// Index into the fixed-size handler-slot array carried by every route
    /// node.
    pub const fn slot(self) -> usize {
        match self {
            Method::Get => 0,
            Method::Head => 1,
            Method::Post => 2,
            Method::Put => 3,
            Method::Delete => 4,
            Method::Connect => 5,
            Method::Options => 6,
            Method::Trace => 7,
            Method::Patch => 8,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_are_unique_and_in_range() {
        let mut seen = [false; METHOD_COUNT];
        for m in Method::ALL {
            let slot = m.slot();
            assert!(slot < METHOD_COUNT);
            assert!(!seen[slot], "duplicate slot for {m}");
            seen[slot] = true;
        }
        assert!(seen.iter().all(|&x| x));
    }

    #[test]
    fn as_str_round_trips_through_all() {
        for m in Method::ALL {
            assert_eq!(m.as_str().len() > 0, true);
        }
    }
}
