/// Response status code. The set is small and extensible — callers may use
/// any `u16` via [`Status::Other`] but the canonical reason phrase is only
/// known for the recognized codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    InternalServerError,
    Other(u16),
}

impl Status {
    pub const ALL_KNOWN: [Status; 5] = [
        Status::Ok,
        Status::BadRequest,
        Status::NotFound,
        Status::MethodNotAllowed,
        Status::InternalServerError,
    ];

    pub const fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::MethodNotAllowed => 405,
            Status::InternalServerError => 500,
            Status::Other(code) => code,
        }
    }

    pub const fn reason(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::BadRequest => "Bad Request",
            Status::NotFound => "Not Found",
            Status::MethodNotAllowed => "Method Not Allowed",
            Status::InternalServerError => "Internal Server Error",
            Status::Other(_) => "Unknown",
        }
    }

    pub const fn from_code(code: u16) -> Status {
        match code {
            200 => Status::Ok,
            400 => Status::BadRequest,
            404 => Status::NotFound,
            405 => Status::MethodNotAllowed,
            500 => Status::InternalServerError,
            other => Status::Other(other),
        }
    }
}

impl From<u16> for Status {
    fn from(code: u16) -> Self {
        Status::from_code(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_statuses_round_trip_through_code() {
        for status in Status::ALL_KNOWN {
            assert_eq!(Status::from_code(status.code()), status);
        }
    }

    #[test]
    fn unknown_code_keeps_its_number_but_has_no_reason() {
        let status = Status::from_code(418);
        assert_eq!(status.code(), 418);
        assert_eq!(status.reason(), "Unknown");
    }
}
