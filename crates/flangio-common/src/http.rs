//! Status codes an envelope can carry.

/// HTTP status of an envelope; the number is also written to `code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpStatus(pub u16);

impl HttpStatus {
    pub const OK: Self = Self(200);
    pub const SEE_OTHER: Self = Self(303);
    pub const BAD_REQUEST: Self = Self(400);
    pub const UNAUTHORIZED: Self = Self(401);
    pub const FORBIDDEN: Self = Self(403);
    pub const NOT_FOUND: Self = Self(404);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);
    /// Store did not answer in time
    pub const SERVICE_UNAVAILABLE: Self = Self(503);

    pub fn code(self) -> u16 {
        self.0
    }

    /// 2xx
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }

    /// The caller's fault (4xx) rather than the store's (5xx)
    pub fn is_client_error(self) -> bool {
        (400..500).contains(&self.0)
    }
}
