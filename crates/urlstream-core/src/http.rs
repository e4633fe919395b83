use std::error;
use std::fmt;

/// An HTTP-layer error: either a client-side parse failure or a server
/// status other than 200.
///
/// The numeric value is carried verbatim so that statuses outside the
/// well-known set still round-trip; the well-known ones are available as
/// associated constants and get a reason phrase in `Display`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HttpError(u16);

impl HttpError {
    // Client-generated errors.
    pub const MALFORMED_STATUS_LINE: HttpError = HttpError(1);
    pub const MALFORMED_RESPONSE_HEADERS: HttpError = HttpError(2);

    // Server-generated statuses.
    pub const CONTINUE: HttpError = HttpError(100);
    pub const SWITCHING_PROTOCOLS: HttpError = HttpError(101);
    pub const OK: HttpError = HttpError(200);
    pub const CREATED: HttpError = HttpError(201);
    pub const ACCEPTED: HttpError = HttpError(202);
    pub const NON_AUTHORITATIVE_INFORMATION: HttpError = HttpError(203);
    pub const NO_CONTENT: HttpError = HttpError(204);
    pub const RESET_CONTENT: HttpError = HttpError(205);
    pub const PARTIAL_CONTENT: HttpError = HttpError(206);
    pub const MULTIPLE_CHOICES: HttpError = HttpError(300);
    pub const MOVED_PERMANENTLY: HttpError = HttpError(301);
    pub const FOUND: HttpError = HttpError(302);
    pub const SEE_OTHER: HttpError = HttpError(303);
    pub const NOT_MODIFIED: HttpError = HttpError(304);
    pub const USE_PROXY: HttpError = HttpError(305);
    pub const TEMPORARY_REDIRECT: HttpError = HttpError(307);
    pub const BAD_REQUEST: HttpError = HttpError(400);
    pub const UNAUTHORIZED: HttpError = HttpError(401);
    pub const PAYMENT_REQUIRED: HttpError = HttpError(402);
    pub const FORBIDDEN: HttpError = HttpError(403);
    pub const NOT_FOUND: HttpError = HttpError(404);
    pub const METHOD_NOT_ALLOWED: HttpError = HttpError(405);
    pub const NOT_ACCEPTABLE: HttpError = HttpError(406);
    pub const PROXY_AUTHENTICATION_REQUIRED: HttpError = HttpError(407);
    pub const REQUEST_TIMEOUT: HttpError = HttpError(408);
    pub const CONFLICT: HttpError = HttpError(409);
    pub const GONE: HttpError = HttpError(410);
    pub const LENGTH_REQUIRED: HttpError = HttpError(411);
    pub const PRECONDITION_FAILED: HttpError = HttpError(412);
    pub const REQUEST_ENTITY_TOO_LARGE: HttpError = HttpError(413);
    pub const REQUEST_URI_TOO_LARGE: HttpError = HttpError(414);
    pub const UNSUPPORTED_MEDIA_TYPE: HttpError = HttpError(415);
    pub const REQUESTED_RANGE_NOT_SATISFIABLE: HttpError = HttpError(416);
    pub const EXPECTATION_FAILED: HttpError = HttpError(417);
    pub const INTERNAL_SERVER_ERROR: HttpError = HttpError(500);
    pub const NOT_IMPLEMENTED: HttpError = HttpError(501);
    pub const BAD_GATEWAY: HttpError = HttpError(502);
    pub const SERVICE_UNAVAILABLE: HttpError = HttpError(503);
    pub const GATEWAY_TIMEOUT: HttpError = HttpError(504);
    pub const VERSION_NOT_SUPPORTED: HttpError = HttpError(505);

    /// Wrap a wire status code, known or not.
    pub fn from_status(code: u16) -> HttpError {
        HttpError(code)
    }

    /// The numeric value: 1 or 2 for the client-parse errors, the status
    /// code otherwise.
    pub fn code(self) -> u16 {
        self.0
    }

    /// Whether this status drives the dispatcher's redirect loop.
    pub fn is_redirect(self) -> bool {
        self == HttpError::MOVED_PERMANENTLY || self == HttpError::FOUND
    }

    /// Reason phrase for the well-known codes.
    pub fn reason(self) -> &'static str {
        match self.0 {
            1 => "malformed status line",
            2 => "malformed response headers",
            100 => "continue",
            101 => "switching protocols",
            200 => "OK",
            201 => "created",
            202 => "accepted",
            203 => "non-authoritative information",
            204 => "no content",
            205 => "reset content",
            206 => "partial content",
            300 => "multiple choices",
            301 => "moved permanently",
            302 => "found",
            303 => "see other",
            304 => "not modified",
            305 => "use proxy",
            307 => "temporary redirect",
            400 => "bad request",
            401 => "unauthorized",
            402 => "payment required",
            403 => "forbidden",
            404 => "not found",
            405 => "method not allowed",
            406 => "not acceptable",
            407 => "proxy authentication required",
            408 => "request timeout",
            409 => "conflict",
            410 => "gone",
            411 => "length required",
            412 => "precondition failed",
            413 => "request entity too large",
            414 => "request URI too large",
            415 => "unsupported media type",
            416 => "requested range not satisfiable",
            417 => "expectation failed",
            500 => "internal server error",
            501 => "not implemented",
            502 => "bad gateway",
            503 => "service unavailable",
            504 => "gateway timeout",
            505 => "HTTP version not supported",
            _ => "unknown HTTP error",
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reason(), self.0)
    }
}

impl error::Error for HttpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_survive() {
        assert_eq!(HttpError::MALFORMED_STATUS_LINE.code(), 1);
        assert_eq!(HttpError::MALFORMED_RESPONSE_HEADERS.code(), 2);
        assert_eq!(HttpError::OK.code(), 200);
        assert_eq!(HttpError::VERSION_NOT_SUPPORTED.code(), 505);
        assert_eq!(HttpError::from_status(418).code(), 418);
    }

    #[test]
    fn test_redirect_set() {
        assert!(HttpError::MOVED_PERMANENTLY.is_redirect());
        assert!(HttpError::FOUND.is_redirect());
        assert!(!HttpError::SEE_OTHER.is_redirect());
        assert!(!HttpError::TEMPORARY_REDIRECT.is_redirect());
        assert!(!HttpError::OK.is_redirect());
    }

    #[test]
    fn test_display() {
        assert_eq!(HttpError::NOT_FOUND.to_string(), "not found (404)");
        assert_eq!(HttpError::from_status(418).to_string(), "unknown HTTP error (418)");
    }
}
