use std::io;

use thiserror::Error;
use urlstream_core::{HttpError, InvalidUrl};

/// Any failure an open or a read can produce.
#[derive(Debug, Error)]
pub enum Error {
    /// A URL (the caller's, or one from a `Location` header) failed to
    /// parse.
    #[error(transparent)]
    Url(#[from] InvalidUrl),

    /// The server answered with something other than 200, or its response
    /// head could not be parsed.
    #[error(transparent)]
    Http(#[from] HttpError),

    /// Transport-level I/O failure, propagated unchanged.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// TLS configuration or certificate material was rejected.
    #[error("TLS configuration rejected: {0}")]
    Tls(#[from] rustls::Error),

    /// The URL's scheme has no transport.
    #[error("URL scheme `{0}` is not supported")]
    UnsupportedScheme(String),

    /// `open` was called while a previous open is still live.
    #[error("stream is already open")]
    AlreadyOpen,

    /// A read or delegate call was made with no transport open.
    #[error("stream is not open")]
    NotOpen,
}

impl Error {
    /// The HTTP status behind this error, when there is one.
    pub fn http_status(&self) -> Option<HttpError> {
        match self {
            Error::Http(status) => Some(*status),
            _ => None,
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        match err {
            Error::Io(err) => err,
            other => io::Error::other(other),
        }
    }
}
