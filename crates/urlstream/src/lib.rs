//! Read bytes from whatever a URL names.
//!
//! A [`ReadStream`] opens `file://`, `http://` or `https://` resources
//! behind one reader interface, following HTTP redirects and exposing the
//! response metadata (`Content-Type`, `Content-Length`, the raw header
//! block). The async surface lives on [`ReadStream`]; the [`blocking`]
//! module mirrors it for synchronous callers and adds [`blocking::Reader`],
//! a buffered reader with a per-refill read timeout.
//!
//! ```no_run
//! # async fn demo() -> Result<(), urlstream::Error> {
//! let url: urlstream::Url = "http://example.com/".parse()?;
//! let mut stream = urlstream::ReadStream::new();
//! stream.open(&url).await?;
//! let mut body = Vec::new();
//! let mut chunk = [0u8; 4096];
//! loop {
//!     let n = stream.read_some(&mut chunk).await?;
//!     if n == 0 {
//!         break;
//!     }
//!     body.extend_from_slice(&chunk[..n]);
//! }
//! # Ok(())
//! # }
//! ```

pub mod blocking;
mod connect;
mod error;
mod file;
mod http;
mod stream;
mod tls;

#[cfg(test)]
mod testutil;

pub use error::Error;
pub use stream::ReadStream;
pub use urlstream_core::{ClientCert, Components, HttpError, InvalidUrl, Options, Url};
