//! Protocol-level building blocks for the `urlstream` crates: URL parsing
//! and normalization, the transport option set, the HTTP error taxonomy,
//! and the response-head parsers. Everything in this crate is pure — no
//! sockets, no files, no runtime.

pub mod http;
pub mod options;
pub mod response;
pub mod url;

pub use http::HttpError;
pub use options::{ClientCert, Options};
pub use url::{Components, InvalidUrl, Url};
