//! The HTTP transport: one state machine, generic over its byte stream.
//!
//! [`HttpTransport`] is instantiated twice by the dispatcher — over a
//! plain TCP socket and over a TLS-wrapped one — through the [`Connector`]
//! seam, which is the only place the two differ. The open sequence is
//! strictly ordered: connect (and handshake), send the request, read the
//! status line (re-reading past interim 1xx replies), read the header
//! block. Bytes that arrive past the header terminator stay in the reply
//! buffer and are handed to the body phase, which must drain them before
//! touching the socket again.

use std::io;
use std::sync::Arc;

use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tracing::debug;
use urlstream_core::{HttpError, Url, response};

use crate::connect;
use crate::error::Error;

/// Byte-stream factory: everything scheme-specific about reaching the
/// server lives behind this seam.
pub(crate) trait Connector {
    type Stream: AsyncRead + AsyncWrite + Unpin;

    async fn connect(&self, url: &Url) -> Result<Self::Stream, Error>;
}

/// Plain TCP.
pub(crate) struct TcpConnector;

impl Connector for TcpConnector {
    type Stream = TcpStream;

    async fn connect(&self, url: &Url) -> Result<TcpStream, Error> {
        Ok(connect::connect(url.host(), url.effective_port()).await?)
    }
}

/// TCP followed by a client-side TLS handshake with SNI from the URL
/// host. Handshake failures surface unchanged.
pub(crate) struct HttpsConnector {
    pub(crate) config: Arc<rustls::ClientConfig>,
}

impl Connector for HttpsConnector {
    type Stream = TlsStream<TcpStream>;

    async fn connect(&self, url: &Url) -> Result<Self::Stream, Error> {
        let tcp = connect::connect(url.host(), url.effective_port()).await?;
        let name = ServerName::try_from(url.host().to_string()).map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "host is not a valid TLS server name",
            )
        })?;
        let stream = TlsConnector::from(self.config.clone())
            .connect(name, tcp)
            .await?;
        Ok(stream)
    }
}

pub(crate) struct HttpTransport<C: Connector> {
    connector: C,
    socket: Option<C::Stream>,
    /// Read-ahead buffer. During open it accumulates the response head;
    /// afterwards it holds the residual body prefix captured while
    /// reading to the header terminator.
    reply: Vec<u8>,
    headers: String,
    content_type: String,
    content_length: Option<u64>,
    location: String,
}

impl<C: Connector> HttpTransport<C> {
    pub(crate) fn new(connector: C) -> HttpTransport<C> {
        HttpTransport {
            connector,
            socket: None,
            reply: Vec::new(),
            headers: String::new(),
            content_type: String::new(),
            content_length: None,
            location: String::new(),
        }
    }

    /// Run the open sequence against `url`. On a non-200 status the error
    /// carries the status and the transport stays populated, so the
    /// caller can still read `location()`, `headers()` and the body.
    pub(crate) async fn open(&mut self, url: &Url) -> Result<(), Error> {
        if self.socket.is_some() {
            return Err(Error::AlreadyOpen);
        }

        let mut socket = self.connector.connect(url).await?;

        // HTTP/1.0 with `Connection: close`, so the body is everything up
        // to EOF.
        let request = format!(
            "GET {} HTTP/1.0\r\nHost: {}:{}\r\nAccept: */*\r\nConnection: close\r\n\r\n",
            url.request_target(),
            url.host(),
            url.effective_port(),
        );
        socket.write_all(request.as_bytes()).await?;
        debug!(host = url.host(), path = %url.request_target(), "request sent");

        // Status line; interim 1xx replies are consumed (through their
        // terminating blank line) and the line is read again.
        let code = loop {
            let line = read_until(&mut socket, &mut self.reply, b"\r\n").await?;
            let status =
                response::parse_status_line(&line).ok_or(HttpError::MALFORMED_STATUS_LINE)?;
            if status.code == HttpError::CONTINUE.code() {
                loop {
                    let line = read_until(&mut socket, &mut self.reply, b"\r\n").await?;
                    if line == b"\r\n" {
                        break;
                    }
                }
                continue;
            }
            break status.code;
        };

        // Header block, trailing blank line included. Anything beyond it
        // already sitting in the reply buffer is the start of the body.
        let block = read_until(&mut socket, &mut self.reply, b"\r\n\r\n").await?;
        self.headers = String::from_utf8_lossy(&block).into_owned();
        let fields = response::parse_header_fields(&block)
            .ok_or(HttpError::MALFORMED_RESPONSE_HEADERS)?;
        self.content_type = fields.content_type;
        self.content_length = fields.content_length;
        self.location = fields.location;
        self.socket = Some(socket);

        debug!(code, content_length = ?self.content_length, "response head read");

        if code != HttpError::OK.code() {
            return Err(HttpError::from_status(code).into());
        }
        Ok(())
    }

    /// Read body bytes: the residual reply buffer is drained first, and
    /// the socket is touched only once it is empty. A peer that drops the
    /// connection without a clean shutdown still ends a
    /// `Connection: close` body, so that surfaces as EOF.
    pub(crate) async fn read_some(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        if !self.reply.is_empty() {
            let n = self.reply.len().min(buf.len());
            buf[..n].copy_from_slice(&self.reply[..n]);
            self.reply.drain(..n);
            return Ok(n);
        }
        let socket = self.socket.as_mut().ok_or(Error::NotOpen)?;
        match socket.read(buf).await {
            Ok(n) => Ok(n),
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(0),
            Err(err) => Err(err.into()),
        }
    }

    /// Drop the socket — waking anything pending on it — and clear all
    /// per-response state.
    pub(crate) fn close(&mut self) {
        self.socket = None;
        self.reply.clear();
        self.headers.clear();
        self.content_type.clear();
        self.content_length = None;
        self.location.clear();
    }

    pub(crate) fn is_open(&self) -> bool {
        self.socket.is_some()
    }

    pub(crate) fn content_type(&self) -> &str {
        &self.content_type
    }

    pub(crate) fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    pub(crate) fn headers(&self) -> &str {
        &self.headers
    }

    pub(crate) fn location(&self) -> &str {
        &self.location
    }
}

/// Read from `socket` into `buf` until `delim` is present, then split off
/// and return the prefix through the delimiter. Bytes already in `buf`
/// are considered first; bytes past the delimiter stay in `buf`.
async fn read_until<S>(socket: &mut S, buf: &mut Vec<u8>, delim: &[u8]) -> io::Result<Vec<u8>>
where
    S: AsyncRead + Unpin,
{
    loop {
        if let Some(pos) = find(buf, delim) {
            let rest = buf.split_off(pos + delim.len());
            return Ok(std::mem::replace(buf, rest));
        }
        let mut chunk = [0u8; 1024];
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
