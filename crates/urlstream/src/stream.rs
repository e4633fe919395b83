use std::sync::Arc;

use tracing::{debug, warn};
use urlstream_core::{Options, Url};

use crate::error::Error;
use crate::file::FileTransport;
use crate::http::{HttpTransport, HttpsConnector, TcpConnector};
use crate::tls;

/// Redirect hops followed before the redirect status itself is handed to
/// the caller.
const MAX_REDIRECTS: usize = 8;

/// The transport currently backing a [`ReadStream`]. At most one is live.
enum Transport {
    None,
    File(FileTransport),
    Http(HttpTransport<TcpConnector>),
    Https(HttpTransport<HttpsConnector>),
}

/// A readable byte stream over whatever resource a URL names.
///
/// `open` picks the transport from the URL scheme — `file`, `http` or
/// `https` — and, for the HTTP family, follows `301`/`302` redirects by
/// closing the transport and reopening it against the `Location` target.
/// After a successful open, `read_some` yields the content bytes until it
/// returns 0 at end of input.
pub struct ReadStream {
    options: Options,
    transport: Transport,
}

impl ReadStream {
    pub fn new() -> ReadStream {
        ReadStream::with_options(Options::new())
    }

    pub fn with_options(options: Options) -> ReadStream {
        ReadStream {
            options,
            transport: Transport::None,
        }
    }

    /// Transport options applied at the next `open`.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Overlay `other` onto the stream's options.
    pub fn set_options(&mut self, other: &Options) {
        self.options.merge(other);
    }

    /// Open the resource `url` names, following up to eight HTTP
    /// redirects. A redirect without a `Location`, or one past the hop
    /// limit, surfaces the redirect status itself.
    pub async fn open(&mut self, url: &Url) -> Result<(), Error> {
        if self.is_open() {
            return Err(Error::AlreadyOpen);
        }
        let mut current = url.clone();
        let mut hops = 0;
        loop {
            let status = match self.open_one(&current).await {
                Err(Error::Http(status)) if status.is_redirect() => status,
                other => return other,
            };
            let next = self.location().to_string();
            self.close();
            if next.is_empty() {
                warn!(code = status.code(), "redirect carries no Location");
                return Err(status.into());
            }
            if hops == MAX_REDIRECTS {
                warn!(limit = MAX_REDIRECTS, "redirect limit reached");
                return Err(status.into());
            }
            hops += 1;
            debug!(hop = hops, location = %next, "following redirect");
            current = next.parse()?;
        }
    }

    /// One open attempt, no redirect handling.
    async fn open_one(&mut self, url: &Url) -> Result<(), Error> {
        match url.scheme() {
            "file" => {
                let mut transport = FileTransport::new();
                let opened = transport.open(url).await;
                self.transport = Transport::File(transport);
                opened
            }
            "http" => {
                let mut transport = HttpTransport::new(TcpConnector);
                let opened = transport.open(url).await;
                self.transport = Transport::Http(transport);
                opened
            }
            "https" => {
                // The TLS context is rebuilt from the current options on
                // every open, so option changes apply per hop.
                let config = Arc::new(tls::client_config(&self.options)?);
                let mut transport = HttpTransport::new(HttpsConnector { config });
                let opened = transport.open(url).await;
                self.transport = Transport::Https(transport);
                opened
            }
            other => Err(Error::UnsupportedScheme(other.to_string())),
        }
    }

    /// Read some content bytes into `buf`; `Ok(0)` is end of input.
    pub async fn read_some(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        match &mut self.transport {
            Transport::None => Err(Error::NotOpen),
            Transport::File(transport) => transport.read_some(buf).await,
            Transport::Http(transport) => transport.read_some(buf).await,
            Transport::Https(transport) => transport.read_some(buf).await,
        }
    }

    /// Drop the live transport, cancelling any I/O pending on it.
    pub fn close(&mut self) {
        self.transport = Transport::None;
    }

    pub fn is_open(&self) -> bool {
        match &self.transport {
            Transport::None => false,
            Transport::File(transport) => transport.is_open(),
            Transport::Http(transport) => transport.is_open(),
            Transport::Https(transport) => transport.is_open(),
        }
    }

    /// `Content-Type` of the final response, empty when none was
    /// advertised or no HTTP transport is live.
    pub fn content_type(&self) -> &str {
        match &self.transport {
            Transport::Http(transport) => transport.content_type(),
            Transport::Https(transport) => transport.content_type(),
            _ => "",
        }
    }

    /// Advertised `Content-Length`; `None` when unknown — the file
    /// transport, a response without the header, or nothing open.
    pub fn content_length(&self) -> Option<u64> {
        match &self.transport {
            Transport::Http(transport) => transport.content_length(),
            Transport::Https(transport) => transport.content_length(),
            _ => None,
        }
    }

    /// The raw header block of the final response, blank line included.
    pub fn headers(&self) -> &str {
        match &self.transport {
            Transport::Http(transport) => transport.headers(),
            Transport::Https(transport) => transport.headers(),
            _ => "",
        }
    }

    fn location(&self) -> &str {
        match &self.transport {
            Transport::Http(transport) => transport.location(),
            Transport::Https(transport) => transport.location(),
            _ => "",
        }
    }
}

impl Default for ReadStream {
    fn default() -> ReadStream {
        ReadStream::new()
    }
}
