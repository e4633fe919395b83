//! Synchronous mirrors of the async surface.
//!
//! Each type here owns a current-thread tokio runtime — the event loop
//! the instance is bound to — and drives the same async state machine
//! with `block_on`; only the suspension points differ. [`ReadStream`] is
//! the plain facade; [`Reader`] layers a fixed 520-byte buffer (8 bytes
//! of putback slack ahead of a 512-byte read area) and a per-refill read
//! timeout on top, exposing `io::Read`/`io::BufRead`.

use std::io::{self, BufRead, Read};
use std::time::Duration;

use tokio::runtime;
use tracing::warn;
use urlstream_core::{Options, Url};

use crate::error::Error;

/// Default per-refill read timeout for [`Reader`]: 300 seconds.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(300_000);

const PUTBACK: usize = 8;
const READ_AREA: usize = 512;

fn event_loop() -> io::Result<runtime::Runtime> {
    runtime::Builder::new_current_thread().enable_all().build()
}

/// Blocking counterpart of [`crate::ReadStream`].
pub struct ReadStream {
    rt: runtime::Runtime,
    inner: crate::ReadStream,
}

impl ReadStream {
    pub fn new() -> io::Result<ReadStream> {
        Ok(ReadStream {
            rt: event_loop()?,
            inner: crate::ReadStream::new(),
        })
    }

    pub fn options(&self) -> &Options {
        self.inner.options()
    }

    pub fn options_mut(&mut self) -> &mut Options {
        self.inner.options_mut()
    }

    pub fn set_options(&mut self, other: &Options) {
        self.inner.set_options(other);
    }

    pub fn open(&mut self, url: &Url) -> Result<(), Error> {
        self.rt.block_on(self.inner.open(url))
    }

    pub fn read_some(&mut self, buf: &mut [u8]) -> Result<usize, Error> {
        self.rt.block_on(self.inner.read_some(buf))
    }

    pub fn close(&mut self) {
        self.inner.close();
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    pub fn content_type(&self) -> &str {
        self.inner.content_type()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.inner.content_length()
    }

    pub fn headers(&self) -> &str {
        self.inner.headers()
    }
}

/// Buffered blocking reader over a [`crate::ReadStream`].
///
/// Refills race one `read_some` against a deadline timer on the owned
/// event loop. When the timer wins, the underlying stream is closed —
/// cancelling the pending read — and the refill fails with `TimedOut`.
/// The timeout applies per refill, not to the whole body.
pub struct Reader {
    rt: runtime::Runtime,
    stream: crate::ReadStream,
    buf: [u8; PUTBACK + READ_AREA],
    pos: usize,
    end: usize,
    read_timeout: Duration,
    last_error: Option<Error>,
}

impl Reader {
    pub fn new() -> io::Result<Reader> {
        Reader::with_options(Options::new())
    }

    pub fn with_options(options: Options) -> io::Result<Reader> {
        Ok(Reader {
            rt: event_loop()?,
            stream: crate::ReadStream::with_options(options),
            buf: [0; PUTBACK + READ_AREA],
            pos: PUTBACK,
            end: PUTBACK,
            read_timeout: DEFAULT_READ_TIMEOUT,
            last_error: None,
        })
    }

    /// Open `url`. A closed reader can be reopened against another URL;
    /// buffer contents and the recorded error do not survive the reopen.
    pub fn open(&mut self, url: &Url) -> Result<(), Error> {
        let stream = &mut self.stream;
        self.rt.block_on(stream.open(url))?;
        self.pos = PUTBACK;
        self.end = PUTBACK;
        self.last_error = None;
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    pub fn set_read_timeout(&mut self, timeout: Duration) {
        self.read_timeout = timeout;
    }

    /// The error that ended the last failed refill, if any.
    pub fn last_error(&self) -> Option<&Error> {
        self.last_error.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_open()
    }

    pub fn content_type(&self) -> &str {
        self.stream.content_type()
    }

    pub fn content_length(&self) -> Option<u64> {
        self.stream.content_length()
    }

    pub fn headers(&self) -> &str {
        self.stream.headers()
    }

    pub fn close(&mut self) {
        self.stream.close();
        self.pos = PUTBACK;
        self.end = PUTBACK;
    }

    /// Push one byte back so the next read returns it first. Fails once
    /// the putback slack is exhausted.
    pub fn putback(&mut self, byte: u8) -> bool {
        if self.pos == 0 {
            return false;
        }
        self.pos -= 1;
        self.buf[self.pos] = byte;
        true
    }

    /// Refill the read area, preserving the tail of what was already
    /// delivered in the putback region. `Ok(0)` is end of input.
    fn underflow(&mut self) -> io::Result<usize> {
        let keep = PUTBACK.min(self.end.saturating_sub(PUTBACK));
        self.buf.copy_within(self.end - keep..self.end, PUTBACK - keep);
        self.pos = PUTBACK;
        self.end = PUTBACK;

        let timeout = self.read_timeout;
        let stream = &mut self.stream;
        let area = &mut self.buf[PUTBACK..];
        let refill = self.rt.block_on(async {
            match tokio::time::timeout(timeout, stream.read_some(area)).await {
                Ok(done) => done,
                Err(_elapsed) => Err(Error::Io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "read timed out",
                ))),
            }
        });

        match refill {
            Ok(n) => {
                self.end = PUTBACK + n;
                Ok(n)
            }
            Err(err) => {
                if matches!(&err, Error::Io(inner) if inner.kind() == io::ErrorKind::TimedOut) {
                    warn!(?timeout, "read timed out; closing stream");
                    self.stream.close();
                }
                let kind = match &err {
                    Error::Io(inner) => inner.kind(),
                    _ => io::ErrorKind::Other,
                };
                let message = err.to_string();
                self.last_error = Some(err);
                Err(io::Error::new(kind, message))
            }
        }
    }
}

impl Read for Reader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        if self.pos == self.end && self.underflow()? == 0 {
            return Ok(0);
        }
        let n = (self.end - self.pos).min(out.len());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

impl BufRead for Reader {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos == self.end {
            self.underflow()?;
        }
        Ok(&self.buf[self.pos..self.end])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.end);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::net::{SocketAddr, TcpListener};
    use std::thread;

    /// std-thread canned server: read the request head, write `response`,
    /// then linger for `hold` before closing.
    fn canned_server(response: Vec<u8>, hold: Duration) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let (mut socket, _) = listener.accept().unwrap();
            let mut head = Vec::new();
            let mut byte = [0u8; 1];
            while !head.ends_with(b"\r\n\r\n") {
                match std::io::Read::read(&mut socket, &mut byte) {
                    Ok(0) | Err(_) => break,
                    Ok(_) => head.extend_from_slice(&byte),
                }
            }
            socket.write_all(&response).unwrap();
            thread::sleep(hold);
        });
        addr
    }

    fn url(s: String) -> Url {
        s.parse().unwrap()
    }

    #[test]
    fn test_blocking_stream_round_trip() {
        let addr = canned_server(
            b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\nContent-Length: 5\r\n\r\nhello".to_vec(),
            Duration::ZERO,
        );

        let mut stream = ReadStream::new().unwrap();
        stream.open(&url(format!("http://{addr}/x"))).unwrap();
        assert_eq!(stream.content_type(), "text/plain");
        assert_eq!(stream.content_length(), Some(5));

        let mut body = Vec::new();
        let mut chunk = [0u8; 8];
        loop {
            let n = stream.read_some(&mut chunk).unwrap();
            if n == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(body, b"hello");
        stream.close();
        assert!(!stream.is_open());
    }

    #[test]
    fn test_reader_reads_to_eof() {
        let addr = canned_server(
            b"HTTP/1.0 200 OK\r\nContent-Length: 12\r\n\r\nline one\nend".to_vec(),
            Duration::ZERO,
        );

        let mut reader = Reader::new().unwrap();
        reader.open(&url(format!("http://{addr}/"))).unwrap();
        assert_eq!(reader.content_length(), Some(12));
        let mut body = String::new();
        reader.read_to_string(&mut body).unwrap();
        assert_eq!(body, "line one\nend");
    }

    #[test]
    fn test_reader_buffered_lines() {
        let addr = canned_server(
            b"HTTP/1.0 200 OK\r\nContent-Length: 7\r\n\r\na\nbb\nc\n".to_vec(),
            Duration::ZERO,
        );

        let mut reader = Reader::new().unwrap();
        reader.open(&url(format!("http://{addr}/"))).unwrap();
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, ["a", "bb", "c"]);
    }

    #[test]
    fn test_reader_putback() {
        let addr = canned_server(
            b"HTTP/1.0 200 OK\r\nContent-Length: 3\r\n\r\nxyz".to_vec(),
            Duration::ZERO,
        );

        let mut reader = Reader::new().unwrap();
        reader.open(&url(format!("http://{addr}/"))).unwrap();
        let mut one = [0u8; 1];
        reader.read_exact(&mut one).unwrap();
        assert_eq!(&one, b"x");
        assert!(reader.putback(b'X'));
        let mut rest = String::new();
        reader.read_to_string(&mut rest).unwrap();
        assert_eq!(rest, "Xyz");
    }

    #[test]
    fn test_reader_refills_across_large_body() {
        // Three times the read area, so the buffer turns over repeatedly
        // and the putback tail is preserved at each refill.
        let body: Vec<u8> = (0u32..1536).map(|i| (i % 251) as u8).collect();
        let mut response =
            format!("HTTP/1.0 200 OK\r\nContent-Length: {}\r\n\r\n", body.len()).into_bytes();
        response.extend_from_slice(&body);
        let addr = canned_server(response, Duration::ZERO);

        let mut reader = Reader::new().unwrap();
        reader.open(&url(format!("http://{addr}/"))).unwrap();
        let mut got = Vec::new();
        reader.read_to_end(&mut got).unwrap();
        assert_eq!(got, body);
    }

    #[test]
    fn test_reader_over_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "first\nsecond\n").unwrap();

        let mut reader = Reader::new().unwrap();
        reader.open(&url(format!("file://{}", path.display()))).unwrap();
        assert_eq!(reader.content_length(), None);
        let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
        assert_eq!(lines, ["first", "second"]);
    }

    #[test]
    fn test_reader_timeout_closes_stream() {
        // Head arrives, the body never does.
        let addr = canned_server(
            b"HTTP/1.0 200 OK\r\nContent-Length: 5\r\n\r\n".to_vec(),
            Duration::from_secs(30),
        );

        let mut reader = Reader::new().unwrap();
        reader.open(&url(format!("http://{addr}/"))).unwrap();
        reader.set_read_timeout(Duration::from_millis(50));

        let mut body = Vec::new();
        let err = reader.read_to_end(&mut body).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::TimedOut);
        assert!(!reader.is_open());
        assert!(matches!(
            reader.last_error(),
            Some(Error::Io(inner)) if inner.kind() == io::ErrorKind::TimedOut
        ));
    }

    #[test]
    fn test_reader_reopens_after_close() {
        let first = canned_server(
            b"HTTP/1.0 200 OK\r\nContent-Length: 3\r\n\r\none".to_vec(),
            Duration::ZERO,
        );
        let second = canned_server(
            b"HTTP/1.0 200 OK\r\nContent-Length: 3\r\n\r\ntwo".to_vec(),
            Duration::ZERO,
        );

        let mut reader = Reader::new().unwrap();
        reader.open(&url(format!("http://{first}/"))).unwrap();
        let mut body = String::new();
        reader.read_to_string(&mut body).unwrap();
        assert_eq!(body, "one");

        reader.close();
        reader.open(&url(format!("http://{second}/"))).unwrap();
        let mut body = String::new();
        reader.read_to_string(&mut body).unwrap();
        assert_eq!(body, "two");
    }

    #[test]
    fn test_reader_default_timeout() {
        let addr = canned_server(
            b"HTTP/1.0 200 OK\r\nContent-Length: 0\r\n\r\n".to_vec(),
            Duration::ZERO,
        );
        let mut reader = Reader::new().unwrap();
        reader.open(&url(format!("http://{addr}/"))).unwrap();
        assert_eq!(reader.read_timeout(), Duration::from_millis(300_000));
    }
}
