use std::io;

use tokio::net::{self, TcpStream};
use tracing::debug;

/// Resolve `host:port` and try each endpoint in turn, keeping the last
/// connect error. Nagle is disabled on the winning socket.
pub(crate) async fn connect(host: &str, port: u16) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in net::lookup_host((host, port)).await? {
        match TcpStream::connect(addr).await {
            Ok(socket) => {
                socket.set_nodelay(true)?;
                debug!(%addr, "connected");
                return Ok(socket);
            }
            Err(err) => {
                debug!(%addr, %err, "endpoint refused");
                last_err = Some(err);
            }
        }
    }
    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no addresses found for {host}"),
        )
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn test_connect_reaches_listener() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let socket = connect("127.0.0.1", addr.port()).await.unwrap();
        assert!(socket.nodelay().unwrap());
    }

    #[tokio::test]
    async fn test_connect_refused_propagates() {
        // Bind then drop, so the port is very likely unbound.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        assert!(connect("127.0.0.1", addr.port()).await.is_err());
    }
}
