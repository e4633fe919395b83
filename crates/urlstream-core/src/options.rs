use std::path::{Path, PathBuf};

/// Client-certificate option payload: paths to the certificate chain and
/// its private key, both PEM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientCert {
    pub certificate: PathBuf,
    pub private_key: PathBuf,
}

/// Transport options a read stream forwards to whichever transport an
/// open selects.
///
/// One slot per option kind: setting a kind replaces its previous value,
/// clearing restores the kind's default, and reading an unset kind yields
/// that default. `Clone` produces an independent copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    verify_peer: Option<bool>,
    ca_cert: Option<PathBuf>,
    client_cert: Option<ClientCert>,
}

impl Options {
    pub fn new() -> Options {
        Options::default()
    }

    /// Whether the TLS peer certificate is verified. Defaults to `true`.
    pub fn verify_peer(&self) -> bool {
        self.verify_peer.unwrap_or(true)
    }

    pub fn set_verify_peer(&mut self, verify: bool) {
        self.verify_peer = Some(verify);
    }

    pub fn clear_verify_peer(&mut self) {
        self.verify_peer = None;
    }

    /// CA bundle used as the root of trust; `None` selects the system
    /// certificate store.
    pub fn ca_cert(&self) -> Option<&Path> {
        self.ca_cert.as_deref()
    }

    pub fn set_ca_cert(&mut self, path: impl Into<PathBuf>) {
        self.ca_cert = Some(path.into());
    }

    pub fn clear_ca_cert(&mut self) {
        self.ca_cert = None;
    }

    /// Client certificate presented during the handshake; `None` sends
    /// none.
    pub fn client_cert(&self) -> Option<&ClientCert> {
        self.client_cert.as_ref()
    }

    pub fn set_client_cert(&mut self, cert: ClientCert) {
        self.client_cert = Some(cert);
    }

    pub fn clear_client_cert(&mut self) {
        self.client_cert = None;
    }

    /// Overlay `other` onto `self`: kinds set in `other` replace the
    /// corresponding kinds here, unset kinds are left alone.
    pub fn merge(&mut self, other: &Options) {
        if other.verify_peer.is_some() {
            self.verify_peer = other.verify_peer;
        }
        if other.ca_cert.is_some() {
            self.ca_cert = other.ca_cert.clone();
        }
        if other.client_cert.is_some() {
            self.client_cert = other.client_cert.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = Options::new();
        assert!(options.verify_peer());
        assert_eq!(options.ca_cert(), None);
        assert_eq!(options.client_cert(), None);
    }

    #[test]
    fn test_set_then_get() {
        let mut options = Options::new();
        options.set_verify_peer(false);
        options.set_ca_cert("/etc/ssl/ca.pem");
        options.set_client_cert(ClientCert {
            certificate: "/etc/ssl/client.pem".into(),
            private_key: "/etc/ssl/client.key".into(),
        });
        assert!(!options.verify_peer());
        assert_eq!(options.ca_cert(), Some(Path::new("/etc/ssl/ca.pem")));
        assert_eq!(
            options.client_cert().unwrap().private_key,
            PathBuf::from("/etc/ssl/client.key")
        );
    }

    #[test]
    fn test_set_replaces() {
        let mut options = Options::new();
        options.set_ca_cert("/one.pem");
        options.set_ca_cert("/two.pem");
        assert_eq!(options.ca_cert(), Some(Path::new("/two.pem")));
    }

    #[test]
    fn test_clear_restores_default() {
        let mut options = Options::new();
        options.set_verify_peer(false);
        options.clear_verify_peer();
        assert!(options.verify_peer());

        options.set_ca_cert("/ca.pem");
        options.clear_ca_cert();
        assert_eq!(options.ca_cert(), None);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut original = Options::new();
        original.set_ca_cert("/ca.pem");
        let mut copy = original.clone();
        copy.set_ca_cert("/other.pem");
        copy.set_verify_peer(false);
        assert_eq!(original.ca_cert(), Some(Path::new("/ca.pem")));
        assert!(original.verify_peer());
    }

    #[test]
    fn test_merge_overlays_only_set_kinds() {
        let mut base = Options::new();
        base.set_ca_cert("/ca.pem");

        let mut overlay = Options::new();
        overlay.set_verify_peer(false);
        base.merge(&overlay);

        assert!(!base.verify_peer());
        assert_eq!(base.ca_cert(), Some(Path::new("/ca.pem")));
    }
}
