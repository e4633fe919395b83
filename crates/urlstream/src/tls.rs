//! rustls client-config construction from the option set.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::sync::Arc;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName, UnixTime};
use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
use urlstream_core::Options;

use crate::error::Error;

/// Build a client config from the option set: root of trust from
/// `ca_cert` (system store when unset), verification disabled when
/// `verify_peer` is off, client auth from `client_cert` when both paths
/// are given.
///
/// Called before every HTTPS open, so option changes made between opens
/// take effect. The options are copied into the config, never aliased.
pub(crate) fn client_config(options: &Options) -> Result<ClientConfig, Error> {
    let builder = if options.verify_peer() {
        let roots = root_store(options.ca_cert())?;
        ClientConfig::builder().with_root_certificates(roots)
    } else {
        ClientConfig::builder()
            .dangerous()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCert))
    };

    let config = match options.client_cert() {
        Some(client) => {
            let certs = load_certs(&client.certificate)?;
            let key = load_key(&client.private_key)?;
            builder.with_client_auth_cert(certs, key)?
        }
        None => builder.with_no_client_auth(),
    };
    Ok(config)
}

fn root_store(ca_cert: Option<&Path>) -> Result<RootCertStore, Error> {
    let mut roots = RootCertStore::empty();
    match ca_cert {
        Some(path) => {
            for cert in load_certs(path)? {
                roots.add(cert)?;
            }
        }
        None => {
            for cert in rustls_native_certs::load_native_certs().certs {
                // Certificates the verifier cannot use are skipped, the
                // same way the platform store itself skips them.
                let _ = roots.add(cert);
            }
        }
    }
    Ok(roots)
}

fn load_certs(path: &Path) -> Result<Vec<CertificateDer<'static>>, Error> {
    let file = File::open(path)?;
    let certs = rustls_pemfile::certs(&mut BufReader::new(file)).collect::<io::Result<Vec<_>>>()?;
    Ok(certs)
}

fn load_key(path: &Path) -> Result<PrivateKeyDer<'static>, Error> {
    let file = File::open(path)?;
    let key = rustls_pemfile::private_key(&mut BufReader::new(file))?;
    key.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "no private key in file").into())
}

/// Verifier installed when `verify_peer` is disabled: accepts any
/// certificate chain.
#[derive(Debug)]
struct AcceptAnyCert;

impl ServerCertVerifier for AcceptAnyCert {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _message: &[u8],
        _cert: &CertificateDer<'_>,
        _dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, rustls::Error> {
        Ok(HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        vec![
            SignatureScheme::RSA_PKCS1_SHA256,
            SignatureScheme::RSA_PKCS1_SHA384,
            SignatureScheme::RSA_PKCS1_SHA512,
            SignatureScheme::ECDSA_NISTP256_SHA256,
            SignatureScheme::ECDSA_NISTP384_SHA384,
            SignatureScheme::ECDSA_NISTP521_SHA512,
            SignatureScheme::RSA_PSS_SHA256,
            SignatureScheme::RSA_PSS_SHA384,
            SignatureScheme::RSA_PSS_SHA512,
            SignatureScheme::ED25519,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_with_ca_file() {
        let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        let mut pem = tempfile::NamedTempFile::new().unwrap();
        pem.write_all(cert.cert.pem().as_bytes()).unwrap();

        let mut options = Options::new();
        options.set_ca_cert(pem.path());
        assert!(client_config(&options).is_ok());
    }

    #[test]
    fn test_missing_ca_file_is_io_error() {
        let mut options = Options::new();
        options.set_ca_cert("/nonexistent/ca.pem");
        assert!(matches!(client_config(&options), Err(Error::Io(_))));
    }

    #[test]
    fn test_config_without_verification_needs_no_roots() {
        let mut options = Options::new();
        options.set_verify_peer(false);
        assert!(client_config(&options).is_ok());
    }

    #[test]
    fn test_client_cert_loaded() {
        let cert = rcgen::generate_simple_self_signed(vec!["client".to_string()]).unwrap();
        let mut cert_pem = tempfile::NamedTempFile::new().unwrap();
        cert_pem.write_all(cert.cert.pem().as_bytes()).unwrap();
        let mut key_pem = tempfile::NamedTempFile::new().unwrap();
        key_pem
            .write_all(cert.key_pair.serialize_pem().as_bytes())
            .unwrap();

        let mut options = Options::new();
        options.set_verify_peer(false);
        options.set_client_cert(urlstream_core::ClientCert {
            certificate: cert_pem.path().to_path_buf(),
            private_key: key_pem.path().to_path_buf(),
        });
        assert!(client_config(&options).is_ok());
    }
}
