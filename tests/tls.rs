//! Integration tests for resolving TLS-wrapped connections.
#![cfg(feature = "tls")]

use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio_rustls::rustls;
use tokio_rustls::rustls::pki_types::{CertificateDer, PrivateKeyDer, ServerName};
use tokio_rustls::{TlsAcceptor, TlsConnector, client, server};

use tcpinfo::{Error, Resolve, TcpState, get_tcp_info, query, resolve};

fn tls_material() -> (Vec<CertificateDer<'static>>, PrivateKeyDer<'static>) {
    let cert = rcgen::generate_simple_self_signed(vec!["localhost".to_string()])
        .expect("generate self-signed cert");
    let key = PrivateKeyDer::Pkcs8(cert.signing_key.serialize_der().into());
    let cert_der = CertificateDer::from(cert.cert);
    (vec![cert_der], key)
}

fn acceptor() -> TlsAcceptor {
    let (certs, key) = tls_material();
    let config = rustls::ServerConfig::builder()
        .with_no_client_auth()
        .with_single_cert(certs, key)
        .expect("server TLS config");
    TlsAcceptor::from(Arc::new(config))
}

fn connector() -> TlsConnector {
    let config = rustls::ClientConfig::builder()
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(SkipServerVerification))
        .with_no_client_auth();
    TlsConnector::from(Arc::new(config))
}

/// TLS session over a loopback TCP pair, both handshakes driven to completion.
async fn tls_pair() -> (client::TlsStream<TcpStream>, server::TlsStream<TcpStream>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().unwrap();

    let connector = connector();
    let acceptor = acceptor();
    let server_name = ServerName::try_from("localhost".to_string()).unwrap();

    tokio::join!(
        async {
            let tcp = TcpStream::connect(addr).await.expect("connect");
            connector
                .connect(server_name, tcp)
                .await
                .expect("client handshake")
        },
        async {
            let (tcp, _) = listener.accept().await.expect("accept");
            acceptor.accept(tcp).await.expect("server handshake")
        }
    )
}

#[tokio::test]
async fn test_tls_query_equals_inner_query() {
    let (tls_client, _tls_server) = tls_pair().await;

    let via_resolve = query(&tls_client.resolve().expect("resolve TLS client")).expect("query");
    let via_inner = query(tls_client.get_ref().0).expect("query inner stream directly");

    assert_eq!(via_resolve.state(), Some(TcpState::Established));
    assert_eq!(via_resolve.tcpi_pmtu, via_inner.tcpi_pmtu);
    assert_eq!(via_resolve.tcpi_snd_mss, via_inner.tcpi_snd_mss);
}

#[tokio::test]
async fn test_both_tls_sides_resolve() {
    let (tls_client, tls_server) = tls_pair().await;

    let client_info = query(&resolve(&tls_client).expect("resolve client side")).expect("query");
    let server_info = query(&resolve(&tls_server).expect("resolve server side")).expect("query");

    assert_eq!(client_info.state(), Some(TcpState::Established));
    assert_eq!(server_info.state(), Some(TcpState::Established));
}

#[tokio::test]
async fn test_either_side_wrapper_resolves() {
    let (tls_client, _tls_server) = tls_pair().await;
    let either = tokio_rustls::TlsStream::from(tls_client);

    let info = query(&resolve(&either).expect("resolve enum wrapper")).expect("query");
    assert_eq!(info.state(), Some(TcpState::Established));
}

#[tokio::test]
async fn test_one_shot_entry_through_tls() {
    let (tls_client, _tls_server) = tls_pair().await;

    let info = get_tcp_info(&tls_client).expect("resolve and query in one call");
    assert_eq!(info.state(), Some(TcpState::Established));
}

#[tokio::test]
async fn test_tls_over_non_tcp_transport_is_rejected() {
    let (client_io, server_io) = tokio::io::duplex(64 * 1024);

    let connector = connector();
    let acceptor = acceptor();
    let server_name = ServerName::try_from("localhost".to_string()).unwrap();

    let (tls_client, _tls_server) = tokio::join!(
        async {
            connector
                .connect(server_name, client_io)
                .await
                .expect("client handshake over duplex")
        },
        async {
            acceptor
                .accept(server_io)
                .await
                .expect("server handshake over duplex")
        }
    );

    let err = tls_client.resolve().unwrap_err();
    match err {
        Error::UnsupportedInnerConnection(name) => {
            assert!(name.contains("DuplexStream"), "got {}", name)
        }
        other => panic!("expected UnsupportedInnerConnection, got {:?}", other),
    }
}

/// Accepts any server certificate; these tests authenticate nothing.
#[derive(Debug)]
struct SkipServerVerification;

impl rustls::client::danger::ServerCertVerifier for SkipServerVerification {
    fn verify_server_cert(
        &self,
        _end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _server_name: &rustls::pki_types::ServerName<'_>,
        _ocsp: &[u8],
        _now: rustls::pki_types::UnixTime,
    ) -> Result<rustls::client::danger::ServerCertVerified, rustls::Error> {
        Ok(rustls::client::danger::ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        _: &[u8],
        _: &CertificateDer<'_>,
        _: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn verify_tls13_signature(
        &self,
        _: &[u8],
        _: &CertificateDer<'_>,
        _: &rustls::DigitallySignedStruct,
    ) -> Result<rustls::client::danger::HandshakeSignatureValid, rustls::Error> {
        Ok(rustls::client::danger::HandshakeSignatureValid::assertion())
    }

    fn supported_verify_schemes(&self) -> Vec<rustls::SignatureScheme> {
        vec![
            rustls::SignatureScheme::ECDSA_NISTP256_SHA256,
            rustls::SignatureScheme::RSA_PKCS1_SHA256,
            rustls::SignatureScheme::ED25519,
        ]
    }
}
