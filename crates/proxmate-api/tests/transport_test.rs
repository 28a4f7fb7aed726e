#![allow(clippy::unwrap_used)]
// Transport behaviour against a real TLS listener: certificate policy and
// the connect-retry rule.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use rcgen::CertifiedKey;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tokio_rustls::rustls::ServerConfig;
use tokio_rustls::rustls::crypto::ring;
use tokio_rustls::rustls::pki_types::{PrivateKeyDer, PrivatePkcs8KeyDer};

use proxmate_api::models::GuestAction;
use proxmate_api::{ConnectionTarget, Error, PveClient, Session, TransportConfig};

const VERSION_BODY: &str = r#"{"data":{"version":"8.2.4","release":"8.2","repoid":"faa83925"}}"#;

/// HTTPS listener on 127.0.0.1 with a self-signed certificate issued for a
/// different hostname. The first `drop_first` connections are closed before
/// the handshake; every other request is answered with `VERSION_BODY`.
async fn serve_self_signed(drop_first: usize) -> (u16, Arc<AtomicUsize>) {
    let CertifiedKey { cert, signing_key } =
        rcgen::generate_simple_self_signed(vec!["pve.invalid".to_owned()]).unwrap();
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(signing_key.serialize_der()));
    let config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_no_client_auth()
        .with_single_cert(vec![cert.der().clone()], key)
        .unwrap();
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let accepted = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&accepted);

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            if counter.fetch_add(1, Ordering::SeqCst) < drop_first {
                drop(stream);
                continue;
            }
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                let Ok(mut tls) = acceptor.accept(stream).await else {
                    return;
                };
                let mut request = Vec::new();
                let mut chunk = [0_u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match tls.read(&mut chunk).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => request.extend_from_slice(&chunk[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                     content-length: {}\r\nconnection: close\r\n\r\n{VERSION_BODY}",
                    VERSION_BODY.len()
                );
                let _ = tls.write_all(response.as_bytes()).await;
                let _ = tls.shutdown().await;
            });
        }
    });

    (port, accepted)
}

fn local(port: u16) -> ConnectionTarget {
    ConnectionTarget::new("127.0.0.1").with_port(port)
}

#[tokio::test]
async fn insecure_transport_accepts_self_signed_foreign_certificate() {
    let (port, _) = serve_self_signed(0).await;
    let client = PveClient::new(local(port).danger_accept_invalid_tls()).unwrap();

    let version = client.version().await.unwrap();
    assert_eq!(version.version, "8.2.4");
}

#[tokio::test]
async fn verifying_transport_rejects_self_signed_certificate() {
    let (port, _) = serve_self_signed(0).await;
    let client = PveClient::new(local(port)).unwrap();

    let err = client.version().await.unwrap_err();
    assert!(matches!(err, Error::Network { .. }), "{err:?}");
}

#[tokio::test]
async fn get_is_retried_once_after_failed_connect() {
    let (port, accepted) = serve_self_signed(1).await;
    let client = PveClient::new(local(port).danger_accept_invalid_tls()).unwrap();

    let version = client.version().await.unwrap();
    assert_eq!(version.version, "8.2.4");
    assert_eq!(accepted.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn post_is_not_retried_after_failed_connect() {
    let (port, accepted) = serve_self_signed(1).await;
    let target = local(port).danger_accept_invalid_tls();
    let transport = TransportConfig::for_target(&target);
    let session = Session::new("ABCDEF", "XYZ", "root@pam");
    let client = PveClient::with_session(target, transport, session).unwrap();

    let err = client
        .vm_action("pve", 100, GuestAction::Start)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Network { .. }), "{err:?}");
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}
