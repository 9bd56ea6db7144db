use std::net::TcpListener;
use std::sync::Arc;
use std::thread;

use rcgen::{date_time_ymd, CertificateParams};
use rustls::{Certificate, PrivateKey, ServerConfig, ServerConnection};

/// Serve a self-signed certificate of `localhost` valid between two dates, return the port
pub(crate) fn serve_self_signed(not_before: (i32, u8, u8), not_after: (i32, u8, u8)) -> u16 {
    let mut params = CertificateParams::new(vec!["localhost".to_string()]);
    params.not_before = date_time_ymd(not_before.0, not_before.1, not_before.2);
    params.not_after = date_time_ymd(not_after.0, not_after.1, not_after.2);
    let cert = rcgen::Certificate::from_params(params).unwrap();

    let chain = vec![Certificate(cert.serialize_der().unwrap())];
    let key = PrivateKey(cert.serialize_private_key_der());
    let config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(chain, key)
        .unwrap();
    let config = Arc::new(config);

    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    thread::spawn(move || {
        for socket in listener.incoming() {
            let mut socket = match socket {
                Ok(s) => s,
                Err(_) => break,
            };
            let mut conn = ServerConnection::new(config.clone()).unwrap();
            while conn.is_handshaking() {
                if conn.complete_io(&mut socket).is_err() {
                    break;
                }
            }
            conn.send_close_notify();
            let _ = conn.complete_io(&mut socket);
        }
    });
    port
}
