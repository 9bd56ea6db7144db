use std::fmt;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs as _};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use anyhow::{bail, Context as _};
use chrono::{DateTime, TimeZone as _, Utc};
use log::debug;
use rustls::client::{ServerCertVerified, ServerCertVerifier};
use rustls::{Certificate, ClientConfig, ClientConnection, ServerName};
use x509_parser::parse_x509_certificate;

use crate::check_result::TlsExpiry;
use crate::target::Target;

const TLS_PORT: u16 = 443;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Whole days from `now` until `not_after`, truncated toward zero
///
/// ```
/// # use dhc::days_until;
/// use chrono::{Duration, Utc};
/// let now = Utc::now();
/// assert_eq!(2, days_until(now + Duration::hours(71), now));
/// assert_eq!(-1, days_until(now - Duration::hours(25), now));
/// ```
pub fn days_until(not_after: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (not_after - now).num_days()
}

// Expired, self-signed and mismatched certificates must still be readable.
struct AcceptAnyCertificate;

impl ServerCertVerifier for AcceptAnyCertificate {
    fn verify_server_cert(
        &self,
        _end_entity: &Certificate,
        _intermediates: &[Certificate],
        _server_name: &ServerName,
        _scts: &mut dyn Iterator<Item = &[u8]>,
        _ocsp_response: &[u8],
        _now: SystemTime,
    ) -> Result<ServerCertVerified, rustls::Error> {
        Ok(ServerCertVerified::assertion())
    }
}

// Socket whose reads and writes share one deadline instead of a timeout each.
struct DeadlineStream<'a> {
    socket: &'a mut TcpStream,
    deadline: Instant,
}

impl DeadlineStream<'_> {
    fn remaining(&self) -> io::Result<Duration> {
        match self.deadline.checked_duration_since(Instant::now()) {
            Some(d) if !d.is_zero() => Ok(d),
            _ => Err(io::Error::new(io::ErrorKind::TimedOut, "deadline exceeded")),
        }
    }
}

impl Read for DeadlineStream<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remaining = self.remaining()?;
        self.socket.set_read_timeout(Some(remaining))?;
        self.socket.read(buf)
    }
}

impl Write for DeadlineStream<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let remaining = self.remaining()?;
        self.socket.set_write_timeout(Some(remaining))?;
        self.socket.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.socket.flush()
    }
}

/// Checker for TLS certificate expiry
pub struct TlsChecker {
    config: Arc<ClientConfig>,
    port: u16,
    timeout: Duration,
}

impl fmt::Debug for TlsChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsChecker")
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for TlsChecker {
    fn default() -> TlsChecker {
        let config = ClientConfig::builder()
            .with_safe_defaults()
            .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate))
            .with_no_client_auth();

        TlsChecker {
            config: Arc::new(config),
            port: TLS_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl TlsChecker {
    /// Bound connect, and the whole handshake after it, by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Dial another port than 443
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Check expiry of the first certificate presented by the host of URL
    ///
    /// ```no_run
    /// # use dhc::{TlsChecker, TlsExpiry};
    /// let client = TlsChecker::default();
    /// if let TlsExpiry::DaysRemaining { days, .. } = client.check("https://example.com") {
    ///     println!("{days} days left");
    /// }
    /// ```
    pub fn check<T>(&self, url: T) -> TlsExpiry
    where
        T: AsRef<str>,
    {
        let url = url.as_ref();
        match self.do_check(url) {
            Ok(expiry) => expiry,
            Err(e) => {
                debug!("TLS check of {url} failed: {e:#}");
                TlsExpiry::Unavailable
            }
        }
    }

    fn do_check(&self, url: &str) -> anyhow::Result<TlsExpiry> {
        let target = Target::parse(url)?;
        let host = target.host();

        let server_name = ServerName::try_from(host)?;
        let mut conn = ClientConnection::new(self.config.clone(), server_name)?;
        let mut socket = self.connect(host)?;
        let mut stream = DeadlineStream {
            socket: &mut socket,
            deadline: Instant::now() + self.timeout,
        };

        while conn.is_handshaking() {
            conn.complete_io(&mut stream)
                .with_context(|| format!("TLS handshake with {host}:{} failed", self.port))?;
        }

        let expiry = match conn.peer_certificates().and_then(|c| c.first()) {
            None => TlsExpiry::NoCertificate,
            Some(certificate) => {
                let (_, cert) = parse_x509_certificate(certificate.as_ref())?;
                let not_after = Utc
                    .timestamp_opt(cert.validity().not_after.timestamp(), 0)
                    .single()
                    .context("certificate expiry out of range")?;
                TlsExpiry::DaysRemaining {
                    days: days_until(not_after, Utc::now()),
                    not_after: not_after.timestamp(),
                }
            }
        };

        conn.send_close_notify();
        if let Err(e) = conn.complete_io(&mut stream) {
            debug!("failed to close TLS connection with {host}: {e}");
        }
        Ok(expiry)
    }

    fn connect(&self, host: &str) -> anyhow::Result<TcpStream> {
        let addrs = (host, self.port)
            .to_socket_addrs()
            .with_context(|| format!("failed to resolve {host}"))?;

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(self.timeout))?;
                    stream.set_write_timeout(Some(self.timeout))?;
                    return Ok(stream);
                }
                Err(e) => {
                    debug!("failed to connect to {addr}: {e}");
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(e).with_context(|| format!("failed to connect to {host}:{}", self.port)),
            None => bail!("no address found for {host}"),
        }
    }
}
