use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::time::{Duration, Instant};

use log::debug;

use crate::check_result::CheckResult;
use crate::error::CheckError;
use crate::target::Target;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Checker for HTTP reachability
pub struct HttpChecker {
    agent: ureq::Agent,
    timeout: Duration,
    /// Record elapsed time in milliseconds?
    pub elapsed: bool,
}

impl fmt::Debug for HttpChecker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpChecker")
            .field("timeout", &self.timeout)
            .field("elapsed", &self.elapsed)
            .finish()
    }
}

impl Default for HttpChecker {
    fn default() -> HttpChecker {
        HttpChecker::with_timeout(DEFAULT_TIMEOUT)
    }
}

impl HttpChecker {
    /// Create a checker whose requests give up after `timeout`
    ///
    /// ```
    /// # use dhc::HttpChecker;
    /// use std::time::Duration;
    /// let client = HttpChecker::with_timeout(Duration::from_secs(3));
    /// ```
    pub fn with_timeout(timeout: Duration) -> HttpChecker {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        HttpChecker {
            agent,
            timeout,
            elapsed: false,
        }
    }

    /// GET the URL once and classify the outcome
    ///
    /// ```no_run
    /// # use dhc::HttpChecker;
    /// let client = HttpChecker::default();
    /// let result = client.check("https://example.com");
    /// println!("{result}");
    /// ```
    pub fn check<T>(&self, url: T) -> CheckResult
    where
        T: AsRef<str>,
    {
        let url = url.as_ref();
        let target = match Target::parse(url) {
            Ok(t) => t,
            Err(e) => return CheckResult::error(url, e),
        };

        let start = Instant::now();
        let mut result = match self.agent.get(target.url()).call() {
            Ok(response) => CheckResult::ok(url, response.status()),
            Err(ureq::Error::Status(code, _response)) => CheckResult::bad_status(url, code),
            Err(ureq::Error::Transport(transport)) => {
                CheckResult::error(url, classify_transport(&transport))
            }
        };
        let elapsed = start.elapsed();
        debug!("GET {} -> {:?} in {elapsed:?}", target.url(), result.status);

        if self.elapsed {
            result.elapsed = Some(elapsed.as_millis());
        }
        result
    }
}

// Transport errors render their URL, which must not take part in classification.
fn classify_transport(transport: &ureq::Transport) -> CheckError {
    let mut message = transport.kind().to_string();
    if let Some(m) = transport.message() {
        message.push_str(": ");
        message.push_str(m);
    }

    let mut rejected = false;
    let mut source = transport.source();
    while let Some(inner) = source {
        let m = inner.to_string();
        if !message.contains(&m) {
            message.push_str(": ");
            message.push_str(&m);
        }
        rejected |= rejects_certificate(inner);
        source = inner.source();
    }

    if rejected {
        CheckError::TlsVerification(message)
    } else {
        CheckError::Connection(message)
    }
}

// rustls errors arrive wrapped in io::Error by the TLS stream.
fn rejects_certificate(e: &(dyn StdError + 'static)) -> bool {
    let tls_error = e.downcast_ref::<rustls::Error>().or_else(|| {
        e.downcast_ref::<io::Error>()
            .and_then(|e| e.get_ref())
            .and_then(|e| e.downcast_ref::<rustls::Error>())
    });
    match tls_error {
        Some(e) => matches!(
            e,
            rustls::Error::InvalidCertificateEncoding
                | rustls::Error::InvalidCertificateSignatureType
                | rustls::Error::InvalidCertificateSignature
                | rustls::Error::InvalidCertificateData(_)
        ),
        None => e.to_string().contains("invalid peer certificate"),
    }
}
