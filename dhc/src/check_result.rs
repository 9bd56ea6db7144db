use std::fmt;

use serde::Serialize;

use crate::error::CheckError;

/// Overall outcome of a check
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed
    Ok,
    /// Check failed, see [`CheckResult::error_details`]
    Error,
}

impl Default for CheckStatus {
    fn default() -> Self {
        CheckStatus::Ok
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckStatus::Ok => write!(f, "OK"),
            CheckStatus::Error => write!(f, "ERROR"),
        }
    }
}

/// Expiry of the TLS certificate presented by a host
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TlsExpiry {
    /// Connection or handshake failed, or the host does not speak TLS
    Unavailable,
    /// Handshake succeeded but the peer presented no certificate
    NoCertificate,
    /// First certificate of the chain was inspected
    DaysRemaining {
        /// Whole days until expiration, negative once expired
        days: i64,
        /// Exact expiration time in seconds since Unix epoch
        not_after: i64,
    },
}

impl TlsExpiry {
    /// Legacy integer form: `-1` when unavailable, `0` without certificate,
    /// remaining days otherwise
    ///
    /// ```
    /// # use dhc::TlsExpiry;
    /// assert_eq!(-1, TlsExpiry::Unavailable.sentinel());
    /// assert_eq!(0, TlsExpiry::NoCertificate.sentinel());
    /// ```
    pub fn sentinel(&self) -> i64 {
        match self {
            TlsExpiry::Unavailable => -1,
            TlsExpiry::NoCertificate => 0,
            TlsExpiry::DaysRemaining { days, .. } => *days,
        }
    }

    /// Remaining days if a certificate was inspected
    pub fn days(&self) -> Option<i64> {
        match self {
            TlsExpiry::DaysRemaining { days, .. } => Some(*days),
            _ => None,
        }
    }
}

/// Check result
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CheckResult {
    /// URL that got checked
    pub url: String,
    /// Outcome
    pub status: CheckStatus,
    /// HTTP response status code, 0 when no response was received
    pub http_status: u16,
    /// TLS certificate expiry, `None` when not checked
    pub tls: Option<TlsExpiry>,
    /// Days until domain registration expires, `None` when unknown
    pub domain_days_left: Option<i64>,
    /// Human-readable failure, empty on success
    pub error_details: String,
    /// Elapsed time in milliseconds
    pub elapsed: Option<u128>,
}

impl CheckResult {
    /// Successful response with status code below 400
    ///
    /// ```
    /// # use dhc::{CheckResult, CheckStatus};
    /// let result = CheckResult::ok("https://example.com", 200);
    /// assert_eq!(CheckStatus::Ok, result.status);
    /// ```
    pub fn ok<T>(url: T, http_status: u16) -> Self
    where
        T: Into<String>,
    {
        CheckResult {
            url: url.into(),
            status: CheckStatus::Ok,
            http_status,
            ..Default::default()
        }
    }

    /// Error occurred before any response was received
    ///
    /// ```
    /// # use dhc::CheckResult;
    /// let result = CheckResult::error("https://example.invalid", "invalid DNS lookup");
    /// assert_eq!(0, result.http_status);
    /// ```
    pub fn error<T, U>(url: T, e: U) -> Self
    where
        T: Into<String>,
        U: fmt::Display,
    {
        CheckResult {
            url: url.into(),
            status: CheckStatus::Error,
            error_details: e.to_string(),
            ..Default::default()
        }
    }

    /// Response with status code of 400 or above
    pub fn bad_status<T>(url: T, http_status: u16) -> Self
    where
        T: Into<String>,
    {
        CheckResult {
            http_status,
            ..CheckResult::error(url, CheckError::BadStatus(http_status))
        }
    }

    /// Is the outcome [`CheckStatus::Ok`]?
    pub fn is_ok(&self) -> bool {
        self.status == CheckStatus::Ok
    }

    /// TLS days left in legacy integer form, `-1` when not checked
    pub fn tls_days_left(&self) -> i64 {
        self.tls.as_ref().map_or(-1, TlsExpiry::sentinel)
    }
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::with_capacity(100);

        s.push_str(&format!("{}: {}", self.url, self.status));

        if self.http_status > 0 {
            s.push_str(&format!(" (HTTP {})", self.http_status));
        }

        if !self.error_details.is_empty() {
            s.push_str(&format!(", {}", self.error_details));
        }

        if let Some(elapsed) = self.elapsed {
            s.push_str(&format!(", {elapsed}ms elapsed"));
        }

        write!(f, "{s}")
    }
}

/// Check result in JSON format
#[derive(Debug, Default, Serialize)]
pub struct CheckResultJSON {
    /// `OK` or `ERROR`
    pub status: String,
    /// URL that got checked
    pub url: String,
    /// HTTP response status code
    pub http_status: u16,
    /// Days until certificate expiry, -1 when unavailable and 0 without certificate
    pub tls_days_left: i64,
    /// Days until domain registration expiry
    pub domain_days_left: Option<i64>,
    /// Human-readable failure
    pub error_details: String,
    /// Elapsed time in milliseconds
    pub elapsed: u64,
}

impl CheckResultJSON {
    /// Convert result to JSON
    ///
    /// ```
    /// # use dhc::{CheckResult, CheckResultJSON};
    /// let result = CheckResult::ok("https://example.com", 200);
    /// let json = CheckResultJSON::new(&result);
    /// assert_eq!("OK", json.status);
    /// ```
    pub fn new(result: &CheckResult) -> CheckResultJSON {
        CheckResultJSON {
            status: result.status.to_string(),
            url: result.url.clone(),
            http_status: result.http_status,
            tls_days_left: result.tls_days_left(),
            domain_days_left: result.domain_days_left,
            error_details: result.error_details.clone(),
            elapsed: result
                .elapsed
                .map_or(0, |e| u64::try_from(e).unwrap_or(u64::MAX)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn t_display_ok() {
        let result = CheckResult::ok("https://example.com", 200);
        assert_eq!("https://example.com: OK (HTTP 200)", result.to_string());
    }

    #[test]
    fn t_display_bad_status() {
        let result = CheckResult::bad_status("https://example.com", 503);
        assert_eq!(CheckStatus::Error, result.status);
        assert_eq!(503, result.http_status);
        assert_eq!(
            "https://example.com: ERROR (HTTP 503), bad HTTP status code: 503",
            result.to_string()
        );
    }

    #[test]
    fn t_display_error_with_elapsed() {
        let mut result = CheckResult::error("https://example.invalid", "boom");
        result.elapsed = Some(42);
        assert_eq!(
            "https://example.invalid: ERROR, boom, 42ms elapsed",
            result.to_string()
        );
    }

    #[test]
    fn t_tls_days_left() {
        let mut result = CheckResult::ok("https://example.com", 200);
        assert_eq!(-1, result.tls_days_left());

        result.tls = Some(TlsExpiry::NoCertificate);
        assert_eq!(0, result.tls_days_left());

        result.tls = Some(TlsExpiry::DaysRemaining {
            days: -3,
            not_after: 0,
        });
        assert_eq!(-3, result.tls_days_left());
    }

    #[test]
    fn t_json() -> anyhow::Result<()> {
        let mut result = CheckResult::ok("https://example.com", 200);
        result.tls = Some(TlsExpiry::Unavailable);
        result.domain_days_left = Some(90);

        let json = serde_json::to_value(CheckResultJSON::new(&result))?;
        assert_eq!("OK", json["status"]);
        assert_eq!(200, json["http_status"]);
        assert_eq!(-1, json["tls_days_left"]);
        assert_eq!(90, json["domain_days_left"]);
        assert_eq!("", json["error_details"]);
        Ok(())
    }
}
