use std::fmt;

use chrono::{TimeZone as _, Utc};
use num_format::{Locale, ToFormattedString as _};

use crate::check_result::{CheckResult, CheckStatus, TlsExpiry};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mark {
    Ok,
    Warning,
    Failed,
    Unknown,
}

impl Mark {
    fn icon(self, ascii: bool) -> &'static str {
        match (self, ascii) {
            (Mark::Ok, true) => "[v]",
            (Mark::Ok, false) => "\u{2705}",
            (Mark::Warning, true) => "[-]",
            (Mark::Warning, false) => "\u{26a0}\u{fe0f}",
            (Mark::Failed, true) => "[x]",
            (Mark::Failed, false) => "\u{274c}",
            (Mark::Unknown, true) => "[?]",
            (Mark::Unknown, false) => "\u{2753}",
        }
    }
}

/// Outcomes of HTTP, TLS and domain checks against one target
#[derive(Clone, Debug)]
pub struct Report {
    /// HTTP check
    pub http: CheckResult,
    /// TLS check
    pub tls: TlsExpiry,
    /// Domain check
    pub domain_days_left: Option<i64>,
    /// Host dialed by TLS check
    pub host: String,
    /// Domain name looked up by domain check
    pub domain: String,
    /// ASCII only?
    pub ascii: bool,
    /// Certificate expiring within these days is a warning
    pub tls_grace_in_days: i64,
    /// Registration expiring within these days is a warning
    pub domain_grace_in_days: i64,
}

impl Report {
    /// Create a report with default grace periods, 7 days for TLS and 30 days for domain
    pub fn new<T, U>(
        http: CheckResult,
        tls: TlsExpiry,
        domain_days_left: Option<i64>,
        host: T,
        domain: U,
    ) -> Self
    where
        T: Into<String>,
        U: Into<String>,
    {
        Report {
            http,
            tls,
            domain_days_left,
            host: host.into(),
            domain: domain.into(),
            ascii: false,
            tls_grace_in_days: 7,
            domain_grace_in_days: 30,
        }
    }

    /// All outcomes folded into one [`CheckResult`], status follows HTTP check
    pub fn merged(&self) -> CheckResult {
        CheckResult {
            tls: Some(self.tls),
            domain_days_left: self.domain_days_left,
            ..self.http.clone()
        }
    }

    /// Certificate will expire in grace period?
    pub fn tls_warned(&self) -> bool {
        self.tls
            .days()
            .map_or(false, |days| days < self.tls_grace_in_days)
    }

    /// Registration will expire in grace period?
    pub fn domain_warned(&self) -> bool {
        self.domain_days_left
            .map_or(false, |days| days < self.domain_grace_in_days)
    }

    /// No check failed and nothing expires in its grace period
    ///
    /// ```
    /// # use dhc::{CheckResult, Report, TlsExpiry};
    /// let tls = TlsExpiry::DaysRemaining { days: 60, not_after: 0 };
    /// let http = CheckResult::ok("https://example.com", 200);
    /// let report = Report::new(http, tls, Some(90), "example.com", "example.com");
    /// assert!(report.is_healthy());
    /// ```
    pub fn is_healthy(&self) -> bool {
        self.http.is_ok()
            && matches!(self.tls, TlsExpiry::DaysRemaining { .. })
            && !self.tls_warned()
            && !self.domain_warned()
    }

    fn http_mark(&self) -> Mark {
        match self.http.status {
            CheckStatus::Ok => Mark::Ok,
            CheckStatus::Error => Mark::Failed,
        }
    }

    fn tls_mark(&self) -> Mark {
        match self.tls {
            TlsExpiry::DaysRemaining { days, .. } if days < 0 => Mark::Failed,
            TlsExpiry::DaysRemaining { .. } if self.tls_warned() => Mark::Warning,
            TlsExpiry::DaysRemaining { .. } => Mark::Ok,
            TlsExpiry::Unavailable | TlsExpiry::NoCertificate => Mark::Failed,
        }
    }

    fn domain_mark(&self) -> Mark {
        match self.domain_days_left {
            Some(days) if days < 0 => Mark::Failed,
            Some(_) if self.domain_warned() => Mark::Warning,
            Some(_) => Mark::Ok,
            None => Mark::Unknown,
        }
    }

    /// Human-readable sentence of certificate expiry
    pub fn tls_sentence(&self) -> String {
        let host = &self.host;
        match self.tls {
            TlsExpiry::Unavailable => format!("TLS check of {host} failed or not HTTPS"),
            TlsExpiry::NoCertificate => format!("no certificate presented by {host}"),
            TlsExpiry::DaysRemaining { days, not_after } => {
                let r = Utc
                    .timestamp_opt(not_after, 0)
                    .single()
                    .map_or_else(|| not_after.to_string(), |t| t.to_rfc3339());
                if days < 0 {
                    let ago = (-days).to_formatted_string(&Locale::en);
                    format!("certificate of {host} has expired {ago} days ago ({r})")
                } else {
                    let days = days.to_formatted_string(&Locale::en);
                    format!("certificate of {host} expires in {days} days ({r})")
                }
            }
        }
    }

    /// Human-readable sentence of domain registration expiry
    pub fn domain_sentence(&self) -> String {
        let domain = &self.domain;
        match self.domain_days_left {
            Some(days) if days < 0 => {
                let ago = (-days).to_formatted_string(&Locale::en);
                format!("domain {domain} has expired {ago} days ago")
            }
            Some(days) => {
                let days = days.to_formatted_string(&Locale::en);
                format!("domain {domain} expires in {days} days")
            }
            None => format!("domain expiry of {domain} is unknown"),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ascii = self.ascii;
        writeln!(f, "--- HTTP/HTTPS check ---")?;
        writeln!(f, "{} {}", self.http_mark().icon(ascii), self.http)?;
        writeln!(f, "--- TLS certificate check ---")?;
        writeln!(f, "{} {}", self.tls_mark().icon(ascii), self.tls_sentence())?;
        writeln!(f, "--- Domain expiry check ---")?;
        writeln!(
            f,
            "{} {}",
            self.domain_mark().icon(ascii),
            self.domain_sentence()
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use chrono::{Duration, SubsecRound as _};

    fn build_report(tls: TlsExpiry, domain_days_left: Option<i64>) -> Report {
        let http = CheckResult::ok("https://www.example.com", 200);
        let mut report = Report::new(
            http,
            tls,
            domain_days_left,
            "www.example.com",
            "example.com",
        );
        report.ascii = true;
        report
    }

    fn days_remaining(days: i64) -> (TlsExpiry, String) {
        let not_after = Utc::now().round_subsecs(0) + Duration::days(days);
        let tls = TlsExpiry::DaysRemaining {
            days,
            not_after: not_after.timestamp(),
        };
        (tls, not_after.to_rfc3339())
    }

    #[test]
    fn t_display() {
        let (tls, r) = days_remaining(1024);
        let report = build_report(tls, Some(90));
        let expected = format!(
            "--- HTTP/HTTPS check ---\n\
            [v] https://www.example.com: OK (HTTP 200)\n\
            --- TLS certificate check ---\n\
            [v] certificate of www.example.com expires in 1,024 days ({r})\n\
            --- Domain expiry check ---\n\
            [v] domain example.com expires in 90 days\n"
        );
        assert_eq!(expected, report.to_string());
        assert!(report.is_healthy());
    }

    #[test]
    fn t_display_unicode() {
        let (tls, _) = days_remaining(3);
        let mut report = build_report(tls, None);
        report.ascii = false;
        let s = report.to_string();
        assert!(s.contains("\u{2705} https://www.example.com: OK (HTTP 200)"));
        assert!(s.contains("\u{26a0}\u{fe0f} certificate of www.example.com expires in 3 days"));
        assert!(s.contains("\u{2753} domain expiry of example.com is unknown"));
    }

    #[test]
    fn t_tls_warning() {
        let (tls, _) = days_remaining(3);
        let report = build_report(tls, Some(90));
        assert!(report.tls_warned());
        assert_eq!(Mark::Warning, report.tls_mark());
        assert!(!report.is_healthy());
    }

    #[test]
    fn t_tls_expired() {
        let (tls, r) = days_remaining(-12);
        let report = build_report(tls, Some(90));
        assert_eq!(Mark::Failed, report.tls_mark());
        assert_eq!(
            format!("certificate of www.example.com has expired 12 days ago ({r})"),
            report.tls_sentence()
        );
        assert!(!report.is_healthy());
    }

    #[test]
    fn t_tls_unavailable() {
        let report = build_report(TlsExpiry::Unavailable, Some(90));
        assert_eq!(
            "TLS check of www.example.com failed or not HTTPS",
            report.tls_sentence()
        );
        assert!(!report.is_healthy());

        let report = build_report(TlsExpiry::NoCertificate, Some(90));
        assert_eq!(
            "no certificate presented by www.example.com",
            report.tls_sentence()
        );
        assert!(!report.is_healthy());
    }

    #[test]
    fn t_domain_warning() {
        let (tls, _) = days_remaining(365);
        let report = build_report(tls, Some(29));
        assert!(report.domain_warned());
        assert_eq!(Mark::Warning, report.domain_mark());
        assert!(!report.is_healthy());

        let report = build_report(tls, Some(30));
        assert!(!report.domain_warned());
        assert!(report.is_healthy());
    }

    #[test]
    fn t_domain_unknown_is_not_unhealthy() {
        let (tls, _) = days_remaining(365);
        let report = build_report(tls, None);
        assert_eq!(Mark::Unknown, report.domain_mark());
        assert!(report.is_healthy());
    }

    #[test]
    fn t_http_failure() {
        let (tls, _) = days_remaining(365);
        let mut report = build_report(tls, Some(90));
        report.http = CheckResult::bad_status("https://www.example.com", 502);
        assert!(!report.is_healthy());
        assert!(report
            .to_string()
            .contains("[x] https://www.example.com: ERROR (HTTP 502), bad HTTP status code: 502"));
    }

    #[test]
    fn t_merged() {
        let (tls, _) = days_remaining(45);
        let report = build_report(tls, Some(90));
        let merged = report.merged();
        assert_eq!(CheckStatus::Ok, merged.status);
        assert_eq!(200, merged.http_status);
        assert_eq!(45, merged.tls_days_left());
        assert_eq!(Some(90), merged.domain_days_left);
    }
}
