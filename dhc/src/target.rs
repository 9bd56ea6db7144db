use url::{Host, Url};

use crate::error::CheckError;

/// Endpoint under check, parsed from a URL or a bare host name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    url: Url,
    host: String,
}

impl Target {
    /// Parse URL, `https://` is assumed when scheme is absent
    ///
    /// ```
    /// # use dhc::Target;
    /// let target = Target::parse("www.example.com").unwrap();
    /// assert_eq!("https://www.example.com/", target.url());
    /// assert_eq!("www.example.com", target.host());
    /// assert_eq!("example.com", target.domain());
    /// ```
    pub fn parse<T>(input: T) -> Result<Self, CheckError>
    where
        T: AsRef<str>,
    {
        let input = input.as_ref().trim();
        let parsed = if input.contains("://") {
            Url::parse(input)
        } else {
            Url::parse(&format!("https://{input}"))
        };
        let url = parsed.map_err(|e| CheckError::InvalidUrl(input.to_string(), e.to_string()))?;
        let host = match url.host() {
            Some(Host::Domain(d)) if !d.is_empty() => d.to_string(),
            Some(Host::Ipv4(a)) => a.to_string(),
            Some(Host::Ipv6(a)) => a.to_string(),
            _ => {
                return Err(CheckError::InvalidUrl(
                    input.to_string(),
                    "no host".to_string(),
                ))
            }
        };
        Ok(Target { url, host })
    }

    /// Normalized URL to request
    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Host name or IP address without port
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Domain name for registration lookup, host without leading `www.`
    pub fn domain(&self) -> &str {
        self.host.strip_prefix("www.").unwrap_or(&self.host)
    }
}
