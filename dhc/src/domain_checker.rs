use log::{debug, warn};

const PLACEHOLDER_DAYS: i64 = 90;

/// Source of domain registration expiry, e.g. a WHOIS or RDAP client
pub trait WhoisLookup {
    /// Whole days until registration of `domain` expires
    fn days_until_expiry(&self, domain: &str) -> anyhow::Result<i64>;
}

impl<W> WhoisLookup for &W
where
    W: WhoisLookup + ?Sized,
{
    fn days_until_expiry(&self, domain: &str) -> anyhow::Result<i64> {
        (**self).days_until_expiry(domain)
    }
}

impl<W> WhoisLookup for Box<W>
where
    W: WhoisLookup + ?Sized,
{
    fn days_until_expiry(&self, domain: &str) -> anyhow::Result<i64> {
        (**self).days_until_expiry(domain)
    }
}

/// Stand-in lookup answering a fixed number of days for every domain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaceholderWhois {
    /// Days reported for every domain
    pub days: i64,
}

impl Default for PlaceholderWhois {
    fn default() -> Self {
        PlaceholderWhois {
            days: PLACEHOLDER_DAYS,
        }
    }
}

impl WhoisLookup for PlaceholderWhois {
    fn days_until_expiry(&self, domain: &str) -> anyhow::Result<i64> {
        warn!(
            "WHOIS lookup is not implemented, assume {domain} expires in {} days",
            self.days
        );
        Ok(self.days)
    }
}

/// Checker for domain registration expiry
#[derive(Debug)]
pub struct DomainChecker<W> {
    lookup: W,
}

impl Default for DomainChecker<PlaceholderWhois> {
    fn default() -> Self {
        DomainChecker::new(PlaceholderWhois::default())
    }
}

impl<W> DomainChecker<W>
where
    W: WhoisLookup,
{
    /// Create a checker backed by `lookup`
    pub fn new(lookup: W) -> Self {
        DomainChecker { lookup }
    }

    /// Days until registration of domain name expires, `None` when the lookup failed
    ///
    /// ```
    /// # use dhc::{DomainChecker, PlaceholderWhois};
    /// let client = DomainChecker::new(PlaceholderWhois::default());
    /// assert_eq!(Some(90), client.check("example.com"));
    /// ```
    pub fn check<T>(&self, domain_name: T) -> Option<i64>
    where
        T: AsRef<str>,
    {
        let domain_name = domain_name.as_ref();
        match self.lookup.days_until_expiry(domain_name) {
            Ok(days) => {
                debug!("registration of {domain_name} expires in {days} days");
                Some(days)
            }
            Err(e) => {
                warn!("failed to look up registration of {domain_name}: {e:#}");
                None
            }
        }
    }
}
