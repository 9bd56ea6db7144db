#![deny(
    missing_docs,
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unstable_features,
    unused_import_braces,
    unused_qualifications
)]

//! Domain Health Check
//!
//! Checks one endpoint for HTTP reachability, TLS certificate expiry and
//! domain registration expiry.

pub use check_result::{CheckResult, CheckResultJSON, CheckStatus, TlsExpiry};
pub use domain_checker::{DomainChecker, PlaceholderWhois, WhoisLookup};
pub use error::CheckError;
pub use http_checker::HttpChecker;
pub use report::Report;
pub use target::Target;
pub use tls_checker::{days_until, TlsChecker};

mod check_result;
mod domain_checker;
mod error;
mod http_checker;
mod report;
mod target;
#[cfg(test)]
mod testing;
mod tls_checker;
