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

use std::process;
use std::time::Duration;

use clap::Parser;
use dhc::{
    CheckResultJSON, DomainChecker, HttpChecker, PlaceholderWhois, Report, Target, TlsChecker,
};
use log::{debug, warn};

#[derive(Debug, Parser)]
#[command(author, about, version)]
struct Opts {
    /// URL or domain name to check
    #[arg(env = "DHC_URL", default_value = "https://www.google.com")]
    url: String,
    /// Domain name of expiry check, derived from URL by default
    #[arg(long, env = "DHC_DOMAIN")]
    domain: Option<String>,
    /// ASCII
    #[arg(long)]
    ascii: bool,
    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,
    /// Print result in JSON
    #[arg(long)]
    json: bool,
    /// Timeout of HTTP request and TLS handshake in seconds
    #[arg(short, long, default_value = "10")]
    timeout: u64,
    /// Days until expiry reported by placeholder WHOIS lookup
    #[arg(long, default_value = "90")]
    placeholder_days: i64,
    /// Grace period of TLS certificate in days
    #[arg(long = "tls-grace", default_value = "7")]
    tls_grace_in_days: i64,
    /// Grace period of domain registration in days
    #[arg(long = "domain-grace", default_value = "30")]
    domain_grace_in_days: i64,
    /// Exit with status 1 if target is unhealthy
    #[arg(long)]
    exit_code: bool,
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let opts: Opts = Opts::parse();
    let report = check_command(&opts);

    if opts.json {
        let json = CheckResultJSON::new(&report.merged());
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print!("{report}");
    }

    if opts.exit_code && !report.is_healthy() {
        process::exit(1);
    }
    Ok(())
}

fn check_command(opts: &Opts) -> Report {
    let url = opts.url.as_str();
    let (host, derived_domain) = match Target::parse(url) {
        Ok(t) => (t.host().to_string(), t.domain().to_string()),
        Err(e) => {
            warn!("{e}");
            (url.to_string(), url.to_string())
        }
    };
    let domain = opts.domain.clone().unwrap_or(derived_domain);

    let timeout = Duration::from_secs(opts.timeout);
    let mut http_client = HttpChecker::with_timeout(timeout);
    http_client.elapsed = opts.verbose;
    let tls_client = TlsChecker::default().with_timeout(timeout);
    let domain_client = DomainChecker::new(PlaceholderWhois {
        days: opts.placeholder_days,
    });

    debug!("check HTTP of {url}");
    let http = http_client.check(url);
    debug!("check TLS certificate of {host}");
    let tls = tls_client.check(url);
    debug!("check registration of {domain}");
    let domain_days_left = domain_client.check(&domain);

    let mut report = Report::new(http, tls, domain_days_left, host, domain);
    report.ascii = opts.ascii || !supports_unicode::on(supports_unicode::Stream::Stdout);
    report.tls_grace_in_days = opts.tls_grace_in_days;
    report.domain_grace_in_days = opts.domain_grace_in_days;
    report
}
