use std::time::Duration;

use async_trait::async_trait;
use trust_dns_resolver::TokioAsyncResolver;
use trust_dns_resolver::error::ResolveError;

use super::{DomainVerificationResult, Error, MxRecord, MxStatus};
use crate::validator::domain_of;

/// Mail-exchanger lookup capability. Implementations return records in the
/// order the resolver produced them.
#[async_trait]
pub trait LookupMx: Send + Sync {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

#[async_trait]
impl LookupMx for TokioAsyncResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = self.mx_lookup(domain).await?;
        let mut records = Vec::new();
        for mx in lookup.iter() {
            let exchange = normalize_exchange(mx.exchange().to_utf8());
            records.push(MxRecord::new(mx.preference(), exchange));
        }
        Ok(records)
    }
}

/// Builds a tokio resolver from the system configuration. Each query gets a
/// single attempt bounded by `timeout`.
pub fn build_resolver(timeout: Duration) -> Result<TokioAsyncResolver, Error> {
    let (config, mut opts) =
        trust_dns_resolver::system_conf::read_system_conf().map_err(Error::system_config)?;
    opts.timeout = timeout;
    opts.attempts = 1;
    Ok(TokioAsyncResolver::tokio(config, opts))
}

/// Looks up MX records for `domain`, IDNA-normalised first.
pub async fn check_mx(lookup: &dyn LookupMx, domain: &str) -> Result<MxStatus, Error> {
    let ascii = normalize_domain(domain)?;
    let records = lookup
        .lookup_mx(&ascii)
        .await
        .map_err(|source| Error::query(&ascii, source))?;
    if records.is_empty() {
        Ok(MxStatus::NoRecords)
    } else {
        Ok(MxStatus::Records(records))
    }
}

/// Resolves the domain of `email` and picks its preferred exchanger.
///
/// Empty answers give `NoMxRecords`; every failure (bad domain, NXDOMAIN,
/// timeout, SERVFAIL, no-data responses) gives `DomainVerificationFailed`.
pub async fn resolve_domain(lookup: &dyn LookupMx, email: &str) -> DomainVerificationResult {
    let Some(domain) = domain_of(email) else {
        return DomainVerificationResult::lookup_failed();
    };
    match check_mx(lookup, &domain).await {
        Ok(MxStatus::NoRecords) => DomainVerificationResult::no_records(),
        Ok(MxStatus::Records(records)) => {
            let exchange_host = select_preferred(&records)
                .map(|record| record.exchange.clone())
                .filter(|exchange| !exchange.is_empty());
            DomainVerificationResult::found(exchange_host)
        }
        Err(_) => DomainVerificationResult::lookup_failed(),
    }
}

/// Lowest preference wins; among equals the first record returned wins.
pub fn select_preferred(records: &[MxRecord]) -> Option<&MxRecord> {
    records.iter().min_by_key(|record| record.preference)
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, Error> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(|source| Error::invalid_domain(trimmed, source))
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}
