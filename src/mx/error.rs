use std::io;

use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// Failures of the raw MX lookup. [`resolve_domain`](super::resolve_domain)
/// folds all of these into `DOMAIN_VERIFICATION_FAILED`.
#[derive(Debug, Error)]
pub enum MxError {
    #[error("no domain to resolve")]
    EmptyDomain,
    #[error("`{domain}` cannot be converted to an ASCII host name")]
    InvalidDomain {
        domain: String,
        #[source]
        source: idna::Errors,
    },
    #[error("cannot load the system DNS configuration: {source}")]
    SystemConfig {
        #[source]
        source: io::Error,
    },
    #[error("MX query for `{domain}` failed: {source}")]
    Query {
        domain: String,
        #[source]
        source: ResolveError,
    },
}

impl MxError {
    pub(crate) fn invalid_domain(domain: &str, source: idna::Errors) -> Self {
        Self::InvalidDomain {
            domain: domain.to_string(),
            source,
        }
    }

    pub(crate) fn system_config(source: io::Error) -> Self {
        Self::SystemConfig { source }
    }

    pub(crate) fn query(domain: &str, source: ResolveError) -> Self {
        Self::Query {
            domain: domain.to_string(),
            source,
        }
    }

    /// Domain the failed operation was about, when there was one.
    pub fn domain(&self) -> Option<&str> {
        match self {
            Self::InvalidDomain { domain, .. } | Self::Query { domain, .. } => Some(domain),
            Self::EmptyDomain | Self::SystemConfig { .. } => None,
        }
    }
}
