//! Throwaway-mailbox domain registry.
//!
//! The registry is fail-open: an input it cannot classify (no domain part,
//! unknown domain) is reported as *not* disposable.

mod domains;

use std::collections::HashSet;
use std::io::{self, BufRead};

use domains::DISPOSABLE_DOMAINS;

use crate::validator::domain_of;

/// Membership test against a disposable-domain registry.
pub trait DisposableCheck: Send + Sync {
    fn is_disposable(&self, email: &str) -> bool;
}

/// Embedded registry, optionally extended with extra domains at runtime.
#[derive(Debug, Clone, Default)]
pub struct DisposableRegistry {
    extra: HashSet<String>,
}

impl DisposableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds domains on top of the built-in list. Entries are trimmed and
    /// lower-cased; blank entries are ignored.
    pub fn with_extra<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for domain in domains {
            let domain = normalize(domain.as_ref());
            if !domain.is_empty() {
                self.extra.insert(domain);
            }
        }
        self
    }

    /// Reads one domain per line; `#` starts a comment.
    pub fn extend_from_reader<R: BufRead>(self, reader: R) -> io::Result<Self> {
        let mut domains = Vec::new();
        for line in reader.lines() {
            let line = line?;
            let entry = line.split('#').next().unwrap_or_default();
            domains.push(entry.to_string());
        }
        Ok(self.with_extra(domains))
    }

    pub fn contains_domain(&self, domain: &str) -> bool {
        let domain = normalize(domain);
        DISPOSABLE_DOMAINS.contains(domain.as_str()) || self.extra.contains(&domain)
    }
}

impl DisposableCheck for DisposableRegistry {
    fn is_disposable(&self, email: &str) -> bool {
        match domain_of(email) {
            Some(domain) => self.contains_domain(&domain),
            None => false,
        }
    }
}

fn normalize(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}
