use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

use tokio::sync::Semaphore;

use super::error::VerifyError;

pub const DEFAULT_PORT: u16 = 25;
pub const DEFAULT_FQDN: &str = "mail.example.org";
pub const DEFAULT_SENDER: &str = "name@example.org";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_MAX_BATCH_SIZE: usize = 50;
pub const DEFAULT_MAX_CONCURRENCY: usize = 50;

/// Settings shared read-only by every verification run by a
/// [`Verifier`](crate::Verifier).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "with-serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationOptions {
    /// SMTP port on the exchanger.
    pub port: u16,
    /// Client identity announced in `EHLO`.
    pub fqdn: String,
    /// Envelope sender used in `MAIL FROM`.
    pub sender: String,
    /// Deadline for one probe attempt (connect + dialogue), and for DNS queries.
    pub timeout_ms: u64,
    /// Upper bound on probe attempts when the server answers with a retry code.
    pub attempts: u32,
    /// Stop after the MX lookup and report `VALID_IGNORED_SMTP`.
    pub ignore_smtp_verify: bool,
    /// Route diagnostics to `tracing` instead of discarding them.
    pub debug: bool,
    /// Addresses beyond this count are dropped from a batch.
    pub max_batch_size: usize,
    /// Verifications of one batch allowed to run at the same time.
    pub max_concurrency: usize,
}

impl Default for VerificationOptions {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            fqdn: DEFAULT_FQDN.to_string(),
            sender: DEFAULT_SENDER.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            attempts: DEFAULT_ATTEMPTS,
            ignore_smtp_verify: false,
            debug: false,
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl VerificationOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_fqdn(mut self, fqdn: impl Into<String>) -> Self {
        self.fqdn = fqdn.into();
        self
    }

    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_ignore_smtp_verify(mut self, ignore: bool) -> Self {
        self.ignore_smtp_verify = ignore;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_max_batch_size(mut self, size: usize) -> Self {
        self.max_batch_size = size;
        self
    }

    pub fn with_max_concurrency(mut self, width: usize) -> Self {
        self.max_concurrency = width;
        self
    }

    pub fn validate(&self) -> Result<(), VerifyError> {
        let problem = if self.fqdn.trim().is_empty() {
            "fqdn must not be empty"
        } else if self.sender.trim().is_empty() {
            "sender must not be empty"
        } else if self.timeout_ms == 0 {
            "timeout must be greater than zero"
        } else if self.attempts == 0 {
            "attempts must be at least 1"
        } else if self.max_batch_size == 0 {
            "max_batch_size must be at least 1"
        } else if self.max_concurrency == 0 {
            "max_concurrency must be at least 1"
        } else if self.max_concurrency > Semaphore::MAX_PERMITS {
            "max_concurrency exceeds the semaphore permit limit"
        } else {
            return Ok(());
        };
        Err(VerifyError::InvalidOptions(problem.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let options = VerificationOptions::default();
        assert_eq!(options.port, 25);
        assert_eq!(options.fqdn, "mail.example.org");
        assert_eq!(options.sender, "name@example.org");
        assert_eq!(options.timeout(), Duration::from_secs(10));
        assert_eq!(options.attempts, 3);
        assert!(!options.ignore_smtp_verify);
        assert!(!options.debug);
        assert_eq!(options.max_batch_size, 50);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_attempts_and_width() {
        let err = VerificationOptions::default()
            .with_attempts(0)
            .validate()
            .expect_err("zero attempts");
        assert!(err.to_string().contains("attempts"));
        assert!(
            VerificationOptions::default()
                .with_max_concurrency(0)
                .validate()
                .is_err()
        );
        assert!(
            VerificationOptions::default()
                .with_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn validate_bounds_max_concurrency() {
        let err = VerificationOptions::default()
            .with_max_concurrency(usize::MAX)
            .validate()
            .expect_err("beyond the permit limit");
        assert!(matches!(err, VerifyError::InvalidOptions(_)));
        assert!(
            VerificationOptions::default()
                .with_max_concurrency(Semaphore::MAX_PERMITS)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn validate_rejects_blank_identity() {
        assert!(
            VerificationOptions::default()
                .with_fqdn(" ")
                .validate()
                .is_err()
        );
        assert!(
            VerificationOptions::default()
                .with_sender("")
                .validate()
                .is_err()
        );
    }
}
