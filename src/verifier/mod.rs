//! Verification pipeline.
//!
//! [`Verifier::ping`] runs the gates in order and returns at the first one
//! that decides: empty input, grammar, disposable domain, MX resolution, then
//! the SMTP probe with a bounded retry loop. [`Verifier::ping_batch`] fans
//! the pipeline out over a list of addresses.

mod batch;
mod error;
mod options;

pub use error::VerifyError;
pub use options::{
    DEFAULT_ATTEMPTS, DEFAULT_FQDN, DEFAULT_MAX_BATCH_SIZE, DEFAULT_MAX_CONCURRENCY, DEFAULT_PORT,
    DEFAULT_SENDER, DEFAULT_TIMEOUT_MS, VerificationOptions,
};

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::disposable::{DisposableCheck, DisposableRegistry};
use crate::log::{Logger, NoopLogger, TracingLogger};
use crate::mx::{LookupMx, build_resolver, resolve_domain};
use crate::smtp::{Connector, Envelope, SmtpProbe, TcpConnector};
use crate::types::{PingResult, ResultCode};
use crate::validator::is_syntax_valid;

/// Verifies addresses. Cheap to clone; clones share options and collaborators.
#[derive(Clone)]
pub struct Verifier {
    inner: Arc<Inner>,
}

struct Inner {
    options: VerificationOptions,
    lookup: Box<dyn LookupMx>,
    disposable: Box<dyn DisposableCheck>,
    connector: Box<dyn Connector>,
    logger: Box<dyn Logger>,
}

/// Assembles a [`Verifier`]; every collaborator not supplied gets its
/// production default.
pub struct VerifierBuilder {
    options: VerificationOptions,
    lookup: Option<Box<dyn LookupMx>>,
    disposable: Option<Box<dyn DisposableCheck>>,
    connector: Option<Box<dyn Connector>>,
    logger: Option<Box<dyn Logger>>,
}

impl VerifierBuilder {
    pub fn lookup(mut self, lookup: impl LookupMx + 'static) -> Self {
        self.lookup = Some(Box::new(lookup));
        self
    }

    pub fn disposable(mut self, disposable: impl DisposableCheck + 'static) -> Self {
        self.disposable = Some(Box::new(disposable));
        self
    }

    pub fn connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Some(Box::new(connector));
        self
    }

    pub fn logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Some(Box::new(logger));
        self
    }

    pub fn build(self) -> Result<Verifier, VerifyError> {
        self.options.validate()?;
        let lookup = match self.lookup {
            Some(lookup) => lookup,
            None => Box::new(build_resolver(self.options.timeout())?),
        };
        let logger = self.logger.unwrap_or_else(|| {
            if self.options.debug {
                Box::new(TracingLogger)
            } else {
                Box::new(NoopLogger)
            }
        });
        Ok(Verifier {
            inner: Arc::new(Inner {
                lookup,
                disposable: self
                    .disposable
                    .unwrap_or_else(|| Box::new(DisposableRegistry::new())),
                connector: self.connector.unwrap_or_else(|| Box::new(TcpConnector)),
                logger,
                options: self.options,
            }),
        })
    }
}

impl Verifier {
    /// System DNS, built-in disposable list, plain TCP.
    pub fn new(options: VerificationOptions) -> Result<Self, VerifyError> {
        Self::builder(options).build()
    }

    pub fn builder(options: VerificationOptions) -> VerifierBuilder {
        VerifierBuilder {
            options,
            lookup: None,
            disposable: None,
            connector: None,
            logger: None,
        }
    }

    pub fn options(&self) -> &VerificationOptions {
        &self.inner.options
    }

    pub async fn ping(&self, email: &str) -> Result<PingResult, VerifyError> {
        self.ping_with_cancel(email, &CancellationToken::new()).await
    }

    /// Like [`ping`](Self::ping); `cancel` is honoured before the pipeline
    /// starts, during DNS and SMTP I/O, and between retry attempts.
    pub async fn ping_with_cancel(
        &self,
        email: &str,
        cancel: &CancellationToken,
    ) -> Result<PingResult, VerifyError> {
        if cancel.is_cancelled() {
            return Err(VerifyError::Cancelled);
        }
        let inner = &*self.inner;
        let log = inner.logger.as_ref();

        if email.is_empty() {
            return Ok(PingResult::classified(email, ResultCode::EmailRequired));
        }
        if !is_syntax_valid(email) {
            log.info(&format!("Invalid syntax: {email}"));
            return Ok(PingResult::classified(email, ResultCode::InvalidSyntax));
        }
        if inner.disposable.is_disposable(email) {
            log.info(&format!("Disposable domain: {email}"));
            return Ok(PingResult::classified(email, ResultCode::DisposableEmail));
        }

        let domain = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(VerifyError::Cancelled),
            domain = resolve_domain(inner.lookup.as_ref(), email) => domain,
        };
        if !domain.valid {
            log.error(&format!("Domain check failed for {email}: {}", domain.code));
            return Ok(PingResult::classified(email, domain.code));
        }
        if inner.options.ignore_smtp_verify && domain.found_mx {
            return Ok(PingResult::classified(email, ResultCode::ValidIgnoredSmtp));
        }

        match domain.exchange_host {
            Some(exchange) => self.probe_with_retries(email, &exchange, cancel).await,
            None => {
                log.error(&format!("No usable exchange host for {email}"));
                Ok(PingResult::classified(email, ResultCode::UnableToVerify))
            }
        }
    }

    async fn probe_with_retries(
        &self,
        email: &str,
        exchange: &str,
        cancel: &CancellationToken,
    ) -> Result<PingResult, VerifyError> {
        let inner = &*self.inner;
        let options = &inner.options;
        let log = inner.logger.as_ref();
        let probe = SmtpProbe::new(
            inner.connector.as_ref(),
            log,
            options.port,
            options.timeout(),
        );
        let envelope = Envelope {
            fqdn: &options.fqdn,
            sender: &options.sender,
            recipient: email,
        };

        for attempt in 1..=options.attempts {
            if cancel.is_cancelled() {
                return Err(VerifyError::Cancelled);
            }
            log.info(&format!(
                "SMTP attempt {attempt}/{} for {email} via {exchange}",
                options.attempts
            ));
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(VerifyError::Cancelled),
                result = probe.run(exchange, &envelope) => result,
            };
            if result.is_final() {
                return Ok(PingResult::from_smtp(email, &result));
            }
            log.info(&format!("{exchange} asked to retry later"));
        }

        log.error(&format!(
            "Giving up on {email} after {} attempts",
            options.attempts
        ));
        Ok(PingResult::attempts_exceeded(email))
    }
}
