#![forbid(unsafe_code)]
//! mailping_lib: e-mail deliverability probing.
//!
//! Syntax check, disposable-domain screen, MX resolution and a partial SMTP
//! dialogue (`EHLO`, `MAIL FROM`, `RCPT TO`, `QUIT`) that never sends a
//! message body. Start from [`Verifier`].

pub mod disposable;
pub mod log;
pub mod mx;
pub mod smtp;
pub mod types;
pub mod validator;
pub mod verifier;

pub use disposable::{DisposableCheck, DisposableRegistry};
pub use log::{Logger, NoopLogger, TracingLogger};
pub use mx::{
    DomainVerificationResult, Error as MxError, LookupMx, MxRecord, MxStatus, check_mx,
    resolve_domain,
};
pub use smtp::{Connector, SmtpVerificationResult, TcpConnector};
pub use tokio_util::sync::CancellationToken;
pub use types::{PingResult, ResultCode};
pub use validator::{domain_of, is_syntax_valid};
pub use verifier::{VerificationOptions, Verifier, VerifierBuilder, VerifyError};
