//! DNS mail-exchanger resolution.
//!
//! [`resolve_domain`] performs exactly one MX query per call and selects the
//! preferred exchanger; [`check_mx`] exposes the raw record list.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{LookupMx, build_resolver, check_mx, resolve_domain, select_preferred};
pub use types::{DomainVerificationResult, MxRecord, MxStatus};
