use crate::types::ResultCode;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

/// Raw lookup outcome, records kept in the order the resolver returned them.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MxStatus {
    Records(Vec<MxRecord>),
    NoRecords,
}

impl MxStatus {
    pub fn records(&self) -> &[MxRecord] {
        match self {
            Self::Records(records) => records.as_slice(),
            Self::NoRecords => &[],
        }
    }
}

/// Outcome of [`resolve_domain`](crate::mx::resolve_domain).
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainVerificationResult {
    /// Preferred exchange. `None` for a null MX (`.`) even when `found_mx`.
    pub exchange_host: Option<String>,
    pub valid: bool,
    pub found_mx: bool,
    pub code: ResultCode,
}

impl DomainVerificationResult {
    pub(crate) fn found(exchange_host: Option<String>) -> Self {
        Self {
            exchange_host,
            valid: true,
            found_mx: true,
            code: ResultCode::ValidDomain,
        }
    }

    pub(crate) fn no_records() -> Self {
        Self::failed(ResultCode::NoMxRecords)
    }

    pub(crate) fn lookup_failed() -> Self {
        Self::failed(ResultCode::DomainVerificationFailed)
    }

    fn failed(code: ResultCode) -> Self {
        Self {
            exchange_host: None,
            valid: false,
            found_mx: false,
            code,
        }
    }
}
