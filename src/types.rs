use std::fmt;

/// Classification attached to every verification. Exactly one code is
/// produced per verified address.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Valid,
    ValidIgnoredSmtp,
    Invalid,
    ValidDomain,
    InvalidDomain,
    EmailRequired,
    NoMxRecords,
    InvalidSyntax,
    DisposableEmail,
    DomainVerificationFailed,
    SmtpConnectionError,
    UnableToVerify,
    ConnectionTimeout,
    AttemptsExceeded,
}

impl ResultCode {
    /// Only these two codes may accompany `valid = true`.
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid | Self::ValidIgnoredSmtp)
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Valid => "Valid email",
            Self::ValidIgnoredSmtp => "Valid email (SMTP verification ignored)",
            Self::Invalid => "Invalid email",
            Self::ValidDomain => "Valid domain",
            Self::InvalidDomain => "Invalid domain",
            Self::EmailRequired => "Email is required",
            Self::NoMxRecords => "No MX records found",
            Self::InvalidSyntax => "Invalid email syntax",
            Self::DisposableEmail => "Disposable email is not allowed",
            Self::DomainVerificationFailed => "Domain verification failed",
            Self::SmtpConnectionError => "SMTP connection error",
            Self::UnableToVerify => "Unable to verify email",
            Self::ConnectionTimeout => "Connection timeout",
            Self::AttemptsExceeded => "Maximum attempts exceeded",
        }
    }

    /// Stable identifier, e.g. `NO_MX_RECORDS`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::ValidIgnoredSmtp => "VALID_IGNORED_SMTP",
            Self::Invalid => "INVALID",
            Self::ValidDomain => "VALID_DOMAIN",
            Self::InvalidDomain => "INVALID_DOMAIN",
            Self::EmailRequired => "EMAIL_REQUIRED",
            Self::NoMxRecords => "NO_MX_RECORDS",
            Self::InvalidSyntax => "INVALID_SYNTAX",
            Self::DisposableEmail => "DISPOSABLE_EMAIL",
            Self::DomainVerificationFailed => "DOMAIN_VERIFICATION_FAILED",
            Self::SmtpConnectionError => "SMTP_CONNECTION_ERROR",
            Self::UnableToVerify => "UNABLE_TO_VERIFY",
            Self::ConnectionTimeout => "CONNECTION_TIMEOUT",
            Self::AttemptsExceeded => "ATTEMPTS_EXCEEDED",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Terminal result for one input address.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PingResult {
    pub email: String,
    pub valid: bool,
    /// The pipeline reached a classified outcome without a transport failure.
    pub completed: bool,
    pub code: ResultCode,
}

impl PingResult {
    /// Result of a pre-SMTP gate; `valid` follows the code.
    pub fn classified(email: impl Into<String>, code: ResultCode) -> Self {
        Self {
            email: email.into(),
            valid: code.is_valid(),
            completed: true,
            code,
        }
    }

    pub fn from_smtp(email: impl Into<String>, smtp: &crate::smtp::SmtpVerificationResult) -> Self {
        Self {
            email: email.into(),
            valid: smtp.valid && smtp.code.is_valid(),
            completed: smtp.completed,
            code: smtp.code,
        }
    }

    pub fn attempts_exceeded(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            valid: false,
            completed: false,
            code: ResultCode::AttemptsExceeded,
        }
    }
}
