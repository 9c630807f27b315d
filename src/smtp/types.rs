use crate::types::ResultCode;

/// A buffered server reply, possibly several lines.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpReply {
    pub text: String,
}

impl SmtpReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Status code opening each line, skipping lines without one.
    pub fn codes(&self) -> impl Iterator<Item = u16> + '_ {
        self.text.lines().filter_map(|line| {
            let digits = line.get(..3)?;
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok()
        })
    }

    pub fn has_code(&self, code: u16) -> bool {
        self.codes().any(|c| c == code)
    }

    pub fn has_any_code(&self, codes: &[u16]) -> bool {
        self.codes().any(|c| codes.contains(&c))
    }
}

/// Envelope announced during the dialogue.
#[derive(Debug, Clone, Copy)]
pub struct Envelope<'a> {
    pub fqdn: &'a str,
    pub sender: &'a str,
    pub recipient: &'a str,
}

/// Outcome of one probe attempt.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmtpVerificationResult {
    pub valid: bool,
    /// The dialogue reached a terminal response without transport failure.
    pub completed: bool,
    /// The server asked to come back later (421/450/451 greeting).
    pub retryable: bool,
    pub code: ResultCode,
}

impl SmtpVerificationResult {
    pub fn accepted() -> Self {
        Self {
            valid: true,
            completed: true,
            retryable: false,
            code: ResultCode::Valid,
        }
    }

    /// A retryable rejection is not considered completed: the server never
    /// gave a conclusive answer.
    pub fn rejected(retryable: bool) -> Self {
        Self {
            valid: false,
            completed: !retryable,
            retryable,
            code: ResultCode::Invalid,
        }
    }

    pub fn connection_error() -> Self {
        Self::aborted(ResultCode::SmtpConnectionError)
    }

    pub fn timed_out() -> Self {
        Self::aborted(ResultCode::ConnectionTimeout)
    }

    fn aborted(code: ResultCode) -> Self {
        Self {
            valid: false,
            completed: false,
            retryable: false,
            code,
        }
    }

    /// The retry loop stops on a completed dialogue or a non-retryable failure.
    pub fn is_final(&self) -> bool {
        self.completed || !self.retryable
    }
}
