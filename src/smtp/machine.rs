//! Client side of the probe dialogue as a pure transition function.
//!
//! The driver feeds every complete reply to [`transition`] and performs the
//! returned [`Step`]: write `send` (CRLF appended), then close if `close` is
//! set. When the connection ends, [`ProbeState::outcome_on_close`] gives the
//! result.

use super::types::{Envelope, SmtpReply, SmtpVerificationResult};

/// Greeting codes that ask the client to retry later.
pub const RETRY_CODES: [u16; 3] = [421, 450, 451];

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    AwaitBanner,
    AwaitEhloOk,
    AwaitMailOk,
    AwaitRcptResult,
    AwaitQuitAck,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeState {
    pub stage: Stage,
    /// RCPT TO was answered with 250 or 405.
    pub accepted: bool,
    /// Greeting carried a retry code.
    pub retryable: bool,
}

impl Default for ProbeState {
    fn default() -> Self {
        Self {
            stage: Stage::AwaitBanner,
            accepted: false,
            retryable: false,
        }
    }
}

impl ProbeState {
    pub fn is_closed(&self) -> bool {
        self.stage == Stage::Closed
    }

    pub fn outcome_on_close(&self) -> SmtpVerificationResult {
        if self.accepted {
            SmtpVerificationResult::accepted()
        } else {
            SmtpVerificationResult::rejected(self.retryable)
        }
    }

    fn at(self, stage: Stage) -> Self {
        Self { stage, ..self }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    pub state: ProbeState,
    pub send: Option<String>,
    pub close: bool,
}

impl Step {
    fn send(state: ProbeState, command: String) -> Self {
        Self {
            state,
            send: Some(command),
            close: false,
        }
    }

    fn close(state: ProbeState) -> Self {
        Self {
            state: state.at(Stage::Closed),
            send: None,
            close: true,
        }
    }
}

pub fn transition(state: ProbeState, reply: &SmtpReply, envelope: &Envelope<'_>) -> Step {
    match state.stage {
        Stage::AwaitBanner if reply.has_code(220) => Step::send(
            state.at(Stage::AwaitEhloOk),
            format!("EHLO {}", envelope.fqdn),
        ),
        Stage::AwaitBanner => Step::close(ProbeState {
            retryable: reply.has_any_code(&RETRY_CODES),
            ..state
        }),
        Stage::AwaitEhloOk if reply.has_code(250) => Step::send(
            state.at(Stage::AwaitMailOk),
            format!("MAIL FROM:<{}>", envelope.sender),
        ),
        Stage::AwaitMailOk if reply.has_code(250) => Step::send(
            state.at(Stage::AwaitRcptResult),
            format!("RCPT TO:<{}>", envelope.recipient),
        ),
        Stage::AwaitRcptResult => Step::send(
            ProbeState {
                stage: Stage::AwaitQuitAck,
                accepted: reply.has_code(250) || reply.has_code(405),
                ..state
            },
            "QUIT".to_string(),
        ),
        Stage::AwaitEhloOk | Stage::AwaitMailOk | Stage::AwaitQuitAck | Stage::Closed => {
            Step::close(state)
        }
    }
}

/// Upper bound on one buffered reply: eight 512-byte reply lines.
pub const MAX_REPLY_LEN: usize = 8 * 512;

/// The peer sent more than [`MAX_REPLY_LEN`] bytes without completing a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTooLong;

/// Accumulates raw bytes until they end in a line feed.
///
/// Multi-line continuation markers (`250-`) are not interpreted: a chunk that
/// happens to end on a line boundary is taken as the whole reply.
#[derive(Debug, Default)]
pub struct ReplyBuffer {
    buf: Vec<u8>,
}

impl ReplyBuffer {
    pub fn push(&mut self, bytes: &[u8]) -> Result<Option<SmtpReply>, ReplyTooLong> {
        self.buf.extend_from_slice(bytes);
        if self.buf.len() > MAX_REPLY_LEN {
            self.buf.clear();
            return Err(ReplyTooLong);
        }
        if self.buf.last() != Some(&b'\n') {
            return Ok(None);
        }
        let text = String::from_utf8_lossy(&self.buf).into_owned();
        self.buf.clear();
        Ok(Some(SmtpReply::new(text)))
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}
