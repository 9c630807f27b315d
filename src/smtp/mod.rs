//! Partial SMTP transaction used to probe mailbox acceptance.
//!
//! The probe stops after `RCPT TO` and always ends with `QUIT`; it never
//! reaches `DATA`. The protocol logic lives in [`machine`] as a pure
//! transition function, `session` performs the I/O around it.

pub mod machine;
mod session;
mod types;

pub use machine::{
    MAX_REPLY_LEN, ProbeState, ReplyBuffer, ReplyTooLong, Stage, Step, transition,
};
pub use session::{BoxedStream, Connector, ProbeStream, SmtpProbe, TcpConnector, drive};
pub use types::{Envelope, SmtpReply, SmtpVerificationResult};

#[cfg(test)]
pub(crate) mod testing;
