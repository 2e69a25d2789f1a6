//! Out-of-band delivery of plaintext OTP codes.
//!
//! The plaintext code only leaves the process through this seam; it is never
//! returned to the HTTP caller and never stored.

use anyhow::Result;
use tracing::info;

/// Delivery channel abstraction; implementations send the code by email,
/// SMS, or whatever the institution uses.
pub trait OtpSender: Send + Sync {
    /// Deliver the plaintext code or return an error.
    fn send(&self, email: &str, otp: &str) -> Result<()>;
}

/// Local dev sender that logs the code instead of sending real email.
#[derive(Clone, Debug)]
pub struct LogOtpSender;

impl OtpSender for LogOtpSender {
    fn send(&self, email: &str, otp: &str) -> Result<()> {
        info!(email = %email, otp = %otp, "otp delivery stub");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sender_always_succeeds() {
        assert!(LogOtpSender.send("alice@x.edu", "483920").is_ok());
    }
}
