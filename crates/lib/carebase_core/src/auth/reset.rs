//! Password reset tickets: one-time random codes with a short expiry.

use chrono::{DateTime, Duration, Utc};
use rand::{Rng, rng};

use crate::models::auth::ResetTicket;

/// Reset ticket lifetime: 10 minutes.
pub const RESET_TICKET_TTL_SECS: i64 = 10 * 60;

/// Random bytes per reset code (hex-encoded to 32 chars).
const RESET_CODE_BYTES: usize = 16;

/// Generate a cryptographically random reset code, hex-encoded.
pub fn generate_reset_code() -> String {
    let mut bytes = [0u8; RESET_CODE_BYTES];
    rng().fill(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

impl ResetTicket {
    /// New ticket issued at `now`.
    pub fn issue(now: DateTime<Utc>) -> Self {
        Self {
            code: generate_reset_code(),
            expires_at: now + Duration::seconds(RESET_TICKET_TTL_SECS),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_is_32_lowercase_hex_chars() {
        let code = generate_reset_code();
        assert_eq!(code.len(), 32);
        assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn codes_are_unique() {
        assert_ne!(generate_reset_code(), generate_reset_code());
    }

    #[test]
    fn ticket_expires_ten_minutes_after_issue() {
        let now = Utc::now();
        let ticket = ResetTicket::issue(now);
        assert_eq!((ticket.expires_at - now).num_milliseconds(), 600_000);
        assert!(!ticket.is_expired_at(now));
        assert!(!ticket.is_expired_at(ticket.expires_at));
        assert!(ticket.is_expired_at(ticket.expires_at + Duration::milliseconds(1)));
    }
}
