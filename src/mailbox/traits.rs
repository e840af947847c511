//! Error type shared by the mailbox's send paths.

use thiserror::Error;

/// Errors a mailbox send can produce. There is no `TtlExpired` or
/// `BackpressureApplied` variant: this mailbox has exactly one behavior
/// (block on full), and messages carry no TTL.
#[derive(Debug, Error)]
pub enum MailboxError {
    #[error("mailbox is full (capacity: {capacity})")]
    Full { capacity: usize },

    #[error("mailbox is closed")]
    Closed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailbox_error_full_message() {
        let err = MailboxError::Full { capacity: 100 };
        assert!(err.to_string().contains("100"));
    }

    #[test]
    fn test_mailbox_error_closed_message() {
        assert_eq!(MailboxError::Closed.to_string(), "mailbox is closed");
    }
}
