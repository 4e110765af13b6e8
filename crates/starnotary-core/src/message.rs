//! Ownership-verification messages: `<address>:<timestamp>:starRegistry`.

use crate::constants::MESSAGE_SUFFIX;
use crate::error::{ChainError, Result};

/// Build the challenge string a wallet signs to prove it controls `address`.
pub fn ownership_message(address: &str, timestamp: u64) -> String {
    format!("{address}:{timestamp}:{MESSAGE_SUFFIX}")
}

/// Parsed form of an ownership message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipMessage<'a> {
    pub address: &'a str,
    pub timestamp: u64,
}

impl<'a> OwnershipMessage<'a> {
    pub fn parse(message: &'a str) -> Result<Self> {
        let fields: Vec<&str> = message.split(':').collect();
        let [address, timestamp, suffix] = fields[..] else {
            return Err(ChainError::MalformedMessage(format!(
                "expected 3 colon-separated fields, got {}",
                fields.len()
            )));
        };
        if suffix != MESSAGE_SUFFIX {
            return Err(ChainError::MalformedMessage(format!(
                "unexpected suffix {suffix:?}"
            )));
        }
        let timestamp = timestamp
            .parse::<u64>()
            .map_err(|e| ChainError::MalformedMessage(format!("bad timestamp {timestamp:?}: {e}")))?;
        Ok(Self { address, timestamp })
    }

    /// Seconds between issuance and `now`. Messages from the future count as fresh.
    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_three_fields() {
        let msg = ownership_message("tb1qabc", 1_600_000_000);
        assert_eq!(msg, "tb1qabc:1600000000:starRegistry");
        assert_eq!(msg.matches(':').count(), 2);
    }

    #[test]
    fn parses_what_it_builds() {
        let msg = ownership_message("tb1qabc", 42);
        let parsed = OwnershipMessage::parse(&msg).unwrap();
        assert_eq!(parsed.address, "tb1qabc");
        assert_eq!(parsed.timestamp, 42);
    }

    #[test]
    fn rejects_malformed() {
        for bad in [
            "",
            "addr:123",
            "addr:123:starRegistry:extra",
            "addr:abc:starRegistry",
            "addr:-5:starRegistry",
            "addr:123:somethingElse",
        ] {
            let err = OwnershipMessage::parse(bad).unwrap_err();
            assert!(matches!(err, ChainError::MalformedMessage(_)), "{bad}");
        }
    }

    #[test]
    fn elapsed_saturates_for_future_messages() {
        let parsed = OwnershipMessage::parse("a:1000:starRegistry").unwrap();
        assert_eq!(parsed.elapsed(1300), 300);
        assert_eq!(parsed.elapsed(900), 0);
    }
}
