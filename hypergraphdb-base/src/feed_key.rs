use std::fmt;
use std::str::FromStr;

use crate::err;
use crate::Error;

/// An append-only log identifier. Opaque bytes everywhere except at
/// display/parse boundaries, where it is always lowercase hex (spec §3).
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeedKey(Box<[u8]>);

impl FeedKey {
    pub fn new(bytes: impl Into<Box<[u8]>>) -> Self {
        FeedKey(bytes.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// First two hex chars only, for error messages that must not leak a
    /// full feed key (spec §7's "sanitized metadata hints").
    pub fn redacted(&self) -> String {
        let full = self.to_hex();
        match full.get(0..2) {
            Some(prefix) => format!("{prefix}…"),
            None => "…".to_string(),
        }
    }
}

impl fmt::Debug for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedKey({})", self.to_hex())
    }
}

impl fmt::Display for FeedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for FeedKey {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Error> {
        let bytes = hex::decode(s).map_err(|e| err(format!("invalid feed key hex: {e}")))?;
        Ok(FeedKey(bytes.into_boxed_slice()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_through_hex() -> Result<(), Error> {
        let key = FeedKey::new(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(key.to_hex(), "deadbeef");
        let parsed: FeedKey = "deadbeef".parse()?;
        assert_eq!(parsed, key);
        Ok(())
    }

    #[test]
    fn redacted_keeps_only_prefix() {
        let key = FeedKey::new(vec![0xab, 0xcd]);
        assert_eq!(key.redacted(), "ab…");
    }
}
