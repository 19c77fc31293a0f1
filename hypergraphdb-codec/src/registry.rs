// Codec registry (spec §4.A). A codec turns a vertex's decoded content
// value into bytes and back, keyed by a short tag recorded alongside the
// content in the vertex envelope. Write-once at startup, read-only after
// (spec §5's "Codec registry is write-once at startup").

use std::collections::BTreeMap;

use hypergraphdb_base::{err, Result};

/// Content decoded from, or about to be encoded into, a vertex's payload.
/// `Msgpack` is the default "arbitrary opaque map" representation (spec
/// §4.A); `Opaque` preserves the raw bytes of a tag nobody registered a
/// codec for, so decoding an unknown tag never loses data.
#[derive(Clone, Debug, PartialEq)]
pub enum ContentValue {
    Msgpack(rmpv::Value),
    Opaque(Vec<u8>),
}

pub trait Codec: Send + Sync {
    fn encode(&self, value: &ContentValue) -> Result<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> Result<ContentValue>;
}

/// Wraps `rmpv::Value` directly; this is the codec registered under the
/// `"msgpack"` tag by default.
pub struct MsgpackCodec;

impl Codec for MsgpackCodec {
    fn encode(&self, value: &ContentValue) -> Result<Vec<u8>> {
        match value {
            ContentValue::Msgpack(v) => {
                let mut buf = Vec::new();
                rmpv::encode::write_value(&mut buf, v)
                    .map_err(|e| err(format!("msgpack encode failed: {e}")))?;
                Ok(buf)
            }
            ContentValue::Opaque(bytes) => Ok(bytes.clone()),
        }
    }

    fn decode(&self, bytes: &[u8]) -> Result<ContentValue> {
        let mut cursor = bytes;
        let value = rmpv::decode::read_value(&mut cursor)
            .map_err(|e| err(format!("msgpack decode failed: {e}")))?;
        Ok(ContentValue::Msgpack(value))
    }
}

pub struct CodecRegistry {
    codecs: BTreeMap<String, Box<dyn Codec>>,
}

impl Default for CodecRegistry {
    fn default() -> Self {
        let mut registry = CodecRegistry {
            codecs: BTreeMap::new(),
        };
        registry.register("msgpack", Box::new(MsgpackCodec));
        registry
    }
}

impl CodecRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tag: impl Into<String>, codec: Box<dyn Codec>) {
        self.codecs.insert(tag.into(), codec);
    }

    pub fn encode(&self, tag: &str, value: &ContentValue) -> Result<Vec<u8>> {
        match self.codecs.get(tag) {
            Some(codec) => codec.encode(value),
            None => match value {
                ContentValue::Opaque(bytes) => Ok(bytes.clone()),
                ContentValue::Msgpack(_) => {
                    Err(err(format!("no codec registered for tag {tag:?}")))
                }
            },
        }
    }

    /// Never fails: an unknown tag falls back to a generic wrapper that
    /// preserves the raw bytes (spec §4.A).
    pub fn decode(&self, tag: &str, bytes: &[u8]) -> ContentValue {
        match self.codecs.get(tag) {
            Some(codec) => codec
                .decode(bytes)
                .unwrap_or_else(|_| ContentValue::Opaque(bytes.to_vec())),
            None => ContentValue::Opaque(bytes.to_vec()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn round_trips_through_default_codec() -> Result<()> {
        let registry = CodecRegistry::new();
        let value = ContentValue::Msgpack(rmpv::Value::String("hello".into()));
        let bytes = registry.encode("msgpack", &value)?;
        let decoded = registry.decode("msgpack", &bytes);
        assert_eq!(decoded, value);
        Ok(())
    }

    #[test]
    fn unknown_tag_preserves_raw_bytes() {
        let registry = CodecRegistry::new();
        let raw = vec![1, 2, 3, 4];
        let decoded = registry.decode("unknown-tag", &raw);
        assert_eq!(decoded, ContentValue::Opaque(raw));
    }

    #[test]
    fn encoding_is_deterministic() -> Result<()> {
        let registry = CodecRegistry::new();
        let value = ContentValue::Msgpack(rmpv::Value::from(42));
        let a = registry.encode("msgpack", &value)?;
        let b = registry.encode("msgpack", &value)?;
        assert_eq!(a, b);
        Ok(())
    }
}
