// Binary envelope for a persisted vertex record (spec §6). One envelope is
// appended to a feed per revision. Encoding goes through `rmp_serde`'s
// struct-as-array mode: field order is fixed by the struct definition below,
// so two equal envelopes always produce identical bytes (spec §8's
// "encoding is canonical").

use serde::{Deserialize, Serialize};

use hypergraphdb_base::{Error, Result};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionRuleEnvelope {
    pub rule: String,
    pub exclude: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EdgeEnvelope {
    pub label: String,
    pub ref_id: u64,
    /// Empty ≡ same feed as the owning vertex (spec §6).
    pub feed: Option<Vec<u8>>,
    pub view: Option<String>,
    pub metadata: Option<Vec<(String, Vec<u8>)>>,
    pub restrictions: Option<Vec<RestrictionRuleEnvelope>>,
    /// Pinned feed length for reproducible reads. Recorded but ignored by
    /// both built-in views (spec §9 open question).
    pub version: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VertexEnvelope {
    pub timestamp: u64,
    pub codec_tag: String,
    pub content: Option<Vec<u8>>,
    pub edges: Vec<EdgeEnvelope>,
    /// Id of the revision this one supersedes, if any (spec §3 invariants:
    /// "the binary preamble links to the prior id").
    pub prior: Option<u64>,
}

pub fn encode_envelope(env: &VertexEnvelope) -> Result<Vec<u8>> {
    rmp_serde::to_vec(env).map_err(Error::from)
}

pub fn decode_envelope(bytes: &[u8]) -> Result<VertexEnvelope> {
    rmp_serde::from_slice(bytes).map_err(Error::from)
}

#[cfg(test)]
mod test {
    use super::*;

    fn sample() -> VertexEnvelope {
        VertexEnvelope {
            timestamp: 1_700_000_000_000,
            codec_tag: "msgpack".to_string(),
            content: Some(vec![1, 2, 3]),
            edges: vec![EdgeEnvelope {
                label: "child".to_string(),
                ref_id: 7,
                feed: None,
                view: Some("static".to_string()),
                metadata: Some(vec![("hint".to_string(), vec![9])]),
                restrictions: Some(vec![RestrictionRuleEnvelope {
                    rule: "a/*".to_string(),
                    exclude: false,
                }]),
                version: None,
            }],
            prior: Some(3),
        }
    }

    #[test]
    fn round_trips_byte_exactly() -> Result<()> {
        let env = sample();
        let bytes = encode_envelope(&env)?;
        let decoded = decode_envelope(&bytes)?;
        assert_eq!(decoded, env);
        let re_encoded = encode_envelope(&decoded)?;
        assert_eq!(bytes, re_encoded);
        Ok(())
    }

    #[test]
    fn encoding_is_deterministic() -> Result<()> {
        let env = sample();
        let a = encode_envelope(&env)?;
        let b = encode_envelope(&env)?;
        assert_eq!(a, b);
        Ok(())
    }
}
