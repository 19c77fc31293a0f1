mod envelope;
mod registry;

pub use envelope::{decode_envelope, encode_envelope, EdgeEnvelope, RestrictionRuleEnvelope, VertexEnvelope};
pub use registry::{Codec, CodecRegistry, ContentValue, MsgpackCodec};
