// We want a few things here:
// 1. A way to create a new error with a backtrace
// 2. A way to centralize setting a breakpoint to trap any error in the system fairly soon
//    after it's created (or at least when it's propagated from a library we use back to us)
// 3. Same but for logging / emitting error messages into the tracing/logging system
//
// On top of that, the taxonomy from spec §7 is carried as a `Kind` rather
// than as five unrelated error types, so call sites still return the one
// `Result<T>` and `?` keeps composing across crate boundaries.

use std::borrow::Cow;
use backtrace_error::DynBacktraceError;
use tracing::error;

use crate::FeedKey;

#[cfg(test)]
use test_log::test;

/// Which class of failure produced an [`Error`]. See spec §7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Underlying feed read failed or the record does not exist.
    VertexLoading,
    /// Envelope malformed or codec rejected the bytes.
    VertexDecoding,
    /// A single hop in a traversal failed; siblings still proceed.
    EdgeTraversing,
    /// Mutation attempted on a non-writable feed.
    WritePermission,
    /// A named index was queried but never registered.
    IndexNotFound,
    /// Malformed path or other bad argument.
    Input,
    /// Anything else, generally bubbled up from a collaborator via `?`.
    Other,
}

#[derive(Debug)]
pub struct Error {
    kind: Kind,
    inner: DynBacktraceError,
}
pub type Result<T> = std::result::Result<T, Error>;

struct SimpleErr(Cow<'static, str>);
impl std::fmt::Debug for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::fmt::Display for SimpleErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
impl std::error::Error for SimpleErr {
    fn description(&self) -> &str {
        &self.0
    }
}

impl<E: std::error::Error + Send + Sync + 'static> From<E> for Error {
    fn from(err: E) -> Error {
        Error::with_kind(Kind::Other, err)
    }
}

impl Error {
    pub fn with_kind<E: std::error::Error + Send + Sync + 'static>(kind: Kind, err: E) -> Error {
        error!(target: "hypergraphdb", kind = ?kind, "{:?}", err);
        let inner = DynBacktraceError::from(err);
        Error { kind, inner }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn vertex_loading(feed: &FeedKey, id: u64, version: Option<u64>) -> Error {
        let msg = match version {
            Some(v) => format!("no vertex {id} in feed {} at version {v}", feed.redacted()),
            None => format!("no vertex {id} in feed {}", feed.redacted()),
        };
        Error::with_kind(Kind::VertexLoading, SimpleErr(msg.into()))
    }

    pub fn vertex_decoding(feed: &FeedKey, id: u64, cause: impl std::fmt::Display) -> Error {
        let msg = format!(
            "failed to decode vertex {id} in feed {}: {cause}",
            feed.redacted()
        );
        Error::with_kind(Kind::VertexDecoding, SimpleErr(msg.into()))
    }

    pub fn edge_traversing(
        source_feed: &FeedKey,
        source_id: u64,
        label: &str,
        cause: impl std::fmt::Display,
    ) -> Error {
        let msg = format!(
            "edge {label:?} from ({}, {source_id}) failed to traverse: {cause}",
            source_feed.redacted()
        );
        Error::with_kind(Kind::EdgeTraversing, SimpleErr(msg.into()))
    }

    pub fn write_permission(feed: &FeedKey) -> Error {
        let msg = format!("feed {} is not writable", feed.redacted());
        Error::with_kind(Kind::WritePermission, SimpleErr(msg.into()))
    }

    pub fn index_not_found(name: impl Into<Cow<'static, str>>) -> Error {
        let name = name.into();
        let msg = format!("no such index: {name}");
        Error::with_kind(Kind::IndexNotFound, SimpleErr(msg.into()))
    }

    pub fn input(msg: impl Into<Cow<'static, str>>) -> Error {
        Error::with_kind(Kind::Input, SimpleErr(msg.into()))
    }
}

pub fn err(msg: impl Into<Cow<'static, str>>) -> Error {
    let err = SimpleErr(msg.into());
    Error::with_kind(Kind::Other, err)
}

#[test]
fn test_error() {
    let _err = err("test error");
}

#[test]
fn typed_constructors_carry_their_kind() {
    let feed = FeedKey::new(vec![1, 2, 3]);
    assert_eq!(Error::vertex_loading(&feed, 4, None).kind(), Kind::VertexLoading);
    assert_eq!(Error::write_permission(&feed).kind(), Kind::WritePermission);
    assert_eq!(Error::index_not_found("byName").kind(), Kind::IndexNotFound);
}
