// The append-only log boundary (spec §6). Everything in this module is a
// trait: the log implementation itself, peer discovery, and replication are
// out of scope (spec §1) and live outside this crate. `hypergraphdb_store`
// only consumes this boundary; see `mock` for a test-only implementation.

use std::rc::Rc;

use hypergraphdb_base::{FeedKey, Result};

pub trait Transaction: std::fmt::Debug {
    fn feed_key(&self) -> &FeedKey;
    fn writable(&self) -> bool;
    /// Number of records visible through this snapshot.
    fn version(&self) -> u64;
    fn get(&self, id: u64) -> Result<Vec<u8>>;
    /// Appends `bytes` and returns its 1-based id. Only valid when
    /// `writable()` is true.
    fn put(&self, bytes: Vec<u8>) -> Result<u64>;
}

pub trait Feed: std::fmt::Debug {
    fn key(&self) -> &FeedKey;
    fn writable(&self) -> bool;
    fn transaction(&self, version: Option<u64>) -> Result<Rc<dyn Transaction>>;
}

pub trait Corestore {
    /// Opens (creating if absent) the feed for `key`, or the local
    /// writable default feed when `key` is `None` (spec §6).
    fn get(&self, key: Option<&FeedKey>) -> Result<Rc<dyn Feed>>;
}
