#![allow(dead_code)]

mod clock;
mod core;
mod feed;
mod state;
mod txcache;
mod vertex;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use clock::{Clock, SystemClock};
pub use core::CoreStore;
pub use feed::{Corestore, Feed, Transaction};
pub use state::QueryState;
pub use txcache::TransactionCache;
pub use vertex::{Edge, EdgeOpts, Persisted, RestrictionRule, Vertex};

#[cfg(any(test, feature = "mock"))]
pub use clock::test_support;
