// Test-only stand-in for the real append-only log (spec §1 names the log,
// corestore and their networking as external collaborators out of scope).
// A feed here is just a growable list of byte records, since the store
// layer only ever needs `get(id)`/`put(bytes)`, not seekable streaming.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use hypergraphdb_base::{err, Error, FeedKey, Result};

use crate::feed::{Corestore, Feed, Transaction};

struct FeedState {
    key: FeedKey,
    records: RefCell<Vec<Vec<u8>>>,
}

/// A log shared by every [`MemoryCorestore`] built from it, so that feeds
/// created by one node ("corestore") are readable by another, the way
/// replicated feeds would be readable across real peers.
#[derive(Clone, Default)]
pub struct SharedLog {
    feeds: Rc<RefCell<BTreeMap<FeedKey, Rc<FeedState>>>>,
    next_key: Rc<RefCell<u64>>,
}

impl SharedLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_feed(&self) -> FeedKey {
        let mut counter = self.next_key.borrow_mut();
        *counter += 1;
        let key = FeedKey::new(counter.to_be_bytes().to_vec());
        self.feeds.borrow_mut().insert(
            key.clone(),
            Rc::new(FeedState {
                key: key.clone(),
                records: RefCell::new(Vec::new()),
            }),
        );
        key
    }

    fn get_or_create(&self, key: &FeedKey) -> Rc<FeedState> {
        if let Some(state) = self.feeds.borrow().get(key) {
            return state.clone();
        }
        let state = Rc::new(FeedState {
            key: key.clone(),
            records: RefCell::new(Vec::new()),
        });
        self.feeds.borrow_mut().insert(key.clone(), state.clone());
        state
    }
}

/// One node's view of a [`SharedLog`]: it owns (can write to) exactly one
/// feed, its `local` default, and can read any feed it knows the key of.
pub struct MemoryCorestore {
    shared: SharedLog,
    local: FeedKey,
}

impl MemoryCorestore {
    pub fn new() -> Self {
        let shared = SharedLog::new();
        let local = shared.create_feed();
        MemoryCorestore { shared, local }
    }

    pub fn sharing(shared: &SharedLog) -> Self {
        let local = shared.create_feed();
        MemoryCorestore {
            shared: shared.clone(),
            local,
        }
    }

    pub fn local_feed_key(&self) -> &FeedKey {
        &self.local
    }
}

impl Default for MemoryCorestore {
    fn default() -> Self {
        Self::new()
    }
}

impl Corestore for MemoryCorestore {
    fn get(&self, key: Option<&FeedKey>) -> Result<Rc<dyn Feed>> {
        let key = key.cloned().unwrap_or_else(|| self.local.clone());
        let writable = key == self.local;
        let state = self.shared.get_or_create(&key);
        Ok(Rc::new(MemoryFeed { state, writable }))
    }
}

#[derive(Debug)]
struct MemoryFeed {
    state: Rc<FeedState>,
    writable: bool,
}

impl std::fmt::Debug for FeedState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FeedState({}, {} records)", self.key, self.records.borrow().len())
    }
}

impl Feed for MemoryFeed {
    fn key(&self) -> &FeedKey {
        &self.state.key
    }

    fn writable(&self) -> bool {
        self.writable
    }

    fn transaction(&self, version: Option<u64>) -> Result<Rc<dyn Transaction>> {
        let len = self.state.records.borrow().len() as u64;
        let version = match version {
            Some(v) if v > len => {
                return Err(err(format!(
                    "requested version {v} exceeds feed length {len}"
                )))
            }
            Some(v) => v,
            None => len,
        };
        Ok(Rc::new(MemoryTransaction {
            state: self.state.clone(),
            writable: self.writable,
            version,
        }))
    }
}

#[derive(Debug)]
struct MemoryTransaction {
    state: Rc<FeedState>,
    writable: bool,
    version: u64,
}

impl Transaction for MemoryTransaction {
    fn feed_key(&self) -> &FeedKey {
        &self.state.key
    }

    fn writable(&self) -> bool {
        self.writable
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn get(&self, id: u64) -> Result<Vec<u8>> {
        if id == 0 || id > self.version {
            return Err(err(format!(
                "id {id} is out of range for version {}",
                self.version
            )));
        }
        let records = self.state.records.borrow();
        records
            .get((id - 1) as usize)
            .cloned()
            .ok_or_else(|| err(format!("no record {id} in feed {}", self.state.key)))
    }

    fn put(&self, bytes: Vec<u8>) -> Result<u64> {
        if !self.writable {
            return Err(Error::write_permission(&self.state.key));
        }
        let mut records = self.state.records.borrow_mut();
        records.push(bytes);
        Ok(records.len() as u64)
    }
}
