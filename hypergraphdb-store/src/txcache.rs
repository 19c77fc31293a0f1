// Transaction cache (spec §4.C). Keyed by `feed_hex[@version]`; amortizes
// transaction opens across the lifetime of one query. Single-threaded
// cooperative model (spec §5) so coalescing concurrent callers just means
// "look it up before opening a new one" — no locking required.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use hypergraphdb_base::{FeedKey, Result};

use crate::feed::{Corestore, Transaction};

fn cache_key(feed: &FeedKey, version: Option<u64>) -> String {
    match version {
        Some(v) => format!("{feed}@{v}"),
        None => feed.to_hex(),
    }
}

/// Owned by one query; all transactions it opened are dropped with it
/// (spec §5's "the query is the scoped owner").
#[derive(Default)]
pub struct TransactionCache {
    open: RefCell<BTreeMap<String, Rc<dyn Transaction>>>,
}

impl TransactionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_open(
        &self,
        corestore: &dyn Corestore,
        feed: &FeedKey,
        version: Option<u64>,
    ) -> Result<Rc<dyn Transaction>> {
        let key = cache_key(feed, version);
        if let Some(tr) = self.open.borrow().get(&key) {
            return Ok(tr.clone());
        }
        let feed_handle = corestore.get(Some(feed))?;
        let tr = feed_handle.transaction(version)?;
        self.open.borrow_mut().insert(key, tr.clone());
        Ok(tr)
    }

    /// Number of distinct `(feed, version)` transactions currently cached.
    pub fn len(&self) -> usize {
        self.open.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::feed::Corestore;
    use crate::mock::MemoryCorestore;

    #[test]
    fn coalesces_repeated_opens_of_the_same_feed() -> Result<()> {
        let store = MemoryCorestore::new();
        let cache = TransactionCache::new();
        let feed = store.get(None)?.key().clone();
        let a = cache.get_or_open(&store, &feed, None)?;
        let b = cache.get_or_open(&store, &feed, None)?;
        assert!(Rc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
        Ok(())
    }
}
