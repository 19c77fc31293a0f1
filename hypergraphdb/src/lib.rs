#![allow(dead_code)]

// The public facade (spec §6's "Public API surface"): a thin wrapper
// composing the core store (D), views (E), the query engine (F), the
// crawler/index (G) and path materialization (H) behind one entry point.
// Kept deliberately thin so the composition stays obvious at a glance —
// it owns no traversal logic of its own, only wiring.

use std::cell::RefCell;
use std::rc::Rc;

use hypergraphdb_base::{Error, FeedKey, Result};
use hypergraphdb_codec::CodecRegistry;
use hypergraphdb_index::{Crawler, Index, IndexRule};
use hypergraphdb_query::Query;
use hypergraphdb_store::{Clock, CoreStore, Corestore, QueryState, SystemClock, TransactionCache, Vertex};
use hypergraphdb_view::ViewFactory;

pub use hypergraphdb_path::create_edges_to_path;

/// Construction-time overrides for [`HyperGraphDB::new`]; every field
/// defaults to the stock implementation when left `None`.
#[derive(Default)]
pub struct Options {
    pub codecs: Option<CodecRegistry>,
    pub clock: Option<Rc<dyn Clock>>,
    pub views: Option<ViewFactory>,
}

pub struct HyperGraphDB {
    core: Rc<CoreStore>,
    factory: Rc<ViewFactory>,
    crawler: RefCell<Crawler>,
}

impl HyperGraphDB {
    /// `new HyperGraphDB(corestore, opts?)`. The source's optional `key`
    /// parameter selects which feed the underlying store treats as its
    /// local default; here that choice belongs to the `Corestore`
    /// implementation itself (spec §6: `corestore.get(None)` already
    /// returns "the local default writable feed"), so there is nothing
    /// left for this constructor to do with it.
    pub fn new(corestore: Rc<dyn Corestore>, opts: Options) -> Self {
        let codecs = Rc::new(opts.codecs.unwrap_or_default());
        let clock: Rc<dyn Clock> = opts.clock.unwrap_or_else(|| Rc::new(SystemClock));
        let factory = Rc::new(opts.views.unwrap_or_default());
        let core = Rc::new(CoreStore::new(corestore, codecs, clock));
        HyperGraphDB {
            crawler: RefCell::new(Crawler::new(core.clone())),
            core,
            factory,
        }
    }

    pub fn create(&self) -> Vertex {
        Vertex::new()
    }

    pub fn put(&self, vertex: &mut Vertex, feed: Option<&FeedKey>) -> Result<u64> {
        let feed = self.resolve_feed(feed)?;
        self.core.put(&feed, vertex)
    }

    pub fn put_all(&self, vertices: &mut [Vertex], feed: Option<&FeedKey>) -> Result<Vec<u64>> {
        let feed = self.resolve_feed(feed)?;
        self.core.put_all(&feed, vertices)
    }

    pub fn get(&self, id: u64, feed: Option<&FeedKey>) -> Result<Vertex> {
        let feed = self.resolve_feed(feed)?;
        self.core.get(&feed, id)
    }

    fn resolve_feed(&self, feed: Option<&FeedKey>) -> Result<FeedKey> {
        match feed {
            Some(feed) => Ok(feed.clone()),
            None => self.core.default_feed_id(),
        }
    }

    pub fn query_at_id(&self, id: u64, feed: &FeedKey) -> Query {
        let state = self.core.get(feed, id).map(QueryState::new);
        Query::from_states(self.core.clone(), self.factory.clone(), "graph", std::iter::once(state))
    }

    pub fn query_at_vertex(&self, v: Vertex) -> Query {
        Query::from_vertex(self.core.clone(), self.factory.clone(), "graph", v)
    }

    /// `queryPathAtVertex(path, v)`: resolves `path` by walking existing
    /// same-feed edges from `v` (read-only — unlike [`create_edges_to_path`]
    /// this never creates anything) and roots a query at whatever segment
    /// it lands on. An empty path is `queryAtVertex(v)` (spec §9); a path
    /// that doesn't fully resolve yields an empty query rather than an
    /// error, since "not found" is not itself a failure.
    pub fn query_path_at_vertex(&self, path: &str, v: Vertex) -> Query {
        match resolve_path_vertex(&self.core, path, v) {
            Ok(Some(found)) => self.query_at_vertex(found),
            Ok(None) => Query::from_states(self.core.clone(), self.factory.clone(), "graph", std::iter::empty()),
            Err(e) => Query::from_states(self.core.clone(), self.factory.clone(), "graph", std::iter::once(Err(e))),
        }
    }

    /// `queryIndex(name, key)` (spec §4.G): resolves the index, collects
    /// `{feed, id}` hits, opens one transaction per distinct feed
    /// (coalesced by the query's own [`TransactionCache`]), and loads each
    /// hit before handing the stream to the query engine.
    pub fn query_index(&self, name: &str, key: &str) -> Query {
        match self.resolve_index_hits(name, key) {
            Ok(states) => Query::from_states(self.core.clone(), self.factory.clone(), "graph", states.into_iter()),
            Err(e) => Query::from_states(self.core.clone(), self.factory.clone(), "graph", std::iter::once(Err(e))),
        }
    }

    fn resolve_index_hits(&self, name: &str, key: &str) -> Result<Vec<Result<QueryState>>> {
        let crawler = self.crawler.borrow();
        let index = crawler.index(name).ok_or_else(|| Error::index_not_found(name.to_string()))?;
        let hits: Vec<(FeedKey, u64)> = index.get(key).cloned().collect();
        drop(crawler);

        let cache = TransactionCache::new();
        let states = hits
            .into_iter()
            .map(|(feed, id)| -> Result<QueryState> {
                let tr = cache.get_or_open(self.core.corestore().as_ref(), &feed, None)?;
                self.core.get_in_transaction(id, tr.as_ref()).map(QueryState::new)
            })
            .collect();
        Ok(states)
    }

    pub fn register_index_rule(&self, rule: impl IndexRule + 'static) {
        self.crawler.borrow_mut().register(rule);
    }

    pub fn crawl(&self, root_feed: FeedKey, root_id: u64, max_visited: Option<usize>) -> Result<usize> {
        self.crawler.borrow_mut().crawl(root_feed, root_id, max_visited)
    }

    pub fn index(&self, name: &str) -> Option<std::cell::Ref<Index>> {
        let crawler = self.crawler.borrow();
        std::cell::Ref::filter_map(crawler, |c| c.index(name)).ok()
    }

    /// `indexes: [Index]`: the names of every registered index. Handing
    /// back live `&Index` references for every index at once would have to
    /// borrow the crawler for as long as the caller holds them; callers
    /// that need a specific index's contents should go through
    /// [`HyperGraphDB::index`] or [`HyperGraphDB::query_index`] instead.
    pub fn indexes(&self) -> Vec<String> {
        self.crawler.borrow().index_names()
    }
}

fn resolve_path_vertex(core: &CoreStore, path: &str, start: Vertex) -> Result<Option<Vertex>> {
    let parts: Vec<String> = path
        .replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();
    let mut current = start;
    for seg in &parts {
        let feed = match current.feed() {
            Some(feed) => feed.clone(),
            None => return Ok(None),
        };
        let mut candidates = Vec::new();
        for edge in current.edges(Some(seg)) {
            if edge.feed.is_some() && edge.feed.as_ref() != Some(&feed) {
                continue;
            }
            candidates.push(core.get(&feed, edge.ref_id)?);
        }
        let next = match candidates.len() {
            0 => return Ok(None),
            1 => candidates.pop().unwrap(),
            _ => candidates
                .into_iter()
                .max_by_key(|v| (v.timestamp().unwrap_or(0), v.id().unwrap_or(0)))
                .expect("non-empty"),
        };
        current = next;
    }
    Ok(Some(current))
}

#[cfg(test)]
mod test {
    use super::*;
    use hypergraphdb_store::mock::MemoryCorestore;
    use hypergraphdb_store::EdgeOpts;
    use test_log::test;

    fn db() -> HyperGraphDB {
        HyperGraphDB::new(Rc::new(MemoryCorestore::new()), Options::default())
    }

    fn vid(v: &Vertex) -> u64 {
        v.id().expect("persisted vertex has an id")
    }

    #[test]
    fn put_then_get_round_trips() -> Result<()> {
        let db = db();
        let mut a = db.create();
        db.put(&mut a, None)?;
        let loaded = db.get(vid(&a), None)?;
        assert_eq!(loaded.id(), a.id());
        Ok(())
    }

    #[test]
    fn single_feed_round_trip_scenario() -> Result<()> {
        let db = db();
        let mut a = db.create();
        let mut b = db.create();
        db.put_all(&mut [a.clone(), b.clone()], None)?;
        let mut a = db.get(vid(&a), None)?;
        let b = db.get(vid(&b), None)?;
        a.add_edge_to(None, vid(&b), "child", EdgeOpts::default());
        db.put(&mut a, None)?;

        let reloaded = db.get(vid(&a), None)?;
        let first_edge = reloaded.edges(None).next().expect("child edge was just added");
        assert_eq!(first_edge.ref_id, vid(&b));

        let out: Vec<u64> = db.query_at_vertex(reloaded).out(Some("child".to_string())).values(vid)?;
        assert_eq!(out, vec![vid(&b)]);
        Ok(())
    }

    #[test]
    fn path_materialization_scenario() -> Result<()> {
        let db = db();
        let mut root = db.create();
        db.put(&mut root, None)?;

        let created = create_edges_to_path(&db.core, "a/b/c", &mut root)?;
        assert_eq!(created.len(), 3);
        let again = create_edges_to_path(&db.core, "a/b/c", &mut root)?;
        assert!(again.is_empty());

        let leaf_ids: Vec<u64> = db.query_path_at_vertex("a/b/c", root.clone()).values(vid)?;
        assert_eq!(leaf_ids, vec![vid(&created[2])]);
        Ok(())
    }

    #[test]
    fn empty_path_is_query_at_vertex() -> Result<()> {
        let db = db();
        let mut root = db.create();
        db.put(&mut root, None)?;
        let via_path: Vec<u64> = db.query_path_at_vertex("", root.clone()).values(vid)?;
        let direct: Vec<u64> = db.query_at_vertex(root.clone()).values(vid)?;
        assert_eq!(via_path, direct);
        Ok(())
    }

    #[test]
    fn query_index_surfaces_index_not_found() {
        let db = db();
        let err = db.query_index("nope", "key").vertices().unwrap_err();
        assert_eq!(err.kind(), hypergraphdb_base::Kind::IndexNotFound);
    }

    #[test]
    fn cross_feed_edge_scenario() -> Result<()> {
        use hypergraphdb_store::mock::SharedLog;

        let shared = SharedLog::new();
        let db1 = HyperGraphDB::new(Rc::new(MemoryCorestore::sharing(&shared)), Options::default());
        let db2 = HyperGraphDB::new(Rc::new(MemoryCorestore::sharing(&shared)), Options::default());

        let mut b = db2.create();
        db2.put(&mut b, None)?;
        let f2 = db2.core.default_feed_id()?;

        let mut a = db1.create();
        a.add_edge_to(Some(f2), vid(&b), "child", EdgeOpts::default());
        db1.put(&mut a, None)?;

        let out: Vec<u64> = db1.query_at_vertex(a).out(None).values(vid)?;
        assert_eq!(out, vec![vid(&b)]);
        Ok(())
    }

    #[test]
    fn failure_isolation_scenario() -> Result<()> {
        let db = db();
        let mut ok = db.create();
        db.put(&mut ok, None)?;

        let mut a = db.create();
        a.add_edge_to(None, 999_999, "broken", EdgeOpts::default());
        a.add_edge_to(None, vid(&ok), "fine", EdgeOpts::default());
        db.put(&mut a, None)?;

        let results: Vec<_> = db.query_at_vertex(a).out(None).generator().collect();
        assert_eq!(results.len(), 2);
        let oks: Vec<_> = results.iter().filter(|r| r.is_ok()).collect();
        let errs: Vec<_> = results.iter().filter_map(|r| r.as_ref().err()).collect();
        assert_eq!(oks.len(), 1);
        assert_eq!(errs.len(), 1);
        assert_eq!(errs[0].kind(), hypergraphdb_base::Kind::EdgeTraversing);
        Ok(())
    }
}
