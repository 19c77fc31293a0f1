// The crawl protocol (spec §4.G): enqueue the root, pop-load-extract-enqueue
// until the queue drains or a per-crawl bound is hit.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::rc::Rc;

use hypergraphdb_base::{FeedKey, Result};
use hypergraphdb_store::CoreStore;
use tracing::trace;

use crate::index::Index;
use crate::rule::IndexRule;

pub struct Crawler {
    core: Rc<CoreStore>,
    rules: Vec<Box<dyn IndexRule>>,
    indexes: BTreeMap<String, Index>,
}

impl Crawler {
    pub fn new(core: Rc<CoreStore>) -> Self {
        Crawler {
            core,
            rules: Vec::new(),
            indexes: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, rule: impl IndexRule + 'static) {
        self.indexes.entry(rule.index_name().to_string()).or_default();
        self.rules.push(Box::new(rule));
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.get(name)
    }

    /// Names of every registered index, in registration order.
    pub fn index_names(&self) -> Vec<String> {
        self.indexes.keys().cloned().collect()
    }

    /// Walks the graph reachable from `(root_feed, root_id)`, applying every
    /// registered rule at each unseen vertex. `max_visited` bounds runaway
    /// crawls (spec §4.G: "terminate ... when a per-crawl bound is hit").
    /// Returns the number of distinct vertices visited.
    pub fn crawl(&mut self, root_feed: FeedKey, root_id: u64, max_visited: Option<usize>) -> Result<usize> {
        let mut queue: VecDeque<(FeedKey, u64)> = VecDeque::new();
        queue.push_back((root_feed, root_id));
        let mut visited: HashSet<(Vec<u8>, u64)> = HashSet::new();

        while let Some((feed, id)) = queue.pop_front() {
            let key = (feed.as_bytes().to_vec(), id);
            if visited.contains(&key) {
                continue;
            }
            if let Some(limit) = max_visited {
                if visited.len() >= limit {
                    trace!(limit, "crawl bound reached, stopping early");
                    break;
                }
            }
            visited.insert(key);

            let vertex = self.core.get(&feed, id)?;
            for rule in self.rules.iter() {
                let name = rule.index_name().to_string();
                for (entry_key, _weight) in rule.extract(&vertex) {
                    self.indexes.entry(name.clone()).or_default().insert(entry_key, (feed.clone(), id));
                }
                for label in rule.traverse(&vertex) {
                    for edge in vertex.edges(Some(&label)) {
                        let target_feed = edge.feed.clone().unwrap_or_else(|| feed.clone());
                        let target_key = (target_feed.as_bytes().to_vec(), edge.ref_id);
                        if !visited.contains(&target_key) {
                            queue.push_back((target_feed, edge.ref_id));
                        }
                    }
                }
            }
        }

        Ok(visited.len())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use hypergraphdb_codec::{CodecRegistry, ContentValue};
    use hypergraphdb_store::mock::MemoryCorestore;
    use hypergraphdb_store::test_support::ManualClock;
    use hypergraphdb_store::{EdgeOpts, Vertex};
    use test_log::test;

    struct ByContentTag;
    impl IndexRule for ByContentTag {
        fn index_name(&self) -> &str {
            "by_tag"
        }

        fn extract(&self, vertex: &Vertex) -> Vec<(String, Option<f64>)> {
            match vertex.content() {
                Some(ContentValue::Msgpack(rmpv::Value::String(s))) => {
                    vec![(s.as_str().unwrap_or_default().to_string(), None)]
                }
                _ => Vec::new(),
            }
        }

        fn traverse(&self, _vertex: &Vertex) -> Vec<String> {
            vec!["child".to_string()]
        }
    }

    fn rig() -> Result<(Rc<CoreStore>, FeedKey)> {
        let corestore = Rc::new(MemoryCorestore::new());
        let core = Rc::new(CoreStore::new(corestore, Rc::new(CodecRegistry::new()), Rc::new(ManualClock::new(1))));
        let feed = core.default_feed_id()?;
        Ok((core, feed))
    }

    fn vid(v: &Vertex) -> u64 {
        v.id().expect("persisted vertex has an id")
    }

    #[test]
    fn crawl_visits_reachable_vertices_and_builds_the_index() -> Result<()> {
        let (core, feed) = rig()?;
        let mut leaf = Vertex::new();
        leaf.set_content(ContentValue::Msgpack(rmpv::Value::String("leaf-tag".into())));
        core.put(&feed, &mut leaf)?;

        let mut root = Vertex::new();
        root.set_content(ContentValue::Msgpack(rmpv::Value::String("root-tag".into())));
        root.add_edge_to(None, vid(&leaf), "child", EdgeOpts::default());
        core.put(&feed, &mut root)?;

        let mut crawler = Crawler::new(core);
        crawler.register(ByContentTag);
        let visited = crawler.crawl(feed.clone(), vid(&root), None)?;
        assert_eq!(visited, 2);

        let hits: Vec<u64> = crawler
            .index("by_tag")
            .expect("by_tag registered above")
            .get("root-tag")
            .map(|(_, id)| *id)
            .collect();
        assert_eq!(hits, vec![vid(&root)]);
        Ok(())
    }

    #[test]
    fn crawl_does_not_revisit_a_cyclic_vertex() -> Result<()> {
        let (core, feed) = rig()?;
        let mut a = Vertex::new();
        core.put(&feed, &mut a)?;
        let a_id = vid(&a);
        a.add_edge_to(None, a_id, "child", EdgeOpts::default());
        core.put(&feed, &mut a)?;

        let mut crawler = Crawler::new(core);
        crawler.register(ByContentTag);
        let visited = crawler.crawl(feed, a_id, Some(50))?;
        assert_eq!(visited, 1);
        Ok(())
    }
}
