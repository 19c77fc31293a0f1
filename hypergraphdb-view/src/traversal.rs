// The `View` strategy trait (spec §4.E) and the edge-enumeration logic
// shared by every view: only `get`'s delegation behavior differs between
// `GraphView` and `StaticView`, so `out` lives here once and concrete views
// call back into it.

use hypergraphdb_base::{Error, FeedKey, Result};
use hypergraphdb_store::{Edge, QueryState, Vertex};

use crate::context::ViewContext;
use crate::restriction::edge_permitted;

#[derive(Clone, Debug)]
pub struct TraversalStep {
    pub result: Vertex,
    pub label: String,
    pub state: QueryState,
}

pub trait View {
    fn view_name(&self) -> &'static str;

    /// Resolves `(feed, id)` to a vertex. `view_desc`, when set, names a
    /// view that should take over interpreting this hop; honoring that is
    /// up to the implementation (spec §4.E: "if `viewDesc` is set and names
    /// another registered view, delegation is mandatory").
    fn get(
        &self,
        ctx: &ViewContext,
        feed: &FeedKey,
        id: u64,
        version: Option<u64>,
        view_desc: Option<&str>,
        metadata: Option<&[(String, Vec<u8>)]>,
    ) -> Result<Vertex>;

    fn out<'a>(
        &'a self,
        ctx: &'a ViewContext<'a>,
        state: &'a QueryState,
        label: Option<&str>,
    ) -> Box<dyn Iterator<Item = Result<TraversalStep>> + 'a> {
        enumerate_edges(self, ctx, state, label)
    }
}

/// Shared `out` body: every edge matching `label`, filtered by the
/// restrictions accumulated so far, resolved through `view.get` and paired
/// with the state that following it produces.
fn enumerate_edges<'a, V: View + ?Sized>(
    view: &'a V,
    ctx: &'a ViewContext<'a>,
    state: &'a QueryState,
    label: Option<&str>,
) -> Box<dyn Iterator<Item = Result<TraversalStep>> + 'a> {
    let vertex = &state.value;
    let source_feed = vertex.feed().cloned();
    let source_id = vertex.id().unwrap_or(0);
    let label_owned = label.map(|s| s.to_string());
    let edges: Vec<Edge> = vertex.edges(label_owned.as_deref()).cloned().collect();

    let restrictions_for_filter = state.restrictions.clone();
    let state_for_map = state.clone();
    let feed_for_map = source_feed.clone();

    Box::new(
        edges
            .into_iter()
            .filter(move |edge| edge_permitted(&restrictions_for_filter, &edge.label))
            .map(move |edge| {
                let target_feed = edge
                    .feed
                    .clone()
                    .or_else(|| feed_for_map.clone())
                    .ok_or_else(|| hypergraphdb_base::err("edge has no resolvable feed and source vertex is transient"))?;
                let fallback_feed = feed_for_map.clone().unwrap_or_else(|| target_feed.clone());
                let resolved = view
                    .get(
                        ctx,
                        &target_feed,
                        edge.ref_id,
                        edge.version,
                        edge.view.as_deref(),
                        edge.metadata.as_deref(),
                    )
                    .map_err(|cause| Error::edge_traversing(&fallback_feed, source_id, &edge.label, cause))?;
                Ok(to_traversal_step(resolved, &edge, &state_for_map))
            }),
    )
}

fn to_traversal_step(result: Vertex, edge: &Edge, state: &QueryState) -> TraversalStep {
    let next_state = if edge.restrictions.is_empty() {
        state.clone()
    } else {
        state.add_restrictions(result.clone(), &edge.restrictions)
    };
    TraversalStep {
        result,
        label: edge.label.clone(),
        state: next_state,
    }
}

#[cfg(test)]
mod test {
    use std::rc::Rc;

    use hypergraphdb_codec::CodecRegistry;
    use hypergraphdb_store::mock::MemoryCorestore;
    use hypergraphdb_store::test_support::ManualClock;
    use hypergraphdb_store::{CoreStore, EdgeOpts, QueryState, RestrictionRule, TransactionCache, Vertex};
    use test_log::test;

    use crate::registry::ViewFactory;
    use crate::views::{GraphView, StaticView};

    use super::*;

    fn rig() -> (CoreStore, TransactionCache, ViewFactory) {
        let corestore = Rc::new(MemoryCorestore::new());
        let core = CoreStore::new(corestore, Rc::new(CodecRegistry::new()), Rc::new(ManualClock::new(1)));
        (core, TransactionCache::new(), ViewFactory::with_builtins())
    }

    fn vid(v: &Vertex) -> u64 {
        v.id().expect("persisted vertex has an id")
    }

    #[test]
    fn graph_view_walks_a_labeled_edge() -> Result<()> {
        let (core, cache, factory) = rig();
        let feed = core.default_feed_id()?;
        let ctx = ViewContext::new(&core, &cache, &factory);

        let mut child = Vertex::new();
        core.put(&feed, &mut child)?;
        let mut parent = Vertex::new();
        parent.add_edge_to(None, vid(&child), "child", EdgeOpts::default());
        core.put(&feed, &mut parent)?;

        let state = QueryState::new(parent);
        let steps: Vec<TraversalStep> = factory.default_view().out(&ctx, &state, None).collect::<Result<_>>()?;

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].label, "child");
        assert_eq!(steps[0].result.id(), child.id());
        Ok(())
    }

    #[test]
    fn exclude_restriction_filters_out_the_matching_edge() -> Result<()> {
        let (core, cache, factory) = rig();
        let feed = core.default_feed_id()?;
        let ctx = ViewContext::new(&core, &cache, &factory);

        let mut child = Vertex::new();
        core.put(&feed, &mut child)?;
        let mut parent = Vertex::new();
        parent.add_edge_to(None, vid(&child), "secret", EdgeOpts::default());
        core.put(&feed, &mut parent)?;

        let mut state = QueryState::new(parent);
        state.restrictions.push(RestrictionRule {
            pattern: "secret*".to_string(),
            exclude: true,
        });

        let steps: Vec<TraversalStep> = factory.default_view().out(&ctx, &state, None).collect::<Result<_>>()?;
        assert!(steps.is_empty());
        Ok(())
    }

    #[test]
    fn graph_view_honors_an_edges_view_hint() -> Result<()> {
        let (core, cache, factory) = rig();
        let feed = core.default_feed_id()?;
        let ctx = ViewContext::new(&core, &cache, &factory);

        let mut child = Vertex::new();
        core.put(&feed, &mut child)?;
        let mut parent = Vertex::new();
        parent.add_edge_to(
            None,
            vid(&child),
            "child",
            EdgeOpts {
                view: Some("static".to_string()),
                ..Default::default()
            },
        );
        core.put(&feed, &mut parent)?;

        let state = QueryState::new(parent);
        let steps: Vec<TraversalStep> = GraphView.out(&ctx, &state, None).collect::<Result<_>>()?;
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].result.id(), child.id());
        Ok(())
    }

    #[test]
    fn static_view_ignores_view_hints() -> Result<()> {
        let (core, cache, factory) = rig();
        let feed = core.default_feed_id()?;
        let ctx = ViewContext::new(&core, &cache, &factory);

        let mut child = Vertex::new();
        core.put(&feed, &mut child)?;
        let mut parent = Vertex::new();
        parent.add_edge_to(
            None,
            vid(&child),
            "child",
            EdgeOpts {
                view: Some("nonexistent".to_string()),
                ..Default::default()
            },
        );
        core.put(&feed, &mut parent)?;

        let state = QueryState::new(parent);
        let steps: Vec<TraversalStep> = StaticView.out(&ctx, &state, None).collect::<Result<_>>()?;
        assert_eq!(steps.len(), 1);
        Ok(())
    }
}
