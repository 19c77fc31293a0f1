// The two built-in views (spec §4.E).

use hypergraphdb_base::{FeedKey, Result};
use hypergraphdb_store::Vertex;
use tracing::trace;

use crate::context::ViewContext;
use crate::traversal::View;

fn load(ctx: &ViewContext, feed: &FeedKey, id: u64, version: Option<u64>) -> Result<Vertex> {
    let tr = ctx.cache.get_or_open(ctx.core.corestore().as_ref(), feed, version)?;
    ctx.core.get_in_transaction(id, tr.as_ref())
}

/// Default view: honors `edge.view` by handing the hop to the named view
/// when one is registered (spec §4.E). An unrecognized name falls back to
/// this view, per spec §7's "unknown view names in viewDesc fall back to
/// the current view".
#[derive(Clone, Copy, Debug, Default)]
pub struct GraphView;

impl View for GraphView {
    fn view_name(&self) -> &'static str {
        "graph"
    }

    fn get(
        &self,
        ctx: &ViewContext,
        feed: &FeedKey,
        id: u64,
        version: Option<u64>,
        view_desc: Option<&str>,
        metadata: Option<&[(String, Vec<u8>)]>,
    ) -> Result<Vertex> {
        if let Some(name) = view_desc {
            if name != self.view_name() {
                if let Some(other) = ctx.factory.lookup(name) {
                    trace!(view = name, feed = %feed, id, "delegating traversal to named view");
                    return other.get(ctx, feed, id, version, None, metadata);
                }
                trace!(view = name, "unknown view name, falling back to graph view");
            }
        }
        load(ctx, feed, id, version)
    }
}

/// Ignores `edge.view` and `metadata` entirely: every hop is interpreted by
/// `StaticView` itself, so the resulting topology is independent of view
/// hints left on the edges (spec §4.E, and the worked example in spec §8:
/// "traversing the same graph with StaticView yields a deterministic
/// topology identical regardless of view hints").
#[derive(Clone, Copy, Debug, Default)]
pub struct StaticView;

impl View for StaticView {
    fn view_name(&self) -> &'static str {
        "static"
    }

    fn get(
        &self,
        ctx: &ViewContext,
        feed: &FeedKey,
        id: u64,
        version: Option<u64>,
        _view_desc: Option<&str>,
        _metadata: Option<&[(String, Vec<u8>)]>,
    ) -> Result<Vertex> {
        load(ctx, feed, id, version)
    }
}
