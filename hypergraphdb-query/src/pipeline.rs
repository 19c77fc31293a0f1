// The query pipeline itself (spec §4.F). Ordering: within one hop, results
// follow the source vertex's edge insertion order (guaranteed by
// `View::out`); across vertices, the order is the input stream's order
// (guaranteed by `flat_map`, which visits items in order and is in turn fed
// by `Vec::into_iter`/this same guarantee recursively).

use std::collections::HashSet;
use std::rc::Rc;

use hypergraphdb_base::Result;
use hypergraphdb_store::{CoreStore, QueryState, Vertex};
use hypergraphdb_view::ViewFactory;

use crate::step::{out_step, Step};

pub struct Query {
    core: Rc<CoreStore>,
    cache: Rc<hypergraphdb_store::TransactionCache>,
    factory: Rc<ViewFactory>,
    view_name: String,
    items: Box<dyn Iterator<Item = Result<QueryState>>>,
}

impl Query {
    pub fn from_vertex(core: Rc<CoreStore>, factory: Rc<ViewFactory>, view_name: impl Into<String>, root: Vertex) -> Self {
        Query::from_states(core, factory, view_name, std::iter::once(Ok(QueryState::new(root))))
    }

    pub fn from_states(
        core: Rc<CoreStore>,
        factory: Rc<ViewFactory>,
        view_name: impl Into<String>,
        states: impl Iterator<Item = Result<QueryState>> + 'static,
    ) -> Self {
        Query {
            core,
            cache: Rc::new(hypergraphdb_store::TransactionCache::new()),
            factory,
            view_name: view_name.into(),
            items: Box::new(states),
        }
    }

    /// A `Step` bound to this query's core/cache/factory/view, usable with
    /// [`Query::repeat`]. Must be captured before `self` is consumed by a
    /// combinator.
    pub fn step(&self, label: Option<String>) -> Step {
        out_step(self.core.clone(), self.cache.clone(), self.factory.clone(), self.view_name.clone(), label)
    }

    /// Switches which registered view subsequent hops are interpreted
    /// through.
    pub fn with_view(mut self, view_name: impl Into<String>) -> Self {
        self.view_name = view_name.into();
        self
    }

    /// `out(label?)`: apply the current view's `out(state, label)` to every
    /// input vertex and flatten the results (spec §4.F).
    pub fn out(mut self, label: Option<String>) -> Self {
        let step = self.step(label);
        self.items = Box::new(self.items.flat_map(move |item| match item {
            Err(e) => vec![Err(e)],
            Ok(state) => step(&state),
        }));
        self
    }

    /// `matches(predicate)`: keep only vertices the predicate accepts;
    /// errors always pass through so a failed hop is never silently
    /// dropped (spec §7: "no error is ever silently swallowed").
    pub fn matches(mut self, predicate: impl Fn(&Vertex) -> bool + 'static) -> Self {
        self.items = Box::new(self.items.filter(move |item| match item {
            Ok(state) => predicate(&state.value),
            Err(_) => true,
        }));
        self
    }

    /// `repeat(action, until?, max?)`: apply `action` level by level,
    /// BFS-style, stopping a branch once `until` holds or `max` levels have
    /// been taken. When `cycle_safe` is set, a `(feed, id)` visited set
    /// (spec §4.F: "`repeat` offers an explicit seen set keyed by
    /// `(feed, id)`") drops already-visited vertices instead of re-expanding
    /// them, guarding against cyclic cross-feed references (spec §9
    /// redesign note).
    pub fn repeat(mut self, action: Step, until: Option<Box<dyn Fn(&QueryState) -> bool>>, max: Option<usize>, cycle_safe: bool) -> Self {
        let mut frontier: Vec<Result<QueryState>> = self.items.collect();
        let mut finished: Vec<Result<QueryState>> = Vec::new();
        let mut seen: HashSet<(Vec<u8>, u64)> = HashSet::new();
        let mut depth = 0usize;

        loop {
            if frontier.is_empty() {
                break;
            }
            if let Some(limit) = max {
                if depth >= limit {
                    finished.extend(frontier);
                    break;
                }
            }
            let mut next_level = Vec::new();
            for item in frontier {
                let state = match item {
                    Err(e) => {
                        finished.push(Err(e));
                        continue;
                    }
                    Ok(state) => state,
                };
                if cycle_safe {
                    if let (Some(feed), Some(id)) = (state.value.feed(), state.value.id()) {
                        if !seen.insert((feed.as_bytes().to_vec(), id)) {
                            continue;
                        }
                    }
                }
                if until.as_ref().is_some_and(|f| f(&state)) {
                    finished.push(Ok(state));
                    continue;
                }
                next_level.extend(action(&state));
            }
            frontier = next_level;
            depth += 1;
        }

        self.items = Box::new(finished.into_iter());
        self
    }

    /// `values(selector)`: terminal, materializes and projects every
    /// vertex.
    pub fn values<T>(self, selector: impl Fn(&Vertex) -> T) -> Result<Vec<T>> {
        self.items.map(|r| r.map(|s| selector(&s.value))).collect()
    }

    /// `vertices()`: terminal, materializes every vertex.
    pub fn vertices(self) -> Result<Vec<Vertex>> {
        self.values(Clone::clone)
    }

    /// `generator()`: terminal, hands back the raw lazy stream for the
    /// caller to pull at its own pace.
    pub fn generator(self) -> Box<dyn Iterator<Item = Result<QueryState>>> {
        self.items
    }
}
