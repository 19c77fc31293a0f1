#![allow(dead_code)]

// Path materialization (component H, spec §4.H): turn a slash-separated
// path into a chain of vertices and edges on one feed, creating whichever
// segments don't already exist. The segment walk treats a path as a
// sequence of named hops, resolving each one against the prior segment's
// existing edges before deciding whether a new vertex is needed.

use hypergraphdb_base::{Error, Result};
use hypergraphdb_store::{CoreStore, EdgeOpts, Vertex};

/// One step recorded while walking `path`: a not-yet-persisted `child` that
/// needs an edge labeled `label` added to `parent` once both have ids.
struct PendingEdge {
    parent_index: usize,
    child_index: usize,
    label: String,
}

/// Splits a path into non-empty segments, treating `\` as `/` (spec §4.H
/// step 1).
fn split_path(path: &str) -> Vec<String> {
    path.replace('\\', "/")
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Picks the winner among several vertices bound to the same `(label,
/// feed)` at one path segment: highest timestamp, ties broken by higher id
/// (spec §4.H step 4e). This is the same convergent-without-coordination
/// rule spec §2 names for resolving concurrent writers in general.
fn resolve_candidate(candidates: &[Vertex]) -> &Vertex {
    candidates
        .iter()
        .max_by_key(|v| (v.timestamp().unwrap_or(0), v.id().unwrap_or(0)))
        .expect("candidates is non-empty")
}

/// `createEdgesToPath(path, root) -> [created vertices]` (spec §4.H).
/// `root` is updated in place to its final revision, mirroring the
/// source's pass-by-reference `root.addEdgeTo(...)` mutation. Idempotent:
/// replaying the same path against the same root and feed finds every
/// segment already resolved and returns an empty `created`.
pub fn create_edges_to_path(core: &CoreStore, path: &str, root: &mut Vertex) -> Result<Vec<Vertex>> {
    let feed = match root.feed() {
        Some(feed) if root.writeable() => feed.clone(),
        Some(feed) => return Err(Error::write_permission(feed)),
        None => return Err(Error::input("root vertex has not been persisted to a feed yet")),
    };
    let parts = split_path(path);

    // `chain[i]` is the vertex occupying position `i` along the walk;
    // `chain[0]` is `root` itself. New segments are appended here
    // pre-persist so later segments can still reference them by index.
    let mut chain: Vec<Vertex> = vec![root.clone()];
    let mut created_indices: Vec<usize> = Vec::new();
    let mut route: Vec<PendingEdge> = Vec::new();

    for seg in &parts {
        let parent_index = chain.len() - 1;
        let parent = &chain[parent_index];
        let mut loaded = Vec::new();
        for edge in parent.edges(Some(seg)) {
            if edge.feed.is_some() && edge.feed.as_ref() != Some(&feed) {
                continue;
            }
            loaded.push(core.get(&feed, edge.ref_id)?);
        }

        let (child_index, freshly_created) = if loaded.is_empty() {
            let fresh = Vertex::new();
            chain.push(fresh);
            let idx = chain.len() - 1;
            created_indices.push(idx);
            (idx, true)
        } else if loaded.len() == 1 {
            chain.push(loaded.pop().unwrap());
            (chain.len() - 1, false)
        } else {
            let winner = resolve_candidate(&loaded).clone();
            chain.push(winner);
            (chain.len() - 1, false)
        };

        // A pending edge is only needed when this segment didn't already
        // resolve to an existing edge from `parent` — otherwise the link is
        // already there and re-adding it would duplicate it on every replay
        // of an already-materialized path.
        if freshly_created {
            route.push(PendingEdge {
                parent_index,
                child_index,
                label: seg.clone(),
            });
        }
    }

    // Persist every newly created vertex in one transaction, insertion
    // order, so each obtains an id before any parent tries to link to it.
    {
        let mut fresh: Vec<Vertex> = created_indices.iter().map(|&idx| chain[idx].clone()).collect();
        core.put_all(&feed, &mut fresh)?;
        for (&idx, updated) in created_indices.iter().zip(fresh.into_iter()) {
            chain[idx] = updated;
        }
    }

    // Now wire up edges for the freshly created segments and collect the
    // distinct parents that changed.
    let mut touched_parents: Vec<usize> = Vec::new();
    for step in &route {
        let child_id = chain[step.child_index].id().expect("child persisted above");
        let parent = &mut chain[step.parent_index];
        parent.add_edge_to(None, child_id, step.label.clone(), EdgeOpts::default());
        if !touched_parents.contains(&step.parent_index) {
            touched_parents.push(step.parent_index);
        }
    }
    {
        let mut parents: Vec<Vertex> = touched_parents.iter().map(|&idx| chain[idx].clone()).collect();
        core.put_all(&feed, &mut parents)?;
        for (&idx, updated) in touched_parents.iter().zip(parents.into_iter()) {
            chain[idx] = updated;
        }
    }

    *root = chain[0].clone();
    Ok(created_indices.into_iter().map(|idx| chain[idx].clone()).collect())
}
