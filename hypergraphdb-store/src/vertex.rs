// Vertex model (spec §4.B). A vertex is mutable and id/feed-less until its
// first persist; afterwards `id` and `feed` are bound and never change,
// though the vertex may still be mutated in memory and re-persisted as a
// new revision (spec §3's lifecycle).

use hypergraphdb_base::FeedKey;
use hypergraphdb_codec::ContentValue;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestrictionRule {
    pub pattern: String,
    pub exclude: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub label: String,
    pub ref_id: u64,
    /// `None` ≡ same feed as the owning vertex.
    pub feed: Option<FeedKey>,
    pub view: Option<String>,
    pub metadata: Option<Vec<(String, Vec<u8>)>>,
    pub restrictions: Vec<RestrictionRule>,
    pub version: Option<u64>,
}

impl Edge {
    /// Equality key per spec §4.B ("Equality of edges is by tuple
    /// `(label, ref, feed, view)`").
    fn identity(&self) -> (&str, u64, Option<&FeedKey>, Option<&str>) {
        (
            self.label.as_str(),
            self.ref_id,
            self.feed.as_ref(),
            self.view.as_deref(),
        )
    }
}

/// Where a vertex sits once persisted: `(feed, id, timestamp)`, bound
/// exactly once (spec §9 design note on mutable-vs-immutable identity).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Persisted {
    pub feed: FeedKey,
    pub id: u64,
    pub timestamp: u64,
}

#[derive(Clone, Debug)]
pub struct Vertex {
    persisted: Option<Persisted>,
    content: Option<ContentValue>,
    codec_tag: String,
    edges: Vec<Edge>,
    /// True iff the owning feed is locally writable; meaningless (false)
    /// until persisted for the first time.
    writeable: bool,
}

impl Default for Vertex {
    fn default() -> Self {
        Vertex::new()
    }
}

impl Vertex {
    pub fn new() -> Self {
        Vertex {
            persisted: None,
            content: None,
            codec_tag: "msgpack".to_string(),
            edges: Vec::new(),
            writeable: false,
        }
    }

    pub fn from_parts(
        persisted: Persisted,
        content: Option<ContentValue>,
        codec_tag: String,
        edges: Vec<Edge>,
        writeable: bool,
    ) -> Self {
        Vertex {
            persisted: Some(persisted),
            content,
            codec_tag,
            edges,
            writeable,
        }
    }

    pub fn id(&self) -> Option<u64> {
        self.persisted.as_ref().map(|p| p.id)
    }

    pub fn feed(&self) -> Option<&FeedKey> {
        self.persisted.as_ref().map(|p| &p.feed)
    }

    pub fn timestamp(&self) -> Option<u64> {
        self.persisted.as_ref().map(|p| p.timestamp)
    }

    pub fn writeable(&self) -> bool {
        self.writeable
    }

    pub fn content(&self) -> Option<&ContentValue> {
        self.content.as_ref()
    }

    pub fn set_content(&mut self, content: ContentValue) {
        self.content = Some(content);
    }

    pub fn codec_tag(&self) -> &str {
        &self.codec_tag
    }

    pub fn set_codec_tag(&mut self, tag: impl Into<String>) {
        self.codec_tag = tag.into();
    }

    /// Edges whose label equals `label`, in insertion order; all edges if
    /// `label` is `None`.
    pub fn edges(&self, label: Option<&str>) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(move |e| label.map(|l| e.label == l).unwrap_or(true))
    }

    pub fn all_edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn add_edge_to(
        &mut self,
        target_feed: Option<FeedKey>,
        target_id: u64,
        label: impl Into<String>,
        opts: EdgeOpts,
    ) {
        self.edges.push(Edge {
            label: label.into(),
            ref_id: target_id,
            feed: target_feed,
            view: opts.view,
            metadata: opts.metadata,
            restrictions: opts.restrictions,
            version: opts.version,
        });
    }

    /// Applies `transform` to every edge matching `(label, ref_id)`.
    pub fn replace_edge_to(
        &mut self,
        label: &str,
        ref_id: u64,
        mut transform: impl FnMut(&mut Edge),
    ) {
        for edge in self.edges.iter_mut() {
            if edge.label == label && edge.ref_id == ref_id {
                transform(edge);
            }
        }
    }

    pub fn remove_edge(&mut self, mut matches: impl FnMut(&Edge) -> bool) {
        self.edges.retain(|e| !matches(e));
    }

    /// First-wins de-duplication by edge identity (spec §9 open question:
    /// "preserve both, first wins during traversal"). Exposed for callers
    /// that want the deduplicated view without mutating the vertex.
    pub fn edges_first_wins(&self) -> Vec<&Edge> {
        let mut seen = Vec::new();
        let mut out = Vec::new();
        for edge in &self.edges {
            let identity = edge.identity();
            if !seen.contains(&identity) {
                seen.push(identity);
                out.push(edge);
            }
        }
        out
    }

    pub(crate) fn bind(&mut self, persisted: Persisted, writeable: bool) {
        self.persisted = Some(persisted);
        self.writeable = writeable;
    }
}

#[derive(Clone, Debug, Default)]
pub struct EdgeOpts {
    pub view: Option<String>,
    pub metadata: Option<Vec<(String, Vec<u8>)>>,
    pub restrictions: Vec<RestrictionRule>,
    pub version: Option<u64>,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn new_vertex_has_no_identity() {
        let v = Vertex::new();
        assert!(v.id().is_none());
        assert!(v.feed().is_none());
        assert!(!v.writeable());
    }

    #[test]
    fn edges_filter_by_label_preserve_order() {
        let mut v = Vertex::new();
        v.add_edge_to(None, 1, "child", EdgeOpts::default());
        v.add_edge_to(None, 2, "sibling", EdgeOpts::default());
        v.add_edge_to(None, 3, "child", EdgeOpts::default());
        let ids: Vec<u64> = v.edges(Some("child")).map(|e| e.ref_id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn replace_edge_to_only_touches_matches() {
        let mut v = Vertex::new();
        v.add_edge_to(None, 1, "child", EdgeOpts::default());
        v.add_edge_to(None, 2, "child", EdgeOpts::default());
        v.replace_edge_to("child", 1, |e| e.view = Some("static".to_string()));
        let views: Vec<Option<&str>> = v.edges(Some("child")).map(|e| e.view.as_deref()).collect();
        assert_eq!(views, vec![Some("static"), None]);
    }
}
