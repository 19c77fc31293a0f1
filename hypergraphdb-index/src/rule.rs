// One registered index rule (spec §4.G): a pure extraction function and a
// traversal-selection function, keyed by a unique name.

use hypergraphdb_store::Vertex;

pub trait IndexRule {
    fn index_name(&self) -> &str;

    /// Zero or more `(key, weight?)` pairs this vertex contributes to the
    /// index. Pure: no side effects, no I/O.
    fn extract(&self, vertex: &Vertex) -> Vec<(String, Option<f64>)>;

    /// Outgoing edge labels the crawler should follow from this vertex.
    fn traverse(&self, vertex: &Vertex) -> Vec<String>;
}
