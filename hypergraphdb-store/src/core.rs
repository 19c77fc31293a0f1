// Core store (spec §4.D): transactional put/get of vertices over feeds,
// binary-encoding through the codec registry (component A) and the vertex
// envelope (spec §6), keyed by `(feed, id)` rather than a path.

use std::rc::Rc;

use hypergraphdb_base::{Error, FeedKey, Result};
use hypergraphdb_codec::{decode_envelope, encode_envelope, CodecRegistry, EdgeEnvelope, RestrictionRuleEnvelope, VertexEnvelope};
use tracing::debug;

use crate::clock::Clock;
use crate::feed::{Corestore, Transaction};
use crate::vertex::{Edge, Persisted, RestrictionRule, Vertex};

pub struct CoreStore {
    corestore: Rc<dyn Corestore>,
    codecs: Rc<CodecRegistry>,
    clock: Rc<dyn Clock>,
}

impl CoreStore {
    pub fn new(corestore: Rc<dyn Corestore>, codecs: Rc<CodecRegistry>, clock: Rc<dyn Clock>) -> Self {
        CoreStore {
            corestore,
            codecs,
            clock,
        }
    }

    pub fn corestore(&self) -> &Rc<dyn Corestore> {
        &self.corestore
    }

    pub fn codecs(&self) -> &Rc<CodecRegistry> {
        &self.codecs
    }

    pub fn default_feed_id(&self) -> Result<FeedKey> {
        Ok(self.corestore.get(None)?.key().clone())
    }

    pub fn transaction(&self, feed: &FeedKey, version: Option<u64>) -> Result<Rc<dyn Transaction>> {
        self.corestore.get(Some(feed))?.transaction(version)
    }

    /// Persists `vertex` to `feed`: a fresh revision if it already has an
    /// id, or its first revision otherwise (spec §3 lifecycle / §4.D).
    pub fn put(&self, feed: &FeedKey, vertex: &mut Vertex) -> Result<u64> {
        let tr = self.transaction(feed, None)?;
        self.put_in_transaction(vertex, &*tr)
    }

    /// Writes every vertex in insertion order within a single transaction;
    /// an append-only log cannot roll back records already written, so a
    /// mid-batch failure stops further writes and surfaces the first error,
    /// leaving prior writes in place (spec §4.D: "partial failure aborts the
    /// transaction and surfaces the first error").
    pub fn put_all(&self, feed: &FeedKey, vertices: &mut [Vertex]) -> Result<Vec<u64>> {
        let tr = self.transaction(feed, None)?;
        let mut ids = Vec::with_capacity(vertices.len());
        for vertex in vertices.iter_mut() {
            let id = self.put_in_transaction(vertex, &*tr)?;
            ids.push(id);
        }
        Ok(ids)
    }

    fn put_in_transaction(&self, vertex: &mut Vertex, tr: &dyn Transaction) -> Result<u64> {
        if !tr.writable() {
            return Err(Error::write_permission(tr.feed_key()));
        }
        let prior = vertex.id();
        let timestamp = self.clock.now_ms();
        let content = match vertex.content() {
            Some(value) => Some(self.codecs.encode(vertex.codec_tag(), value)?),
            None => None,
        };
        let edges = vertex.all_edges().iter().map(edge_to_envelope).collect();
        let envelope = VertexEnvelope {
            timestamp,
            codec_tag: vertex.codec_tag().to_string(),
            content,
            edges,
            prior,
        };
        let bytes = encode_envelope(&envelope)?;
        let id = tr.put(bytes)?;
        debug!(feed = %tr.feed_key(), id, prior, "persisted vertex revision");
        vertex.bind(
            Persisted {
                feed: tr.feed_key().clone(),
                id,
                timestamp,
            },
            true,
        );
        Ok(id)
    }

    pub fn get(&self, feed: &FeedKey, id: u64) -> Result<Vertex> {
        let tr = self.transaction(feed, None)?;
        self.get_in_transaction(id, &*tr)
    }

    pub fn get_in_transaction(&self, id: u64, tr: &dyn Transaction) -> Result<Vertex> {
        let bytes = tr
            .get(id)
            .map_err(|_| Error::vertex_loading(tr.feed_key(), id, Some(tr.version())))?;
        let envelope = decode_envelope(&bytes)
            .map_err(|cause| Error::vertex_decoding(tr.feed_key(), id, cause_display(&cause)))?;
        let content = envelope
            .content
            .as_deref()
            .map(|body| self.codecs.decode(&envelope.codec_tag, body));
        let edges = envelope.edges.iter().map(envelope_to_edge).collect();
        Ok(Vertex::from_parts(
            Persisted {
                feed: tr.feed_key().clone(),
                id,
                timestamp: envelope.timestamp,
            },
            content,
            envelope.codec_tag,
            edges,
            tr.writable(),
        ))
    }
}

fn cause_display(err: &Error) -> String {
    format!("{err:?}")
}

fn edge_to_envelope(edge: &Edge) -> EdgeEnvelope {
    EdgeEnvelope {
        label: edge.label.clone(),
        ref_id: edge.ref_id,
        feed: edge.feed.as_ref().map(|f| f.as_bytes().to_vec()),
        view: edge.view.clone(),
        metadata: edge.metadata.clone(),
        restrictions: if edge.restrictions.is_empty() {
            None
        } else {
            Some(
                edge.restrictions
                    .iter()
                    .map(|r| RestrictionRuleEnvelope {
                        rule: r.pattern.clone(),
                        exclude: r.exclude,
                    })
                    .collect(),
            )
        },
        version: edge.version,
    }
}

fn envelope_to_edge(env: &EdgeEnvelope) -> Edge {
    Edge {
        label: env.label.clone(),
        ref_id: env.ref_id,
        feed: env
            .feed
            .as_ref()
            .filter(|bytes| !bytes.is_empty())
            .map(|bytes| hypergraphdb_base::FeedKey::new(bytes.clone())),
        view: env.view.clone(),
        metadata: env.metadata.clone(),
        restrictions: env
            .restrictions
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|r| RestrictionRule {
                pattern: r.rule,
                exclude: r.exclude,
            })
            .collect(),
        version: env.version,
    }
}
