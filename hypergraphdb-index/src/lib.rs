#![allow(dead_code)]

// Crawler and in-memory secondary indexes (component G). The crawler drains
// a queue of pending `(feed, id)` pairs one vertex at a time, feeding each
// registered rule's extraction into its own inverted index.

mod crawler;
mod index;
mod rule;

pub use crawler::Crawler;
pub use index::Index;
pub use rule::IndexRule;
