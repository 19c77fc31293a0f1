// An in-memory inverted index: `key -> [{feed, id}]`, insertion order
// preserved within a key (spec §4.G).

use std::collections::BTreeMap;

use hypergraphdb_base::FeedKey;

#[derive(Default)]
pub struct Index {
    entries: BTreeMap<String, Vec<(FeedKey, u64)>>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, hit: (FeedKey, u64)) {
        self.entries.entry(key).or_default().push(hit);
    }

    pub fn get(&self, key: &str) -> impl Iterator<Item = &(FeedKey, u64)> {
        self.entries.get(key).into_iter().flatten()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn preserves_insertion_order_within_a_key() {
        let mut index = Index::new();
        let a = FeedKey::new(vec![1]);
        index.insert("tag".to_string(), (a.clone(), 1));
        index.insert("tag".to_string(), (a.clone(), 2));
        let hits: Vec<u64> = index.get("tag").map(|(_, id)| *id).collect();
        assert_eq!(hits, vec![1, 2]);
    }

    #[test]
    fn missing_key_yields_an_empty_iterator() {
        let index = Index::new();
        assert_eq!(index.get("nope").count(), 0);
    }
}
