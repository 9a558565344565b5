//! Canonicalizing text index
//!
//! A chained hash table keyed by the canonical form of question text, each
//! key mapping to a growable set of unique integer ids. The djb2 hash and
//! the canonicalization rule are load-bearing: changing either changes which
//! historical questions collapse onto the same key.

/// Reduce `s` to its canonical indexing key
///
/// ASCII letters are lowercased, digits and underscores pass through, the
/// ASCII space maps to `_`, and every other character is dropped. No Unicode
/// normalization. Idempotent: canonicalizing a canonical key is a no-op, so
/// looking up an already-canonical key finds the same entry.
///
/// Example: `"Does it meow?"` becomes `"does_it_meow"`.
pub fn canonicalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' => out.push((byte + (b'a' - b'A')) as char),
            b'a'..=b'z' | b'0'..=b'9' | b'_' => out.push(byte as char),
            b' ' => out.push('_'),
            _ => {}
        }
    }
    out
}

/// djb2 over raw bytes: h = 5381; h = h * 33 + b
fn djb2(key: &str) -> u32 {
    let mut hash: u32 = 5381;
    for byte in key.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(u32::from(byte));
    }
    hash
}

/// One chain entry: an owned canonical key and its id set
#[derive(Debug)]
struct IndexEntry {
    key: String,
    ids: Vec<u32>,
}

/// Chained hash table: canonical key -> set of unique ids
#[derive(Debug)]
pub struct TextIndex {
    buckets: Vec<Vec<IndexEntry>>,
    distinct_keys: usize,
}

impl Default for TextIndex {
    fn default() -> Self {
        Self::with_buckets(64)
    }
}

impl TextIndex {
    /// Create an index with `nbuckets` chains (at least 1)
    pub fn with_buckets(nbuckets: usize) -> Self {
        let nbuckets = nbuckets.max(1);
        let mut buckets = Vec::with_capacity(nbuckets);
        buckets.resize_with(nbuckets, Vec::new);
        Self {
            buckets,
            distinct_keys: 0,
        }
    }

    fn bucket_of(&self, key: &str) -> usize {
        djb2(key) as usize % self.buckets.len()
    }

    /// Register `id` under `key`, returning whether anything changed
    ///
    /// Set semantics: a duplicate (key, id) pair is not an error, it just
    /// reports `false`. New keys are inserted at the chain head.
    pub fn put(&mut self, key: &str, id: u32) -> bool {
        let bucket = self.bucket_of(key);
        for entry in &mut self.buckets[bucket] {
            if entry.key == key {
                if entry.ids.contains(&id) {
                    return false;
                }
                entry.ids.push(id);
                return true;
            }
        }
        self.buckets[bucket].insert(
            0,
            IndexEntry {
                key: key.to_owned(),
                ids: vec![id],
            },
        );
        self.distinct_keys += 1;
        true
    }

    /// True if `id` is registered under `key`
    pub fn contains(&self, key: &str, id: u32) -> bool {
        self.get_ids(key)
            .map(|ids| ids.contains(&id))
            .unwrap_or(false)
    }

    /// Borrow the id set registered under `key`
    ///
    /// The returned view is invalidated by the next structural mutation of
    /// the entry; callers must not hold it across a `put`.
    pub fn get_ids(&self, key: &str) -> Option<&[u32]> {
        let bucket = self.bucket_of(key);
        self.buckets[bucket]
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.ids.as_slice())
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.distinct_keys
    }

    /// True when no keys are registered
    pub fn is_empty(&self) -> bool {
        self.distinct_keys == 0
    }
}

/// Register the canonical form of `question` under `id`, bumping the counter
///
/// The split mutation funnels through here so the id handed to the index is
/// always the session's monotonically increasing question counter.
pub(crate) fn register_question(index: &mut TextIndex, next_id: &mut u32, question: &str) {
    let key = canonicalize(question);
    index.put(&key, *next_id);
    *next_id += 1;
}
