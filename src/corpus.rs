//! Immutable corpus snapshot
//!
//! The corpus is the shared ground truth both indexes are built from.
//! Both must be built from the same snapshot or query-time fusion is
//! undefined (chunk ids would not align). The store is read-only after
//! load; rebuilding means constructing a new store and new indexes.

use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkId, ChunkMeta};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// Ordered, immutable collection of chunks with id-based lookup
pub struct CorpusStore {
    chunks: Vec<Chunk>,
    by_id: HashMap<ChunkId, usize>,
}

impl CorpusStore {
    /// Load a corpus snapshot from an in-memory chunk sequence.
    ///
    /// Fails with `Error::Integrity` on a duplicate `chunk_id` or a chunk
    /// with empty text. Conflicts are never dropped or deduplicated; the
    /// corpus must be fixed upstream.
    pub fn load(chunks: Vec<Chunk>) -> Result<Self> {
        let mut by_id = HashMap::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            if chunk.chunk_id.is_empty() {
                return Err(Error::Integrity(format!(
                    "chunk at position {} has an empty chunk_id",
                    idx
                )));
            }
            if chunk.text.trim().is_empty() {
                return Err(Error::Integrity(format!(
                    "chunk '{}' has empty text",
                    chunk.chunk_id
                )));
            }
            if by_id.insert(chunk.chunk_id.clone(), idx).is_some() {
                return Err(Error::Integrity(format!(
                    "duplicate chunk_id '{}'",
                    chunk.chunk_id
                )));
            }
        }

        info!("Loaded corpus snapshot: {} chunks", chunks.len());
        Ok(Self { chunks, by_id })
    }

    /// Load a corpus from the JSON chunk file the ingestion collaborator
    /// persists: an array of records with `chunk_id`, `url`, `title`,
    /// `chunk_index` and `text` fields.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)?;
        let chunks: Vec<Chunk> = serde_json::from_str(&data).map_err(|e| {
            Error::Codec(format!("failed to parse corpus file '{}': {}", path.display(), e))
        })?;
        Self::load(chunks)
    }

    /// Look up a chunk by id
    pub fn get(&self, chunk_id: &str) -> Result<&Chunk> {
        self.by_id
            .get(chunk_id)
            .map(|&idx| &self.chunks[idx])
            .ok_or_else(|| Error::NotFound(chunk_id.to_string()))
    }

    /// Get a chunk's text
    pub fn get_text(&self, chunk_id: &str) -> Result<&str> {
        Ok(self.get(chunk_id)?.text.as_str())
    }

    /// Get a chunk's source metadata
    pub fn get_metadata(&self, chunk_id: &str) -> Result<ChunkMeta<'_>> {
        let chunk = self.get(chunk_id)?;
        Ok(ChunkMeta {
            title: &chunk.title,
            url: &chunk.url,
            chunk_index: chunk.chunk_index,
        })
    }

    pub fn contains(&self, chunk_id: &str) -> bool {
        self.by_id.contains_key(chunk_id)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Iterate chunks in corpus insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_chunk(id: &str, text: &str) -> Chunk {
        Chunk::new(id, text)
            .with_url(format!("https://example.com/{}", id))
            .with_title(format!("Title {}", id))
    }

    #[test]
    fn test_load_unique_ids_all_retrievable() {
        let store = CorpusStore::load(vec![
            make_chunk("a", "alpha content"),
            make_chunk("b", "bravo content"),
            make_chunk("c", "charlie content"),
        ])
        .unwrap();

        assert_eq!(store.len(), 3);
        for id in ["a", "b", "c"] {
            assert!(store.contains(id));
            assert!(!store.get_text(id).unwrap().is_empty());
        }
    }

    #[test]
    fn test_load_rejects_duplicate_ids() {
        let result = CorpusStore::load(vec![
            make_chunk("a", "first"),
            make_chunk("b", "second"),
            make_chunk("a", "third"),
        ]);
        match result {
            Err(Error::Integrity(msg)) => assert!(msg.contains("'a'")),
            other => panic!("expected Integrity error, got {:?}", other.map(|s| s.len())),
        }
    }

    #[test]
    fn test_load_rejects_empty_text() {
        let result = CorpusStore::load(vec![make_chunk("a", "   ")]);
        assert!(matches!(result, Err(Error::Integrity(_))));
    }

    #[test]
    fn test_load_rejects_empty_id() {
        let result = CorpusStore::load(vec![make_chunk("", "some text")]);
        assert!(matches!(result, Err(Error::Integrity(_))));
    }

    #[test]
    fn test_get_missing_id_is_not_found() {
        let store = CorpusStore::load(vec![make_chunk("a", "text")]).unwrap();
        assert!(matches!(store.get("zzz"), Err(Error::NotFound(_))));
        assert!(matches!(store.get_metadata("zzz"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_get_metadata_fields() {
        let store = CorpusStore::load(vec![make_chunk("a", "text").with_index(2)]).unwrap();
        let meta = store.get_metadata("a").unwrap();
        assert_eq!(meta.title, "Title a");
        assert_eq!(meta.url, "https://example.com/a");
        assert_eq!(meta.chunk_index, 2);
    }

    #[test]
    fn test_iter_preserves_insertion_order() {
        let store = CorpusStore::load(vec![
            make_chunk("z", "last alphabetically, first inserted"),
            make_chunk("a", "first alphabetically, last inserted"),
        ])
        .unwrap();
        let ids: Vec<&str> = store.iter().map(|c| c.chunk_id.as_str()).collect();
        assert_eq!(ids, vec!["z", "a"]);
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chunks.json");
        std::fs::write(
            &path,
            r#"[
                {"chunk_id": "0", "url": "https://en.wikipedia.org/wiki/Rust", "title": "Rust", "chunk_index": 0, "text": "Title: Rust\nIntro: Rust is a systems language."},
                {"chunk_id": "1", "url": "https://en.wikipedia.org/wiki/Rust", "title": "Rust", "chunk_index": 1, "text": "Rust guarantees memory safety without garbage collection."}
            ]"#,
        )
        .unwrap();

        let store = CorpusStore::from_json_file(&path).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get_metadata("0").unwrap().chunk_index, 0);
        assert!(store.get_text("1").unwrap().contains("memory safety"));
    }

    #[test]
    fn test_from_json_file_malformed_is_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            CorpusStore::from_json_file(&path),
            Err(Error::Codec(_))
        ));
    }
}
