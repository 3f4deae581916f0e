use jarvis_core::types::{ChunkMetadata, IndexEntry};
use jarvis_core::{Error, VectorIndex};
use jarvis_vector::MemoryIndex;

fn entry(id: &str, vector: Vec<f32>, text: &str) -> IndexEntry {
    IndexEntry { id: id.to_string(), vector, metadata: ChunkMetadata::new(text) }
}

#[test]
fn query_ranks_by_cosine_and_truncates() {
    let index = MemoryIndex::new("kb");
    index.ensure_index(2).unwrap();
    index
        .upsert(&[
            entry("chunk_0", vec![1.0, 0.0], "east"),
            entry("chunk_1", vec![0.0, 1.0], "north"),
            entry("chunk_2", vec![0.6, 0.8], "north-east"),
        ])
        .unwrap();

    let hits = index.query(&[0.0, 2.0], 2).unwrap();
    let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
    assert_eq!(ids, ["chunk_1", "chunk_2"]);
    assert!((hits[0].score - 1.0).abs() < 1e-6);
    assert_eq!(hits[1].metadata.text, "north-east");

    assert_eq!(index.query(&[0.0, 1.0], 10).unwrap().len(), 3);
    assert!(index.query(&[0.0, 1.0], 0).unwrap().is_empty());
}

#[test]
fn ties_are_ordered_by_id() {
    let index = MemoryIndex::new("kb");
    index.ensure_index(2).unwrap();
    index.upsert(&[entry("chunk_b", vec![1.0, 0.0], "b"), entry("chunk_a", vec![2.0, 0.0], "a")]).unwrap();
    let hits = index.query(&[1.0, 0.0], 2).unwrap();
    assert_eq!(hits[0].id, "chunk_a");
    assert_eq!(hits[1].id, "chunk_b");
}

#[test]
fn upsert_replaces_existing_ids() {
    let index = MemoryIndex::new("kb");
    index.ensure_index(2).unwrap();
    index.upsert(&[entry("chunk_0", vec![1.0, 0.0], "old")]).unwrap();
    index.upsert(&[entry("chunk_0", vec![0.0, 1.0], "new")]).unwrap();
    assert_eq!(index.len(), 1);
    let hits = index.query(&[0.0, 1.0], 1).unwrap();
    assert_eq!(hits[0].metadata.text, "new");
}

#[test]
fn dimension_is_enforced_for_the_whole_batch() {
    let index = MemoryIndex::new("kb");
    index.ensure_index(3).unwrap();
    let err = index
        .upsert(&[entry("chunk_0", vec![1.0, 0.0, 0.0], "ok"), entry("chunk_1", vec![1.0], "bad")])
        .unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(index.is_empty(), "a rejected batch leaves the index untouched");
    assert!(matches!(index.query(&[1.0, 0.0], 1), Err(Error::Configuration(_))));
    assert!(matches!(index.ensure_index(4), Err(Error::Configuration(_))));
    assert!(index.ensure_index(3).is_ok());
}

#[test]
fn lifecycle_requires_ensure_and_delete_is_idempotent() {
    let index = MemoryIndex::new("kb");
    assert!(!index.exists());
    assert!(matches!(index.upsert(&[entry("chunk_0", vec![1.0], "x")]), Err(Error::IndexUnavailable(_))));
    assert!(matches!(index.query(&[1.0], 1), Err(Error::IndexUnavailable(_))));

    index.ensure_index(1).unwrap();
    assert!(index.query(&[1.0], 5).unwrap().is_empty(), "empty index yields no matches");
    index.upsert(&[entry("chunk_0", vec![1.0], "x")]).unwrap();

    index.delete_index().unwrap();
    index.delete_index().unwrap();
    assert!(!index.exists());
    index.ensure_index(1).unwrap();
    assert!(index.is_empty());
}
