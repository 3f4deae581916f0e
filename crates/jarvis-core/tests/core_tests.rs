use jarvis_core::chunker::{chunk_text, Chunker, ChunkingConfig};
use jarvis_core::traits::check_dimension;
use jarvis_core::Error;

/// Drop the leading `overlap` chars of every chunk after the first and glue the rest.
fn reconstruct(chunks: &[jarvis_core::types::Chunk], overlap: usize) -> String {
    let mut out = String::new();
    for (i, c) in chunks.iter().enumerate() {
        let skip = if i == 0 { 0 } else { overlap };
        out.extend(c.text.chars().skip(skip));
    }
    out
}

#[test]
fn chunk_cores_reconstruct_the_document() {
    let text = "Jarvis indexes a single knowledge document. \
                Each window overlaps its neighbour so sentences cut at a boundary \
                still appear whole in at least one chunk. Ünïcödé is counted per char.";
    for (size, overlap) in [(1, 0), (7, 0), (7, 3), (20, 5), (50, 49), (500, 50)] {
        let chunks = chunk_text(text, size, overlap).expect("valid params");
        assert_eq!(reconstruct(&chunks, overlap), text, "size={size} overlap={overlap}");
        for c in &chunks {
            assert!(!c.text.is_empty());
            assert!(c.text.chars().count() <= size);
        }
        let total = text.chars().count();
        for pair in chunks.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert_eq!(b.source_offset, a.source_offset + size - overlap);
            let b_end = b.source_offset + b.text.chars().count();
            if b_end < total {
                // full-width neighbours share exactly `overlap` chars
                let tail: String = a.text.chars().skip(size - overlap).collect();
                let head: String = b.text.chars().take(overlap).collect();
                assert_eq!(tail, head);
            }
        }
    }
}

#[test]
fn chunker_is_validated_once_at_construction() {
    assert!(Chunker::new(ChunkingConfig::default()).is_ok());
    let err = Chunker::new(ChunkingConfig::new(50, 50)).unwrap_err();
    assert!(matches!(err, Error::Configuration(_)));
    assert!(err.is_fatal());
}

#[test]
fn dimension_mismatch_is_configuration_error() {
    assert!(check_dimension(384, 384).is_ok());
    assert!(matches!(check_dimension(384, 383), Err(Error::Configuration(_))));
}
