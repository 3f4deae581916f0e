use jarvis_core::config::{EmbedderBackend, IndexBackendKind, Settings};
use jarvis_core::types::ChatRequest;
use jarvis_llm::FALLBACK_MARKER;
use jarvis_rag::{bootstrap, build_pipeline};

fn offline_settings(knowledge: &std::path::Path) -> Settings {
    let mut s = Settings::default();
    s.knowledge.path = knowledge.display().to_string();
    s.knowledge.chunk_size = 120;
    s.knowledge.overlap = 20;
    s.embedder.backend = EmbedderBackend::Hash;
    s.index.backend = IndexBackendKind::Memory;
    s.generator.fallback_mode = true;
    s
}

#[test]
fn bootstrap_ingests_the_knowledge_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.txt");
    std::fs::write(&path, "Rainwater tanks need first-flush diverters. ".repeat(10)).unwrap();

    let pipeline = bootstrap(&offline_settings(&path)).unwrap();
    let report_chunks = match pipeline.index() {
        jarvis_vector::IndexBackend::Memory(index) => index.len(),
        jarvis_vector::IndexBackend::Pinecone(_) => unreachable!(),
    };
    assert_eq!(report_chunks, 5);

    let response = pipeline.chat(&ChatRequest { query: "What do rainwater tanks need?".into() }).unwrap();
    assert!(response.answer.contains(FALLBACK_MARKER));
}

#[test]
fn missing_knowledge_file_degrades_instead_of_failing() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = bootstrap(&offline_settings(&dir.path().join("absent.txt"))).unwrap();
    assert!(pipeline.retrieve("anything", 5).unwrap().is_empty());
}

#[test]
fn ingestion_can_be_skipped_at_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("knowledge.txt");
    std::fs::write(&path, "solar").unwrap();
    let mut settings = offline_settings(&path);
    settings.knowledge.ingest_on_startup = false;
    let pipeline = bootstrap(&settings).unwrap();
    assert!(pipeline.retrieve("solar", 5).unwrap().is_empty());
}

#[test]
fn configuration_errors_stop_startup() {
    let dir = tempfile::tempdir().unwrap();
    let mut settings = offline_settings(&dir.path().join("k.txt"));
    settings.index.backend = IndexBackendKind::Pinecone;
    let err = build_pipeline(&settings).err().unwrap();
    assert!(err.is_fatal());

    let mut settings = offline_settings(&dir.path().join("k.txt"));
    settings.knowledge.overlap = settings.knowledge.chunk_size;
    assert!(build_pipeline(&settings).err().unwrap().is_fatal());
}
