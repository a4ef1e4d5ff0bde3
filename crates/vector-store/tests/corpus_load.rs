use std::fs;
use tempfile::tempdir;
use vana_vector_store::{VectorStore, VectorStoreError};

#[tokio::test]
async fn load_embeds_documents_from_corpus_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corpus.json");
    fs::write(
        &path,
        r#"{
          "schema_version": 1,
          "documents": [
            {"id": "ci", "content": "continuous integration pipelines run on every push"},
            {"id": "db", "content": "postgres replication and failover"}
          ]
        }"#,
    )
    .unwrap();

    let store = VectorStore::load(&path, 64).await.unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.dimension(), 64);

    let hits = store
        .semantic_search_simple("postgres replication and failover", 1)
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "db");
}

#[tokio::test]
async fn load_rejects_zero_dimension() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("corpus.json");
    fs::write(&path, r#"{"documents": []}"#).unwrap();

    let err = VectorStore::load(&path, 0).await.err().unwrap();
    assert!(matches!(err, VectorStoreError::InvalidConfig(_)));
}
