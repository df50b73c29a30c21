use super::*;
use crate::config::Config;
use tempfile::TempDir;

fn test_config(dir: &TempDir, dimension: u32) -> Config {
    let mut config = Config::load(dir.path()).expect("config should load");
    config.ollama.embedding_dimension = dimension;
    config
}

fn record(seq: u32, vector: Vec<f32>, program_name: &str) -> EmbeddingRecord {
    EmbeddingRecord {
        id: format!("row-{}", seq),
        vector,
        seq,
        chunk: StoredChunk {
            content: format!("{} chunk text", program_name),
            chunk_index: 0,
            metadata: GrantMetadata {
                program_id: seq.to_string(),
                program_name: program_name.to_string(),
                ..GrantMetadata::default()
            },
            created_at: "2024-01-01T00:00:00Z".to_string(),
        },
    }
}

#[tokio::test]
async fn open_existing_without_persisted_data_is_not_found() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(&dir, 128);

    let store = VectorStore::open_existing(&config)
        .await
        .expect("open should succeed");
    assert!(store.is_none());
}

#[tokio::test]
async fn build_persist_and_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(&dir, 128);

    let mut store = VectorStore::create(&config).await.expect("create store");
    store
        .store_embeddings_batch(vec![
            record(0, vec![0.0; 128], "Grant A"),
            record(1, vec![1.0; 128], "Grant B"),
        ])
        .await
        .expect("store embeddings");
    drop(store);

    let reopened = VectorStore::open_existing(&config)
        .await
        .expect("open should succeed")
        .expect("store should exist");
    assert_eq!(reopened.count_rows().await.expect("count rows"), 2);
}

#[tokio::test]
async fn dimension_mismatch_on_open_is_corrupt_index() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(&dir, 128);

    let mut store = VectorStore::create(&config).await.expect("create store");
    store
        .store_embeddings_batch(vec![record(0, vec![0.5; 128], "Grant A")])
        .await
        .expect("store embeddings");
    drop(store);

    let mismatched = test_config(&dir, 256);
    let err = VectorStore::open_existing(&mismatched)
        .await
        .expect_err("mismatched dimension should fail");
    assert!(matches!(err, GrantRagError::CorruptIndex(_)));
}

#[tokio::test]
async fn embedding_width_mismatch_is_rejected_at_insert() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(&dir, 128);

    let mut store = VectorStore::create(&config).await.expect("create store");
    let err = store
        .store_embeddings_batch(vec![record(0, vec![0.5; 64], "Grant A")])
        .await
        .expect_err("short vector should fail");
    assert!(matches!(err, GrantRagError::Index(_)));
}

#[tokio::test]
async fn search_orders_by_distance() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(&dir, 128);

    let mut near = vec![0.0_f32; 128];
    near[0] = 1.0;
    let mut far = vec![0.0_f32; 128];
    far[1] = 5.0;
    let mut query = vec![0.0_f32; 128];
    query[0] = 0.9;

    let mut store = VectorStore::create(&config).await.expect("create store");
    store
        .store_embeddings_batch(vec![record(0, far, "Far Grant"), record(1, near, "Near Grant")])
        .await
        .expect("store embeddings");

    let results = store.search_similar(&query, 2).await.expect("search");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.metadata.program_name, "Near Grant");
    assert!(results[0].distance <= results[1].distance);
}

#[tokio::test]
async fn search_breaks_ties_by_insertion_order() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(&dir, 128);

    let vector = vec![0.25_f32; 128];
    let mut store = VectorStore::create(&config).await.expect("create store");
    store
        .store_embeddings_batch(vec![
            record(0, vector.clone(), "First Inserted"),
            record(1, vector.clone(), "Second Inserted"),
            record(2, vector.clone(), "Third Inserted"),
        ])
        .await
        .expect("store embeddings");

    let results = store.search_similar(&vector, 3).await.expect("search");
    let names: Vec<&str> = results
        .iter()
        .map(|r| r.chunk.metadata.program_name.as_str())
        .collect();
    assert_eq!(names, ["First Inserted", "Second Inserted", "Third Inserted"]);
}

#[tokio::test]
async fn search_returns_at_most_available_rows() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(&dir, 128);

    let mut store = VectorStore::create(&config).await.expect("create store");
    store
        .store_embeddings_batch(vec![record(0, vec![0.1; 128], "Only Grant")])
        .await
        .expect("store embeddings");

    let results = store
        .search_similar(&vec![0.1_f32; 128], 10)
        .await
        .expect("search");
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn zero_limit_is_a_configuration_error() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(&dir, 128);

    let store = VectorStore::create(&config).await.expect("create store");
    let err = store
        .search_similar(&vec![0.1_f32; 128], 0)
        .await
        .expect_err("zero limit should fail");
    assert!(matches!(err, GrantRagError::Config(_)));
}

#[tokio::test]
async fn repeated_searches_are_deterministic() {
    let dir = TempDir::new().expect("temp dir");
    let config = test_config(&dir, 128);

    let mut store = VectorStore::create(&config).await.expect("create store");
    let records: Vec<EmbeddingRecord> = (0..8)
        .map(|i| {
            let mut vector = vec![0.0_f32; 128];
            vector[i as usize] = 1.0 + i as f32 * 0.1;
            record(i, vector, &format!("Grant {}", i))
        })
        .collect();
    store
        .store_embeddings_batch(records)
        .await
        .expect("store embeddings");

    let query = vec![0.3_f32; 128];
    let first = store.search_similar(&query, 5).await.expect("search");
    let second = store.search_similar(&query, 5).await.expect("search");

    let names = |results: &[SearchResult]| {
        results
            .iter()
            .map(|r| r.chunk.metadata.program_name.clone())
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&first), names(&second));
}
