#[cfg(test)]
mod tests;

use super::{EmbeddingRecord, StoredChunk};
use crate::config::Config;
use crate::grants::GrantMetadata;
use crate::{GrantRagError, Result};
use arrow::array::{Array, FixedSizeListArray, Float32Array, RecordBatchIterator, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use futures::TryStreamExt;
use lancedb::{
    Connection,
    query::{ExecutableQuery, QueryBase},
};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

const TABLE_NAME: &str = "grant_chunks";

/// Vector index over grant chunks, persisted as a LanceDB dataset.
///
/// A store is either created fresh by a build (which drops any previous
/// table) or opened from a previously persisted dataset. After a build
/// completes the store is read-only shared state; nothing mutates rows.
pub struct VectorStore {
    connection: Connection,
    vector_dimension: usize,
}

/// Search result from vector similarity search. Lower distance means more
/// similar.
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: StoredChunk,
    pub distance: f32,
}

impl VectorStore {
    /// Create a store with a fresh, empty table for a full rebuild, dropping
    /// any previously persisted table.
    ///
    /// # Arguments
    /// * `config` - Application configuration holding the index path and the
    ///   pinned embedding dimension
    #[inline]
    pub async fn create(config: &Config) -> Result<Self> {
        let db_path = config.vector_database_path();
        debug!("Initializing LanceDB at path: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GrantRagError::Index(format!("Failed to create vector database directory: {}", e))
            })?;
        }

        let connection = connect_to(&db_path)
            .await
            .map_err(|e| GrantRagError::Index(format!("Failed to connect to LanceDB: {}", e)))?;

        let vector_dimension = config.ollama.embedding_dimension as usize;
        let store = Self {
            connection,
            vector_dimension,
        };

        store.drop_table_if_exists().await?;

        let schema = store.create_schema();
        store
            .connection
            .create_empty_table(TABLE_NAME, schema)
            .execute()
            .await
            .map_err(|e| GrantRagError::Index(format!("Failed to create table: {}", e)))?;

        info!(
            "Vector store initialized with {} dimensions",
            vector_dimension
        );
        Ok(store)
    }

    /// Open a previously persisted store without re-embedding anything.
    ///
    /// # Returns
    /// * `Ok(None)` when nothing has been persisted at the configured path
    ///   (not an error; callers build fresh)
    /// * `Err(CorruptIndex)` when a dataset exists but cannot be used,
    ///   including a stored vector width that contradicts the configured
    ///   embedding dimension (that would mean querying with a different
    ///   model than the one the index was built with)
    #[inline]
    pub async fn open_existing(config: &Config) -> Result<Option<Self>> {
        let db_path = config.vector_database_path();
        if !db_path.exists() {
            debug!("No persisted index at {:?}", db_path);
            return Ok(None);
        }

        let connection = connect_to(&db_path).await.map_err(|e| {
            GrantRagError::CorruptIndex(format!("Failed to open vector database: {}", e))
        })?;

        let table_names = connection
            .table_names()
            .execute()
            .await
            .map_err(|e| GrantRagError::CorruptIndex(format!("Failed to list tables: {}", e)))?;

        if !table_names.iter().any(|name| name == TABLE_NAME) {
            debug!("Persisted dataset holds no {} table", TABLE_NAME);
            return Ok(None);
        }

        let stored_dimension = detect_vector_dimension(&connection).await?;
        let configured_dimension = config.ollama.embedding_dimension as usize;
        if stored_dimension != configured_dimension {
            return Err(GrantRagError::CorruptIndex(format!(
                "stored vectors are {}-dimensional but the configured embedding model produces {} dimensions",
                stored_dimension, configured_dimension
            )));
        }

        info!("Opened persisted vector store at {:?}", db_path);
        Ok(Some(Self {
            connection,
            vector_dimension: stored_dimension,
        }))
    }

    /// Remove the persisted dataset entirely. Used when a corrupt index has
    /// to make way for a fresh build, and by explicit rebuilds.
    #[inline]
    pub fn wipe(config: &Config) -> Result<()> {
        let db_path = config.vector_database_path();
        if db_path.exists() {
            warn!("Removing persisted index at {:?}", db_path);
            std::fs::remove_dir_all(&db_path).map_err(|e| {
                GrantRagError::Index(format!("Failed to remove persisted index: {}", e))
            })?;
        }
        Ok(())
    }

    /// Store a batch of embedding rows.
    ///
    /// # Arguments
    /// * `records` - Rows to append; every vector must match the store's
    ///   dimension
    #[inline]
    pub async fn store_embeddings_batch(&mut self, records: Vec<EmbeddingRecord>) -> Result<()> {
        if records.is_empty() {
            debug!("No embeddings to store");
            return Ok(());
        }

        debug!("Storing batch of {} embeddings", records.len());

        if let Some(bad) = records
            .iter()
            .find(|r| r.vector.len() != self.vector_dimension)
        {
            return Err(GrantRagError::Index(format!(
                "embedding width mismatch: expected {} dimensions, got {}",
                self.vector_dimension,
                bad.vector.len()
            )));
        }

        let record_batch = self.create_record_batch(&records)?;

        let table = self.open_table().await?;
        let schema = record_batch.schema();
        let reader = RecordBatchIterator::new(std::iter::once(Ok(record_batch)), schema);
        table
            .add(reader)
            .execute()
            .await
            .map_err(|e| GrantRagError::Index(format!("Failed to insert embeddings: {}", e)))?;

        info!("Stored {} embeddings", records.len());
        Ok(())
    }

    /// Search for the k nearest chunks to a query vector.
    ///
    /// Results come back closest first; equal distances are ordered by
    /// insertion ordinal so repeated queries are deterministic. Fewer than k
    /// results are returned only when the table holds fewer rows.
    #[inline]
    pub async fn search_similar(&self, query_vector: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(GrantRagError::Config(
                "search limit must be at least 1".to_string(),
            ));
        }
        if query_vector.len() != self.vector_dimension {
            return Err(GrantRagError::Embedding(format!(
                "query vector has {} dimensions, index expects {}",
                query_vector.len(),
                self.vector_dimension
            )));
        }

        debug!("Searching for similar vectors with limit: {}", k);

        let table = self.open_table().await?;
        let mut results = table
            .vector_search(query_vector)
            .map_err(|e| GrantRagError::Index(format!("Failed to create vector search: {}", e)))?
            .column("vector")
            .limit(k)
            .execute()
            .await
            .map_err(|e| GrantRagError::Index(format!("Failed to execute search: {}", e)))?;

        let mut rows: Vec<(SearchResult, u32)> = Vec::new();
        while let Some(batch) = results
            .try_next()
            .await
            .map_err(|e| GrantRagError::Index(format!("Failed to read result stream: {}", e)))?
        {
            rows.extend(parse_search_batch(&batch)?);
        }

        rows.sort_by(|(a, a_seq), (b, b_seq)| {
            a.distance.total_cmp(&b.distance).then(a_seq.cmp(b_seq))
        });

        debug!("Parsed {} search results", rows.len());
        Ok(rows.into_iter().map(|(result, _)| result).collect())
    }

    /// Total number of rows in the index
    #[inline]
    pub async fn count_rows(&self) -> Result<usize> {
        let table = self.open_table().await?;
        table
            .count_rows(None)
            .await
            .map_err(|e| GrantRagError::Index(format!("Failed to count rows: {}", e)))
    }

    async fn open_table(&self) -> Result<lancedb::Table> {
        self.connection
            .open_table(TABLE_NAME)
            .execute()
            .await
            .map_err(|e| GrantRagError::Index(format!("Failed to open table: {}", e)))
    }

    async fn drop_table_if_exists(&self) -> Result<()> {
        let table_names = self
            .connection
            .table_names()
            .execute()
            .await
            .map_err(|e| GrantRagError::Index(format!("Failed to list tables: {}", e)))?;

        if table_names.iter().any(|name| name == TABLE_NAME) {
            info!("Dropping existing {} table", TABLE_NAME);
            self.connection
                .drop_table(TABLE_NAME)
                .await
                .map_err(|e| GrantRagError::Index(format!("Failed to drop table: {}", e)))?;
        }

        Ok(())
    }

    /// Schema for the embeddings table: one row per chunk, vector plus the
    /// flattened metadata projection
    fn create_schema(&self) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new(
                "vector",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, false)),
                    self.vector_dimension as i32,
                ),
                false,
            ),
            Field::new("seq", DataType::UInt32, false),
            Field::new("content", DataType::Utf8, false),
            Field::new("chunk_index", DataType::UInt32, false),
            Field::new("program_id", DataType::Utf8, false),
            Field::new("program_name", DataType::Utf8, false),
            Field::new("program_status", DataType::Utf8, false),
            Field::new("location", DataType::Utf8, false),
            Field::new("country", DataType::Utf8, false),
            Field::new("target_audience", DataType::Utf8, false),
            Field::new("main_industry", DataType::Utf8, false),
            Field::new("created_at", DataType::Utf8, false),
        ]))
    }

    /// Assemble an arrow RecordBatch from embedding rows
    fn create_record_batch(&self, records: &[EmbeddingRecord]) -> Result<RecordBatch> {
        let len = records.len();

        let mut ids = Vec::with_capacity(len);
        let mut seqs = Vec::with_capacity(len);
        let mut contents = Vec::with_capacity(len);
        let mut chunk_indices = Vec::with_capacity(len);
        let mut program_ids = Vec::with_capacity(len);
        let mut program_names = Vec::with_capacity(len);
        let mut program_statuses = Vec::with_capacity(len);
        let mut locations = Vec::with_capacity(len);
        let mut countries = Vec::with_capacity(len);
        let mut target_audiences = Vec::with_capacity(len);
        let mut main_industries = Vec::with_capacity(len);
        let mut created_ats = Vec::with_capacity(len);

        for record in records {
            ids.push(record.id.as_str());
            seqs.push(record.seq);
            contents.push(record.chunk.content.as_str());
            chunk_indices.push(record.chunk.chunk_index);
            program_ids.push(record.chunk.metadata.program_id.as_str());
            program_names.push(record.chunk.metadata.program_name.as_str());
            program_statuses.push(record.chunk.metadata.program_status.as_str());
            locations.push(record.chunk.metadata.location.as_str());
            countries.push(record.chunk.metadata.country.as_str());
            target_audiences.push(record.chunk.metadata.target_audience.as_str());
            main_industries.push(record.chunk.metadata.main_industry.as_str());
            created_ats.push(record.chunk.created_at.as_str());
        }

        let mut flat_values = Vec::with_capacity(len * self.vector_dimension);
        for record in records {
            flat_values.extend_from_slice(&record.vector);
        }
        let values_array = Float32Array::from(flat_values);
        let field = Arc::new(Field::new("item", DataType::Float32, false));
        let vector_array = FixedSizeListArray::try_new(
            field,
            self.vector_dimension as i32,
            Arc::new(values_array),
            None,
        )
        .map_err(|e| GrantRagError::Index(format!("Failed to create vector array: {}", e)))?;

        let arrays: Vec<Arc<dyn Array>> = vec![
            Arc::new(StringArray::from(ids)),
            Arc::new(vector_array),
            Arc::new(UInt32Array::from(seqs)),
            Arc::new(StringArray::from(contents)),
            Arc::new(UInt32Array::from(chunk_indices)),
            Arc::new(StringArray::from(program_ids)),
            Arc::new(StringArray::from(program_names)),
            Arc::new(StringArray::from(program_statuses)),
            Arc::new(StringArray::from(locations)),
            Arc::new(StringArray::from(countries)),
            Arc::new(StringArray::from(target_audiences)),
            Arc::new(StringArray::from(main_industries)),
            Arc::new(StringArray::from(created_ats)),
        ];

        RecordBatch::try_new(self.create_schema(), arrays)
            .map_err(|e| GrantRagError::Index(format!("Failed to create record batch: {}", e)))
    }
}

async fn connect_to(db_path: &Path) -> std::result::Result<Connection, lancedb::Error> {
    let uri = format!("file://{}", db_path.display());
    lancedb::connect(&uri).execute().await
}

/// Read the stored vector width out of the persisted table schema
async fn detect_vector_dimension(connection: &Connection) -> Result<usize> {
    let table = connection
        .open_table(TABLE_NAME)
        .execute()
        .await
        .map_err(|e| GrantRagError::CorruptIndex(format!("Failed to open table: {}", e)))?;

    let schema = table
        .schema()
        .await
        .map_err(|e| GrantRagError::CorruptIndex(format!("Failed to get table schema: {}", e)))?;

    for field in schema.fields() {
        if field.name() == "vector" {
            if let DataType::FixedSizeList(_, size) = field.data_type() {
                return Ok(*size as usize);
            }
        }
    }

    Err(GrantRagError::CorruptIndex(
        "could not find vector column or determine dimension".to_string(),
    ))
}

/// Parse one record batch of search results into (result, seq) pairs
fn parse_search_batch(batch: &RecordBatch) -> Result<Vec<(SearchResult, u32)>> {
    let contents = string_column(batch, "content")?;
    let chunk_indices = u32_column(batch, "chunk_index")?;
    let seqs = u32_column(batch, "seq")?;
    let program_ids = string_column(batch, "program_id")?;
    let program_names = string_column(batch, "program_name")?;
    let program_statuses = string_column(batch, "program_status")?;
    let locations = string_column(batch, "location")?;
    let countries = string_column(batch, "country")?;
    let target_audiences = string_column(batch, "target_audience")?;
    let main_industries = string_column(batch, "main_industry")?;
    let created_ats = string_column(batch, "created_at")?;

    let distances = batch
        .column_by_name("_distance")
        .map(|col| col.as_any().downcast_ref::<Float32Array>());

    let mut rows = Vec::with_capacity(batch.num_rows());
    for row in 0..batch.num_rows() {
        let chunk = StoredChunk {
            content: contents.value(row).to_string(),
            chunk_index: chunk_indices.value(row),
            metadata: GrantMetadata {
                program_id: program_ids.value(row).to_string(),
                program_name: program_names.value(row).to_string(),
                program_status: program_statuses.value(row).to_string(),
                location: locations.value(row).to_string(),
                country: countries.value(row).to_string(),
                target_audience: target_audiences.value(row).to_string(),
                main_industry: main_industries.value(row).to_string(),
            },
            created_at: created_ats.value(row).to_string(),
        };

        let distance = distances
            .flatten()
            .map_or(0.0, |d| if d.is_null(row) { 0.0 } else { d.value(row) });

        rows.push((SearchResult { chunk, distance }, seqs.value(row)));
    }

    Ok(rows)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| GrantRagError::Index(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| GrantRagError::Index(format!("Invalid {} column type", name)))
}

fn u32_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a UInt32Array> {
    batch
        .column_by_name(name)
        .ok_or_else(|| GrantRagError::Index(format!("Missing {} column", name)))?
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| GrantRagError::Index(format!("Invalid {} column type", name)))
}
