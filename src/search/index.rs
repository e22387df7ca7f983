//! Search index management

use crate::search::config::SearchConfig;
use crate::search::document::{
    build_person_schema, content_analyzer, schema_fields, IndexHit, PersonDocument,
    SearchDocument, CONTENT_TOKENIZER,
};
use crate::search::error::{SearchError, SearchResult};
use crate::search::query::{CoarseQuery, QueryOptions};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, RegexQuery, TermQuery};
use tantivy::schema::{Field, IndexRecordOption, Schema, Value};
use tantivy::tokenizer::{Token, TokenStream};
use tantivy::{Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term};
use tokio::sync::RwLock;

/// Largest result window a single query may request
pub const MAX_QUERY_LIMIT: usize = 1000;

/// Index statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    /// Total number of documents in the index
    pub total_documents: u64,

    /// Index size in bytes (0 for in-memory indexes)
    pub index_size_bytes: u64,

    /// Number of segments
    pub num_segments: usize,

    /// Last commit timestamp
    pub last_commit: Option<DateTime<Utc>>,
}

/// Document store the search engine writes to and queries
#[async_trait]
pub trait IndexStore: Send + Sync {
    /// Insert or overwrite the document with the same id
    async fn put(&self, document: &PersonDocument) -> SearchResult<()>;

    /// Insert or overwrite several documents, returning how many were written
    async fn put_all(&self, documents: &[PersonDocument]) -> SearchResult<usize>;

    /// Delete by document id; unknown ids are not an error
    async fn delete(&self, doc_id: &str) -> SearchResult<()>;

    /// Delete several documents by id, returning how many ids were processed
    async fn delete_all(&self, doc_ids: &[String]) -> SearchResult<usize>;

    /// Run a coarse query, returning hits in index order
    async fn query(&self, query: &CoarseQuery, options: &QueryOptions) -> SearchResult<Vec<IndexHit>>;

    /// Make pending writes visible to queries
    async fn commit(&self) -> SearchResult<()>;

    /// Remove every document
    async fn clear(&self) -> SearchResult<()>;

    /// Replace the whole index content with `documents` in one commit
    async fn replace_all(&self, documents: &[PersonDocument]) -> SearchResult<usize>;

    async fn stats(&self) -> SearchResult<IndexStats>;
}

/// Schema fields resolved once at open time
#[derive(Debug, Clone, Copy)]
struct PersonFields {
    doc_id: Field,
    repo: Field,
    record_id: Field,
    content: Field,
    fields_json: Field,
}

impl PersonFields {
    fn resolve(schema: &Schema) -> SearchResult<Self> {
        let field = |name: &str| {
            schema.get_field(name).map_err(|e| {
                SearchError::IndexInitFailed(format!("Index schema lacks {}: {}", name, e))
            })
        };
        Ok(Self {
            doc_id: field(schema_fields::DOC_ID)?,
            repo: field(schema_fields::REPO)?,
            record_id: field(schema_fields::RECORD_ID)?,
            content: field(schema_fields::CONTENT)?,
            fields_json: field(schema_fields::FIELDS_JSON)?,
        })
    }
}

/// Tantivy-backed [`IndexStore`]
pub struct TantivyIndexStore {
    /// The Tantivy index
    index: Index,

    /// The schema
    schema: Schema,

    fields: PersonFields,

    /// Index writer (wrapped in RwLock for thread-safety)
    writer: Arc<RwLock<IndexWriter>>,

    /// Index reader, reloaded after every commit
    reader: IndexReader,

    /// On-disk location, `None` for in-memory indexes
    index_path: Option<PathBuf>,

    realtime_indexing: bool,

    last_commit: RwLock<Option<DateTime<Utc>>>,
}

impl TantivyIndexStore {
    /// Open (or create) the index described by `config`
    pub fn new(config: &SearchConfig) -> SearchResult<Self> {
        let index = match &config.index_path {
            Some(path) => Self::open_or_create_in_dir(path)?,
            None => Index::create_in_ram(build_person_schema()),
        };

        // Analyzers are not persisted with the index
        index
            .tokenizers()
            .register(CONTENT_TOKENIZER, content_analyzer());

        let schema = index.schema();
        let fields = PersonFields::resolve(&schema)?;

        let writer = index
            .writer_with_num_threads(config.indexing_threads, config.writer_heap_size)
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create writer: {}", e)))?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e| SearchError::IndexInitFailed(format!("Failed to create reader: {}", e)))?;

        tracing::info!(
            path = ?config.index_path,
            realtime = config.realtime_indexing,
            "Opened person search index"
        );

        Ok(Self {
            index,
            schema,
            fields,
            writer: Arc::new(RwLock::new(writer)),
            reader,
            index_path: config.index_path.clone(),
            realtime_indexing: config.realtime_indexing,
            last_commit: RwLock::new(None),
        })
    }

    fn open_or_create_in_dir(path: &Path) -> SearchResult<Index> {
        std::fs::create_dir_all(path).map_err(|e| {
            SearchError::IndexInitFailed(format!("Failed to create index directory: {}", e))
        })?;

        if Self::index_exists(path) {
            Index::open_in_dir(path).map_err(|e| {
                SearchError::IndexInitFailed(format!("Failed to open existing index: {}", e))
            })
        } else {
            Index::create_in_dir(path, build_person_schema()).map_err(|e| {
                SearchError::IndexInitFailed(format!("Failed to create new index: {}", e))
            })
        }
    }

    /// Check if an index exists at the given path
    fn index_exists(path: &Path) -> bool {
        path.join("meta.json").exists()
    }

    /// Get the schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    fn doc_id_term(&self, doc_id: &str) -> Term {
        Term::from_field_text(self.fields.doc_id, doc_id)
    }

    /// Commit and make the new segment visible to the next query
    async fn commit_writer(&self, writer: &mut IndexWriter) -> tantivy::Result<()> {
        writer.commit()?;
        self.reader.reload()?;
        *self.last_commit.write().await = Some(Utc::now());
        Ok(())
    }

    /// Tokens of `phrase` as the content field indexes them
    fn content_tokens(&self, phrase: &str) -> SearchResult<Vec<String>> {
        let mut analyzer = self
            .index
            .tokenizer_for_field(self.fields.content)
            .map_err(|e| SearchError::QueryFailed(format!("No tokenizer for content: {}", e)))?;

        let mut tokens = Vec::new();
        let mut stream = analyzer.token_stream(phrase);
        stream.process(&mut |token: &Token| tokens.push(token.text.clone()));
        Ok(tokens)
    }

    /// Translate a coarse query into must-clauses.
    ///
    /// Each phrase token becomes a substring match over the content term
    /// dictionary, so a fragment of a romanized name still selects the
    /// document. User text is never handed to a query parser.
    fn build_query(&self, query: &CoarseQuery) -> SearchResult<Box<dyn Query>> {
        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::new();

        clauses.push((
            Occur::Must,
            Box::new(TermQuery::new(
                Term::from_field_text(self.fields.repo, &query.repo),
                IndexRecordOption::Basic,
            )),
        ));

        for phrase in &query.phrases {
            for token in self.content_tokens(phrase)? {
                let pattern = format!(".*{}.*", regex::escape(&token));
                let regex_query = RegexQuery::from_pattern(&pattern, self.fields.content)
                    .map_err(|e| {
                        SearchError::QueryFailed(format!("Invalid token pattern {}: {}", pattern, e))
                    })?;
                clauses.push((Occur::Must, Box::new(regex_query)));
            }
        }

        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    fn doc_to_hit(&self, doc: &TantivyDocument, returned_fields: &[String]) -> SearchResult<IndexHit> {
        let doc_id = doc
            .get_first(self.fields.doc_id)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let mut fields: BTreeMap<String, String> = match doc
            .get_first(self.fields.fields_json)
            .and_then(|v| v.as_str())
        {
            Some(json) => serde_json::from_str(json).map_err(|e| {
                SearchError::QueryFailed(format!("Corrupt stored fields for {}: {}", doc_id, e))
            })?,
            None => BTreeMap::new(),
        };

        if let Some(record_id) = doc.get_first(self.fields.record_id).and_then(|v| v.as_str()) {
            fields
                .entry(schema_fields::RECORD_ID.to_string())
                .or_insert_with(|| record_id.to_string());
        }

        if !returned_fields.is_empty() {
            fields.retain(|name, _| returned_fields.iter().any(|wanted| wanted == name));
        }

        Ok(IndexHit { doc_id, fields })
    }
}

#[async_trait]
impl IndexStore for TantivyIndexStore {
    async fn put(&self, document: &PersonDocument) -> SearchResult<()> {
        let tantivy_doc = document.to_tantivy_doc(&self.schema)?;

        let mut writer = self.writer.write().await;

        // Delete existing document with same ID first
        writer.delete_term(self.doc_id_term(&document.document_id()));

        writer
            .add_document(tantivy_doc)
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to add document: {}", e)))?;

        if self.realtime_indexing {
            self.commit_writer(&mut writer).await.map_err(|e| {
                SearchError::IndexingFailed(format!("Failed to commit document: {}", e))
            })?;
        }

        tracing::debug!(doc_id = %document.doc_id, "Document indexed");
        Ok(())
    }

    async fn put_all(&self, documents: &[PersonDocument]) -> SearchResult<usize> {
        let mut writer = self.writer.write().await;
        let mut indexed = 0;

        for document in documents {
            let tantivy_doc = document.to_tantivy_doc(&self.schema)?;
            writer.delete_term(self.doc_id_term(&document.document_id()));
            writer.add_document(tantivy_doc).map_err(|e| {
                SearchError::IndexingFailed(format!(
                    "Failed to add document {}: {}",
                    document.doc_id, e
                ))
            })?;
            indexed += 1;
        }

        self.commit_writer(&mut writer)
            .await
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to commit batch: {}", e)))?;

        Ok(indexed)
    }

    async fn delete(&self, doc_id: &str) -> SearchResult<()> {
        let mut writer = self.writer.write().await;
        writer.delete_term(self.doc_id_term(doc_id));

        if self.realtime_indexing {
            self.commit_writer(&mut writer).await.map_err(|e| {
                SearchError::DeletionFailed(format!("Failed to commit deletion: {}", e))
            })?;
        }

        tracing::debug!(doc_id = %doc_id, "Document deleted");
        Ok(())
    }

    async fn delete_all(&self, doc_ids: &[String]) -> SearchResult<usize> {
        let mut writer = self.writer.write().await;
        for doc_id in doc_ids {
            writer.delete_term(self.doc_id_term(doc_id));
        }

        self.commit_writer(&mut writer).await.map_err(|e| {
            SearchError::DeletionFailed(format!("Failed to commit deletions: {}", e))
        })?;

        Ok(doc_ids.len())
    }

    async fn query(&self, query: &CoarseQuery, options: &QueryOptions) -> SearchResult<Vec<IndexHit>> {
        let limit = options.limit.min(MAX_QUERY_LIMIT);
        if limit == 0 {
            return Ok(Vec::new());
        }

        let tantivy_query = self.build_query(query)?;
        let searcher = self.reader.searcher();

        let top_docs = searcher
            .search(&*tantivy_query, &TopDocs::with_limit(limit))
            .map_err(|e| SearchError::QueryFailed(format!("Search execution failed: {}", e)))?;

        let mut hits = Vec::with_capacity(top_docs.len());
        for (_score, doc_address) in top_docs {
            let retrieved: TantivyDocument = searcher
                .doc(doc_address)
                .map_err(|e| SearchError::QueryFailed(format!("Failed to retrieve doc: {}", e)))?;
            hits.push(self.doc_to_hit(&retrieved, &options.returned_fields)?);
        }

        tracing::debug!(query = %query, hits = hits.len(), "Coarse query executed");
        Ok(hits)
    }

    async fn commit(&self) -> SearchResult<()> {
        let mut writer = self.writer.write().await;
        self.commit_writer(&mut writer)
            .await
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to commit: {}", e)))
    }

    async fn clear(&self) -> SearchResult<()> {
        let mut writer = self.writer.write().await;
        writer.delete_all_documents().map_err(|e| {
            SearchError::IndexingFailed(format!("Failed to clear index: {}", e))
        })?;
        self.commit_writer(&mut writer)
            .await
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to commit clear: {}", e)))
    }

    async fn replace_all(&self, documents: &[PersonDocument]) -> SearchResult<usize> {
        let tantivy_docs = documents
            .iter()
            .map(|document| document.to_tantivy_doc(&self.schema))
            .collect::<SearchResult<Vec<_>>>()?;

        let mut writer = self.writer.write().await;
        writer.delete_all_documents().map_err(|e| {
            SearchError::IndexingFailed(format!("Failed to clear index: {}", e))
        })?;
        for tantivy_doc in tantivy_docs {
            writer.add_document(tantivy_doc).map_err(|e| {
                SearchError::IndexingFailed(format!("Failed to add document: {}", e))
            })?;
        }

        // Readers only ever see the old or the new content
        self.commit_writer(&mut writer)
            .await
            .map_err(|e| SearchError::IndexingFailed(format!("Failed to commit rebuild: {}", e)))?;

        Ok(documents.len())
    }

    async fn stats(&self) -> SearchResult<IndexStats> {
        let searcher = self.reader.searcher();

        let index_size_bytes = self
            .index_path
            .as_ref()
            .and_then(|path| std::fs::read_dir(path).ok())
            .map(|entries| {
                entries
                    .filter_map(|e| e.ok())
                    .filter_map(|e| e.metadata().ok())
                    .map(|m| m.len())
                    .sum()
            })
            .unwrap_or(0);

        Ok(IndexStats {
            total_documents: searcher.num_docs(),
            index_size_bytes,
            num_segments: searcher.segment_readers().len(),
            last_commit: *self.last_commit.read().await,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Person;
    use crate::search::document::DocumentAssembler;
    use crate::search::transliteration::{FnRomanizer, Romanizer};
    use tempfile::TempDir;

    fn assembler() -> DocumentAssembler {
        let identity: Arc<dyn Romanizer> =
            Arc::new(FnRomanizer::new("identity", |text: &str| vec![text.to_string()]));
        DocumentAssembler::new(vec![identity.clone()], vec![identity])
    }

    fn document(repo: &str, record_id: &str, given: &str, family: &str) -> PersonDocument {
        assembler()
            .assemble(&Person::new(repo, record_id).with_name(given, family))
            .unwrap()
    }

    fn options() -> QueryOptions {
        QueryOptions::new(10)
    }

    #[tokio::test]
    async fn test_index_creation_in_ram() {
        let store = TantivyIndexStore::new(&SearchConfig::default()).unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_documents, 0);
        assert_eq!(stats.index_size_bytes, 0);
        assert!(stats.last_commit.is_none());
    }

    #[tokio::test]
    async fn test_index_creation_on_disk() {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };

        let store = TantivyIndexStore::new(&config).unwrap();
        store.put(&document("r1", "p1", "Taro", "Yamada")).await.unwrap();
        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_documents, 1);
        assert!(stats.index_size_bytes > 0);
        drop(store);

        // Reopen the existing index
        let reopened = TantivyIndexStore::new(&config).unwrap();
        assert_eq!(reopened.stats().await.unwrap().total_documents, 1);
    }

    #[tokio::test]
    async fn test_put_overwrites_same_id() {
        let store = TantivyIndexStore::new(&SearchConfig::default()).unwrap();
        store.put(&document("r1", "p1", "Taro", "Yamada")).await.unwrap();
        store.put(&document("r1", "p1", "Hanako", "Suzuki")).await.unwrap();

        assert_eq!(store.stats().await.unwrap().total_documents, 1);

        let hits = store
            .query(&CoarseQuery::new("Suzuki", "r1"), &options())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(store
            .query(&CoarseQuery::new("Yamada", "r1"), &options())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_query_matches_token_fragments() {
        let store = TantivyIndexStore::new(&SearchConfig::default()).unwrap();
        store.put(&document("r1", "p1", "Taro", "Yamada")).await.unwrap();

        for text in ["yama", "ADA", "taroyam", "Yamada Taro"] {
            let hits = store
                .query(&CoarseQuery::new(text, "r1"), &options())
                .await
                .unwrap();
            assert_eq!(hits.len(), 1, "query {:?}", text);
            assert_eq!(hits[0].doc_id, "r1:p1");
        }

        let hits = store
            .query(&CoarseQuery::new("Yamada Suzuki", "r1"), &options())
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_query_matches_tokens_past_forty_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let config = SearchConfig {
            index_path: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        let given = "Ramanathapuram";
        let family = "Venkatasubramaniansrinivasan";
        assert!(given.len() + family.len() > 40);

        let store = TantivyIndexStore::new(&config).unwrap();
        store.put(&document("r1", "p1", given, family)).await.unwrap();
        drop(store);

        // The analyzer has to be registered again after reopening
        let store = TantivyIndexStore::new(&config).unwrap();
        for text in [
            "RamanathapuramVenkata",
            "VenkatasubramaniansrinivasanRamanathapuram",
            "subramaniansrini",
        ] {
            let hits = store
                .query(&CoarseQuery::new(text, "r1"), &options())
                .await
                .unwrap();
            assert_eq!(hits.len(), 1, "query {:?}", text);
        }
    }

    #[tokio::test]
    async fn test_replace_all() {
        let store = TantivyIndexStore::new(&SearchConfig::default()).unwrap();
        store.put(&document("r1", "p1", "Taro", "Yamada")).await.unwrap();
        store.put(&document("r1", "p2", "Ichiro", "Suzuki")).await.unwrap();

        let replaced = store
            .replace_all(&[document("r1", "p3", "Hanako", "Tanaka")])
            .await
            .unwrap();
        assert_eq!(replaced, 1);
        assert_eq!(store.stats().await.unwrap().total_documents, 1);

        assert!(store
            .query(&CoarseQuery::new("Yamada", "r1"), &options())
            .await
            .unwrap()
            .is_empty());
        let hits = store
            .query(&CoarseQuery::new("Tanaka", "r1"), &options())
            .await
            .unwrap();
        assert_eq!(hits[0].doc_id, "r1:p3");
    }

    #[tokio::test]
    async fn test_query_is_scoped_to_repo() {
        let store = TantivyIndexStore::new(&SearchConfig::default()).unwrap();
        store.put(&document("r1", "p1", "Taro", "Yamada")).await.unwrap();
        store.put(&document("r2", "p1", "Taro", "Yamada")).await.unwrap();

        let hits = store
            .query(&CoarseQuery::new("Yamada", "r2"), &options())
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].doc_id, "r2:p1");

        assert!(store
            .query(&CoarseQuery::new("Yamada", "r3"), &options())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_returned_fields_projection() {
        let store = TantivyIndexStore::new(&SearchConfig::default()).unwrap();
        store.put(&document("r1", "p1", "Taro", "Yamada")).await.unwrap();

        let options = QueryOptions::new(10).with_returned_fields(vec![
            "record_id".to_string(),
            "names_romanized_by_identity".to_string(),
        ]);
        let hits = store
            .query(&CoarseQuery::new("Taro", "r1"), &options)
            .await
            .unwrap();

        assert_eq!(hits[0].fields.len(), 2);
        assert_eq!(hits[0].record_id(), Some("p1"));
        assert_eq!(
            hits[0].field("names_romanized_by_identity"),
            Some("Taro:Yamada:TaroYamada:YamadaTaro")
        );
    }

    #[tokio::test]
    async fn test_limit_is_respected() {
        let store = TantivyIndexStore::new(&SearchConfig::default()).unwrap();
        let documents: Vec<_> = (0..5)
            .map(|i| document("r1", &format!("p{}", i), "Taro", "Yamada"))
            .collect();
        assert_eq!(store.put_all(&documents).await.unwrap(), 5);

        let hits = store
            .query(&CoarseQuery::new("Taro", "r1"), &QueryOptions::new(3))
            .await
            .unwrap();
        assert_eq!(hits.len(), 3);

        let hits = store
            .query(&CoarseQuery::new("Taro", "r1"), &QueryOptions::new(0))
            .await
            .unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_delete_and_delete_missing() {
        let store = TantivyIndexStore::new(&SearchConfig::default()).unwrap();
        store.put(&document("r1", "p1", "Taro", "Yamada")).await.unwrap();

        store.delete("r1:p1").await.unwrap();
        store.delete("r1:does-not-exist").await.unwrap();

        assert_eq!(store.stats().await.unwrap().total_documents, 0);
        assert!(store
            .query(&CoarseQuery::new("Yamada", "r1"), &options())
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_deferred_commit() {
        let config = SearchConfig {
            realtime_indexing: false,
            ..Default::default()
        };
        let store = TantivyIndexStore::new(&config).unwrap();
        store.put(&document("r1", "p1", "Taro", "Yamada")).await.unwrap();
        assert_eq!(store.stats().await.unwrap().total_documents, 0);

        store.commit().await.unwrap();
        assert_eq!(store.stats().await.unwrap().total_documents, 1);
    }

    #[tokio::test]
    async fn test_clear() {
        let store = TantivyIndexStore::new(&SearchConfig::default()).unwrap();
        store.put(&document("r1", "p1", "Taro", "Yamada")).await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.stats().await.unwrap().total_documents, 0);
    }
}
