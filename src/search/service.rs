//! Main search service implementation

use crate::models::Person;
use crate::search::config::SearchConfig;
use crate::search::document::{document_id, DocumentAssembler, PersonDocument, RECORD_ID_FIELD};
use crate::search::error::{SearchError, SearchResult};
use crate::search::fields::romanized_names_field;
use crate::search::index::{IndexStats, IndexStore, TantivyIndexStore};
use crate::search::query::{normalize_query, CoarseQuery, QueryOptions, RefinementFilter, SearchQuery};
use crate::search::transliteration::{AdapterRegistry, ReadingDictionary, Romanizer};
use crate::state::PersonStore;
use chrono::{DateTime, Utc};
use std::path::Path;
use std::sync::Arc;

/// Main search service
pub struct SearchService {
    /// Index store
    index: Arc<dyn IndexStore>,

    /// Record store used to resolve search hits
    records: Arc<dyn PersonStore>,

    assembler: DocumentAssembler,

    /// Adapter normalizing query text
    primary: Arc<dyn Romanizer>,

    /// Configuration
    config: SearchConfig,
}

fn load_dictionary(path: Option<&Path>) -> SearchResult<ReadingDictionary> {
    match path {
        Some(path) => ReadingDictionary::from_json_file(path),
        None => Ok(ReadingDictionary::new()),
    }
}

impl SearchService {
    /// Create a search service over a tantivy index with the bundled adapters
    pub fn new(config: SearchConfig, records: Arc<dyn PersonStore>) -> SearchResult<Self> {
        config.validate()?;

        let registry = AdapterRegistry::with_defaults(
            load_dictionary(config.name_dictionary_path.as_deref())?,
            load_dictionary(config.location_dictionary_path.as_deref())?,
        );
        let index = Arc::new(TantivyIndexStore::new(&config)?);

        Self::with_components(config, index, records, &registry)
    }

    /// Create a search service from explicit collaborators
    pub fn with_components(
        config: SearchConfig,
        index: Arc<dyn IndexStore>,
        records: Arc<dyn PersonStore>,
        registry: &AdapterRegistry,
    ) -> SearchResult<Self> {
        config.validate()?;

        let name_adapters = registry.resolve(&config.name_adapters)?;
        let location_adapters = registry.resolve(&config.location_adapters)?;
        let primary = name_adapters.first().cloned().ok_or_else(|| {
            SearchError::InvalidConfiguration("at least one name adapter is required".to_string())
        })?;

        Ok(Self {
            index,
            records,
            assembler: DocumentAssembler::new(name_adapters, location_adapters),
            primary,
            config,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Build the index document for a person without writing it
    pub fn assemble(&self, person: &Person) -> SearchResult<PersonDocument> {
        self.assembler.assemble(person)
    }

    /// Index (or re-index) a single person
    pub async fn index_record(&self, person: &Person) -> SearchResult<()> {
        let document = self.assembler.assemble(person)?;
        self.index.put(&document).await
    }

    /// Index multiple persons with a single commit.
    ///
    /// Every document is assembled before anything is written, so one adapter
    /// failure leaves the index untouched.
    pub async fn index_records(&self, persons: &[Person]) -> SearchResult<usize> {
        let documents = persons
            .iter()
            .map(|person| self.assembler.assemble(person))
            .collect::<SearchResult<Vec<_>>>()?;

        let indexed = self.index.put_all(&documents).await?;
        tracing::info!(indexed, "Indexed person records");
        Ok(indexed)
    }

    /// Remove a person from the index
    pub async fn remove_record(&self, person: &Person) -> SearchResult<()> {
        self.index
            .delete(&document_id(&person.repo, &person.record_id))
            .await
    }

    /// Remove multiple persons from the index
    pub async fn remove_records(&self, persons: &[Person]) -> SearchResult<usize> {
        let doc_ids: Vec<String> = persons
            .iter()
            .map(|person| document_id(&person.repo, &person.record_id))
            .collect();
        self.index.delete_all(&doc_ids).await
    }

    /// Remove the persons that have expired as of `now`
    pub async fn remove_expired(&self, persons: &[Person], now: DateTime<Utc>) -> SearchResult<usize> {
        let expired: Vec<Person> = persons
            .iter()
            .filter(|person| person.is_expired(now))
            .cloned()
            .collect();
        if expired.is_empty() {
            return Ok(0);
        }

        let removed = self.remove_records(&expired).await?;
        tracing::info!(removed, "Removed expired person records from index");
        Ok(removed)
    }

    /// Search persons of `repo` whose romanized names contain a query word
    pub async fn search(
        &self,
        repo: &str,
        query_text: &str,
        max_results: usize,
    ) -> SearchResult<Vec<Person>> {
        if query_text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let normalized = normalize_query(self.primary.as_ref(), query_text)?;
        let coarse = CoarseQuery::new(&normalized, repo);
        if coarse.is_empty() {
            return Ok(Vec::new());
        }

        let summary_fields = self.romanized_names_fields();
        let mut returned_fields = vec![RECORD_ID_FIELD.to_string()];
        returned_fields.extend(summary_fields.iter().cloned());

        let options = QueryOptions::new(max_results.min(self.config.max_results))
            .with_returned_fields(returned_fields);
        let candidates = self.index.query(&coarse, &options).await?;

        let filter = RefinementFilter::new(&normalized);
        let record_ids: Vec<String> = candidates
            .iter()
            .filter(|hit| filter.matches(hit, &summary_fields))
            .filter_map(|hit| hit.record_id().map(str::to_string))
            .collect();

        let mut results = Vec::with_capacity(record_ids.len());
        for record_id in &record_ids {
            let person = self
                .records
                .get_person(repo, record_id, true)
                .await
                .map_err(|e| SearchError::RecordStore(e.to_string()))?;
            if let Some(person) = person {
                results.push(person);
            }
        }

        tracing::debug!(
            repo = %repo,
            query = %coarse,
            candidates = candidates.len(),
            matches = record_ids.len(),
            results = results.len(),
            "Search completed"
        );

        Ok(results)
    }

    /// Search with a [`SearchQuery`]
    pub async fn search_query(&self, query: &SearchQuery) -> SearchResult<Vec<Person>> {
        self.search(&query.repo, &query.query, query.limit).await
    }

    /// Wire names of the per-adapter romanized name summaries
    fn romanized_names_fields(&self) -> Vec<String> {
        self.assembler
            .name_adapters()
            .iter()
            .map(|adapter| romanized_names_field(adapter.name()))
            .collect()
    }

    /// Get index statistics
    pub async fn get_stats(&self) -> SearchResult<IndexStats> {
        self.index.stats().await
    }

    /// Commit pending changes
    pub async fn commit(&self) -> SearchResult<()> {
        self.index.commit().await
    }

    /// Clear the entire index
    pub async fn clear_index(&self) -> SearchResult<()> {
        self.index.clear().await
    }

    /// Rebuild the entire index from persons
    pub async fn rebuild_index(&self, persons: &[Person]) -> SearchResult<usize> {
        // Assemble first so a failing adapter does not leave an empty index
        let documents = persons
            .iter()
            .map(|person| self.assembler.assemble(person))
            .collect::<SearchResult<Vec<_>>>()?;

        let indexed = self.index.replace_all(&documents).await?;

        tracing::info!(indexed, "Rebuilt person search index");
        Ok(indexed)
    }
}
