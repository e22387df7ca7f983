//! Romanization-aware person search powered by Tantivy
//!
//! Person records carry names and home locations in whatever script they were
//! entered in. This module makes them findable by Latin-script queries:
//!
//! - **Transliteration**: pluggable adapters turn each attribute into zero or
//!   more romanized variants
//! - **Field Building**: variants become named fields, plus concatenated
//!   given/family combinations and a per-adapter names summary
//! - **Indexing**: person documents are upserted into a Tantivy index keyed by
//!   `repo:record_id`
//! - **Two-Phase Search**: a repository-scoped coarse index query followed by a
//!   literal regex refinement over the romanized names
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │           Search Service API                     │
//! ├─────────────────────────────────────────────────┤
//! │  - search()        - index_record()             │
//! │  - remove_record() - remove_expired()           │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │   Document Assembler  →  Field Builder          │
//! │                          →  Romanizer adapters  │
//! └─────────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────────┐
//! │              Tantivy Index                       │
//! ├─────────────────────────────────────────────────┤
//! │  - repo / record_id (exact terms)               │
//! │  - content (romanized variants, tokenized)      │
//! │  - fields_json (stored wire fields)             │
//! └─────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use romanized_person_search::models::Person;
//! use romanized_person_search::search::{SearchConfig, SearchService};
//! use romanized_person_search::state::{InMemoryPersonStore, PersonStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let records = Arc::new(InMemoryPersonStore::new());
//!     let search = SearchService::new(SearchConfig::default(), records.clone())?;
//!
//!     let person = Person::new("r1", "p1").with_name("Yamada", "Taro");
//!     records.save_person(&person).await?;
//!     search.index_record(&person).await?;
//!
//!     let results = search.search("r1", "Yamada", 20).await?;
//!     println!("Found {} persons", results.len());
//!
//!     Ok(())
//! }
//! ```

mod config;
mod document;
mod error;
mod fields;
mod index;
mod query;
mod service;
pub mod transliteration;

pub use config::{SearchConfig, SearchConfigBuilder};
pub use document::{
    build_person_schema, document_id, DocumentAssembler, DocumentField, IndexHit,
    PersonDocument, SearchDocument, DOC_ID_SEPARATOR, RECORD_ID_FIELD, REPO_FIELD,
};
pub use error::{SearchError, SearchResult};
pub use fields::{
    build_location_fields, build_name_fields, no_space_full_names, romanized_names_field,
    Attribute, FieldKey, NameFields, RomanizedField, NAMES_SEPARATOR,
};
pub use index::{IndexStats, IndexStore, TantivyIndexStore, MAX_QUERY_LIMIT};
pub use query::{
    enclose_in_double_quotes, normalize_query, query_words, CoarseQuery, QueryOptions,
    RefinementFilter, SearchQuery,
};
pub use service::SearchService;
pub use transliteration::{AdapterRegistry, ReadingDictionary, Romanizer};
