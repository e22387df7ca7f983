//! Search document structures and assembly

use crate::models::Person;
use crate::search::error::{SearchError, SearchResult};
use crate::search::fields::{
    build_location_fields, build_name_fields, romanized_names_field, FieldKey,
};
use crate::search::transliteration::Romanizer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tantivy::schema::*;
use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer};
use tantivy::TantivyDocument;

/// Separator between repository and record id in a document id
pub const DOC_ID_SEPARATOR: char = ':';

/// Field name of the repository tag
pub const REPO_FIELD: &str = "repo";

/// Field name of the record id
pub const RECORD_ID_FIELD: &str = "record_id";

/// Index schema field names
pub(crate) mod schema_fields {
    pub const DOC_ID: &str = "doc_id";
    pub const REPO: &str = super::REPO_FIELD;
    pub const RECORD_ID: &str = super::RECORD_ID_FIELD;
    pub const CONTENT: &str = "content";
    pub const FIELDS_JSON: &str = "fields_json";
}

/// Analyzer registered for the content field
pub const CONTENT_TOKENIZER: &str = "romanized";

/// Lowercased word tokens of any length.
///
/// Romanized names and their no-space combinations can run past the length
/// cap of tantivy's default analyzer, so no long-token filter is applied.
pub fn content_analyzer() -> TextAnalyzer {
    TextAnalyzer::builder(SimpleTokenizer::default())
        .filter(LowerCaser)
        .build()
}

/// Document id of a record: `repo:record_id`
pub fn document_id(repo: &str, record_id: &str) -> String {
    format!("{}{}{}", repo, DOC_ID_SEPARATOR, record_id)
}

/// Trait for documents that can be indexed and searched
pub trait SearchDocument {
    /// Convert to Tantivy document
    fn to_tantivy_doc(&self, schema: &Schema) -> SearchResult<TantivyDocument>;

    /// Get document ID
    fn document_id(&self) -> String;
}

/// A named, valued field of a person document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DocumentField {
    Repo,
    RecordId,
    /// One romanized variant
    Romanized(FieldKey),
    /// Colon-joined summary of every name variant by one adapter
    RomanizedNames { adapter: String },
}

impl DocumentField {
    pub fn wire_name(&self) -> String {
        match self {
            DocumentField::Repo => REPO_FIELD.to_string(),
            DocumentField::RecordId => RECORD_ID_FIELD.to_string(),
            DocumentField::Romanized(key) => key.to_string(),
            DocumentField::RomanizedNames { adapter } => romanized_names_field(adapter),
        }
    }
}

/// Indexable form of a person record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonDocument {
    pub doc_id: String,
    pub repo: String,
    pub record_id: String,
    /// Every field in assembly order
    pub fields: Vec<(DocumentField, String)>,
}

impl PersonDocument {
    /// Wire field name to value, the form stored in the index
    pub fn wire_fields(&self) -> BTreeMap<String, String> {
        self.fields
            .iter()
            .map(|(field, value)| (field.wire_name(), value.clone()))
            .collect()
    }

    /// Romanized variant values (names and locations), in assembly order
    pub fn romanized_values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().filter_map(|(field, value)| match field {
            DocumentField::Romanized(_) => Some(value.as_str()),
            _ => None,
        })
    }

    /// Summary of all name variants produced by `adapter`
    pub fn romanized_names(&self, adapter: &str) -> Option<&str> {
        self.fields.iter().find_map(|(field, value)| match field {
            DocumentField::RomanizedNames { adapter: a } if a == adapter => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }
}

impl SearchDocument for PersonDocument {
    fn to_tantivy_doc(&self, schema: &Schema) -> SearchResult<TantivyDocument> {
        let field = |name: &str| {
            schema
                .get_field(name)
                .map_err(|e| SearchError::IndexingFailed(format!("Schema has no {}: {}", name, e)))
        };

        let mut doc = TantivyDocument::new();
        doc.add_text(field(schema_fields::DOC_ID)?, &self.doc_id);
        doc.add_text(field(schema_fields::REPO)?, &self.repo);
        doc.add_text(field(schema_fields::RECORD_ID)?, &self.record_id);

        let content = field(schema_fields::CONTENT)?;
        for value in self.romanized_values() {
            doc.add_text(content, value);
        }

        let fields_json = serde_json::to_string(&self.wire_fields()).map_err(|e| {
            SearchError::IndexingFailed(format!("Failed to encode fields of {}: {}", self.doc_id, e))
        })?;
        doc.add_text(field(schema_fields::FIELDS_JSON)?, &fields_json);

        Ok(doc)
    }

    fn document_id(&self) -> String {
        self.doc_id.clone()
    }
}

/// Builds [`PersonDocument`]s with a fixed set of adapters
#[derive(Clone)]
pub struct DocumentAssembler {
    name_adapters: Vec<Arc<dyn Romanizer>>,
    location_adapters: Vec<Arc<dyn Romanizer>>,
}

impl DocumentAssembler {
    pub fn new(
        name_adapters: Vec<Arc<dyn Romanizer>>,
        location_adapters: Vec<Arc<dyn Romanizer>>,
    ) -> Self {
        Self {
            name_adapters,
            location_adapters,
        }
    }

    pub fn name_adapters(&self) -> &[Arc<dyn Romanizer>] {
        &self.name_adapters
    }

    pub fn location_adapters(&self) -> &[Arc<dyn Romanizer>] {
        &self.location_adapters
    }

    /// Assemble the document for `person`.
    ///
    /// Any adapter failure aborts assembly; a partially romanized document is
    /// never produced.
    pub fn assemble(&self, person: &Person) -> SearchResult<PersonDocument> {
        if person.repo.contains(DOC_ID_SEPARATOR) {
            tracing::warn!(
                repo = %person.repo,
                record_id = %person.record_id,
                "Repository name contains the document id separator"
            );
        }

        let mut fields = vec![
            (DocumentField::Repo, person.repo.clone()),
            (DocumentField::RecordId, person.record_id.clone()),
        ];

        let names = person.name_attributes();
        for adapter in &self.name_adapters {
            let name_fields = build_name_fields(adapter.as_ref(), &names)?;
            let summary = name_fields.summary();
            fields.extend(
                name_fields
                    .fields
                    .into_iter()
                    .map(|(key, value)| (DocumentField::Romanized(key), value)),
            );
            fields.push((
                DocumentField::RomanizedNames {
                    adapter: name_fields.adapter,
                },
                summary,
            ));
        }

        let locations = person.location_attributes();
        for adapter in &self.location_adapters {
            fields.extend(
                build_location_fields(adapter.as_ref(), &locations)?
                    .into_iter()
                    .map(|(key, value)| (DocumentField::Romanized(key), value)),
            );
        }

        let document = PersonDocument {
            doc_id: document_id(&person.repo, &person.record_id),
            repo: person.repo.clone(),
            record_id: person.record_id.clone(),
            fields,
        };

        tracing::debug!(
            doc_id = %document.doc_id,
            fields = document.field_count(),
            "Assembled person document"
        );

        Ok(document)
    }
}

/// Stored projection of an indexed document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexHit {
    pub doc_id: String,
    pub fields: BTreeMap<String, String>,
}

impl IndexHit {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn record_id(&self) -> Option<&str> {
        self.field(RECORD_ID_FIELD)
    }
}

/// Build the search schema for person documents
pub fn build_person_schema() -> Schema {
    let mut schema_builder = Schema::builder();

    // Document id - exact match, stored
    schema_builder.add_text_field(schema_fields::DOC_ID, STRING | STORED);

    // Repository tag - exact match only
    schema_builder.add_text_field(schema_fields::REPO, STRING | STORED);

    // Record id - stored for result resolution
    schema_builder.add_text_field(schema_fields::RECORD_ID, STRING | STORED);

    // Every romanized variant, tokenized, not stored
    let content_indexing = TextFieldIndexing::default()
        .set_tokenizer(CONTENT_TOKENIZER)
        .set_index_option(IndexRecordOption::WithFreqsAndPositions);
    schema_builder.add_text_field(
        schema_fields::CONTENT,
        TextOptions::default().set_indexing_options(content_indexing),
    );

    // Full wire field map as JSON text, stored only
    schema_builder.add_text_field(schema_fields::FIELDS_JSON, STORED);

    schema_builder.build()
}
