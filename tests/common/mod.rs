//! Shared helpers for search integration tests

#![allow(dead_code)]

use romanized_person_search::models::Person;
use romanized_person_search::search::{
    AdapterRegistry, ReadingDictionary, SearchConfig, SearchService, TantivyIndexStore,
};
use romanized_person_search::state::{InMemoryPersonStore, PersonStore};
use std::sync::Arc;

/// Reading dictionary with a handful of Japanese names
pub fn name_dictionary() -> ReadingDictionary {
    ReadingDictionary::new()
        .with_entry("山田", vec!["yamada"])
        .with_entry("太郎", vec!["taro", "tarou"])
        .with_entry("鈴木", vec!["suzuki"])
        .with_entry("一郎", vec!["ichiro"])
}

/// Reading dictionary with a handful of Japanese places
pub fn location_dictionary() -> ReadingDictionary {
    ReadingDictionary::new()
        .with_entry("東京", vec!["tokyo"])
        .with_entry("仙台", vec!["sendai"])
}

/// Service over an in-memory index with the bundled adapters
pub fn create_service(config: SearchConfig) -> (SearchService, Arc<InMemoryPersonStore>) {
    let records = Arc::new(InMemoryPersonStore::new());
    let registry = AdapterRegistry::with_defaults(name_dictionary(), location_dictionary());
    let index = Arc::new(TantivyIndexStore::new(&config).unwrap());
    let service = SearchService::with_components(config, index, records.clone(), &registry).unwrap();
    (service, records)
}

pub fn create_test_service() -> (SearchService, Arc<InMemoryPersonStore>) {
    create_service(SearchConfig::default())
}

/// Save the person in the record store and index it
pub async fn add_person(service: &SearchService, records: &InMemoryPersonStore, person: Person) {
    records.save_person(&person).await.unwrap();
    service.index_record(&person).await.unwrap();
}

pub fn record_ids(persons: &[Person]) -> Vec<String> {
    let mut ids: Vec<String> = persons.iter().map(|p| p.record_id.clone()).collect();
    ids.sort();
    ids
}
