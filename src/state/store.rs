use crate::error::{AppError, Result};
use crate::models::Person;
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use std::path::Path;
use std::sync::Arc;
use validator::Validate;

/// Trait for person record storage operations
#[async_trait]
pub trait PersonStore: Send + Sync {
    /// Save (insert or replace) a person record
    async fn save_person(&self, person: &Person) -> Result<()>;

    /// Get a person by repository and record id.
    ///
    /// With `filter_expired`, records past their expiry date are reported as
    /// absent.
    async fn get_person(
        &self,
        repo: &str,
        record_id: &str,
        filter_expired: bool,
    ) -> Result<Option<Person>>;

    /// Delete a person record
    async fn delete_person(&self, repo: &str, record_id: &str) -> Result<()>;

    /// List every record of a repository, expired ones included
    async fn list_persons(&self, repo: &str) -> Result<Vec<Person>>;
}

/// In-memory person store (for the CLI and testing)
#[derive(Clone, Default)]
pub struct InMemoryPersonStore {
    persons: Arc<DashMap<(String, String), Person>>,
}

impl InMemoryPersonStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load records from a JSON array file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let persons: Vec<Person> = serde_json::from_str(&json)?;

        let store = Self::new();
        for person in persons {
            person.validate()?;
            store.insert(person);
        }
        tracing::info!(
            path = %path.as_ref().display(),
            records = store.len(),
            "Loaded person records"
        );
        Ok(store)
    }

    fn insert(&self, person: Person) {
        self.persons
            .insert((person.repo.clone(), person.record_id.clone()), person);
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Every stored record, in no particular order
    pub fn all(&self) -> Vec<Person> {
        self.persons.iter().map(|entry| entry.value().clone()).collect()
    }
}

#[async_trait]
impl PersonStore for InMemoryPersonStore {
    async fn save_person(&self, person: &Person) -> Result<()> {
        person.validate()?;
        self.insert(person.clone());
        tracing::debug!(repo = %person.repo, record_id = %person.record_id, "Person saved");
        Ok(())
    }

    async fn get_person(
        &self,
        repo: &str,
        record_id: &str,
        filter_expired: bool,
    ) -> Result<Option<Person>> {
        let key = (repo.to_string(), record_id.to_string());
        let person = self.persons.get(&key).map(|entry| entry.clone());

        Ok(person.filter(|p| !(filter_expired && p.is_expired(Utc::now()))))
    }

    async fn delete_person(&self, repo: &str, record_id: &str) -> Result<()> {
        let key = (repo.to_string(), record_id.to_string());
        if self.persons.remove(&key).is_some() {
            tracing::debug!(repo = %repo, record_id = %record_id, "Person deleted");
            Ok(())
        } else {
            Err(AppError::NotFound(format!(
                "Person {}/{} not found",
                repo, record_id
            )))
        }
    }

    async fn list_persons(&self, repo: &str) -> Result<Vec<Person>> {
        let mut persons: Vec<Person> = self
            .persons
            .iter()
            .filter(|entry| entry.key().0 == repo)
            .map(|entry| entry.value().clone())
            .collect();
        persons.sort_by(|a, b| a.record_id.cmp(&b.record_id));
        Ok(persons)
    }
}
