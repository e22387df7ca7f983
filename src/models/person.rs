use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A person record as owned by the record store.
///
/// Identified by `(repo, record_id)`. Name and location fields may be written
/// in any script; the search engine romanizes them at index time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Person {
    /// Repository (tenant) the record belongs to
    #[validate(length(min = 1, max = 255))]
    pub repo: String,

    /// Record identifier, unique within the repository
    #[validate(length(min = 1, max = 500))]
    pub record_id: String,

    #[serde(default)]
    pub given_name: String,

    #[serde(default)]
    pub family_name: String,

    #[serde(default)]
    pub full_name: String,

    #[serde(default)]
    pub alternate_names: Vec<String>,

    #[serde(default)]
    pub home_street: String,

    #[serde(default)]
    pub home_city: String,

    #[serde(default)]
    pub home_state: String,

    #[serde(default)]
    pub home_postal_code: String,

    #[serde(default)]
    pub home_neighborhood: String,

    #[serde(default)]
    pub home_country: String,

    /// Records past this instant are treated as absent by expiry-aware lookups
    #[serde(default)]
    pub expiry_date: Option<DateTime<Utc>>,
}

impl Person {
    /// Create an empty record for `repo`/`record_id`
    pub fn new(repo: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            record_id: record_id.into(),
            ..Default::default()
        }
    }

    /// Set given and family name
    pub fn with_name(mut self, given_name: impl Into<String>, family_name: impl Into<String>) -> Self {
        self.given_name = given_name.into();
        self.family_name = family_name.into();
        self
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = full_name.into();
        self
    }

    pub fn with_alternate_names(mut self, names: Vec<impl Into<String>>) -> Self {
        self.alternate_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_home_city(mut self, city: impl Into<String>) -> Self {
        self.home_city = city.into();
        self
    }

    pub fn with_expiry_date(mut self, expiry_date: DateTime<Utc>) -> Self {
        self.expiry_date = Some(expiry_date);
        self
    }

    /// Check if the record has expired as of `now`
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date.map_or(false, |expiry| expiry <= now)
    }

    pub fn name_attributes(&self) -> NameAttributes<'_> {
        NameAttributes {
            given_name: &self.given_name,
            family_name: &self.family_name,
            full_name: &self.full_name,
            alternate_names: &self.alternate_names,
        }
    }

    pub fn location_attributes(&self) -> LocationAttributes<'_> {
        LocationAttributes {
            street: &self.home_street,
            city: &self.home_city,
            state: &self.home_state,
            postal_code: &self.home_postal_code,
            neighborhood: &self.home_neighborhood,
            country: &self.home_country,
        }
    }
}

/// Name fields fed to name romanizers
#[derive(Debug, Clone, Copy)]
pub struct NameAttributes<'a> {
    pub given_name: &'a str,
    pub family_name: &'a str,
    pub full_name: &'a str,
    pub alternate_names: &'a [String],
}

/// Home location fields fed to location romanizers
#[derive(Debug, Clone, Copy)]
pub struct LocationAttributes<'a> {
    pub street: &'a str,
    pub city: &'a str,
    pub state: &'a str,
    pub postal_code: &'a str,
    pub neighborhood: &'a str,
    pub country: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_person_builder() {
        let person = Person::new("japan", "example.org/p.1")
            .with_name("太郎", "山田")
            .with_alternate_names(vec!["Taro"]);

        assert_eq!(person.repo, "japan");
        assert_eq!(person.given_name, "太郎");
        assert_eq!(person.family_name, "山田");
        assert_eq!(person.alternate_names, vec!["Taro".to_string()]);
        assert!(person.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_empty_ids() {
        let person = Person::new("", "");
        assert!(person.validate().is_err());
    }

    #[test]
    fn test_expiry() {
        let now = Utc::now();
        let person = Person::new("r1", "p1");
        assert!(!person.is_expired(now));

        let expired = person.clone().with_expiry_date(now - Duration::hours(1));
        assert!(expired.is_expired(now));

        let live = person.with_expiry_date(now + Duration::hours(1));
        assert!(!live.is_expired(now));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let person: Person =
            serde_json::from_str(r#"{"repo": "r1", "record_id": "p1", "given_name": "Hanako"}"#)
                .unwrap();
        assert_eq!(person.given_name, "Hanako");
        assert!(person.alternate_names.is_empty());
        assert!(person.expiry_date.is_none());
    }
}
