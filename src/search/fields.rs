//! Romanized field generation
//!
//! Every adapter output is kept under a structured [`FieldKey`] naming the
//! source attribute, the adapter and the variant position. Wire field names
//! (`given_name_romanized_by_<adapter>_0`, ...) are only produced when a
//! document is handed to the index.

use crate::models::{LocationAttributes, NameAttributes};
use crate::search::transliteration::Romanizer;
use crate::search::error::SearchResult;
use std::fmt;
use strum::Display;

/// Separator used in the per-adapter romanized names summary
pub const NAMES_SEPARATOR: char = ':';

/// Source attribute a romanized variant was derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[strum(serialize_all = "snake_case")]
pub enum Attribute {
    GivenName,
    FamilyName,
    FullName,
    AlternateNames,
    /// Given name immediately followed by family name
    #[strum(serialize = "no_space_full_name_1")]
    NoSpaceGivenFamily,
    /// Family name immediately followed by given name
    #[strum(serialize = "no_space_full_name_2")]
    NoSpaceFamilyGiven,
    HomeStreet,
    HomeCity,
    HomeState,
    HomePostalCode,
    HomeNeighborhood,
    HomeCountry,
}

/// Identifies one romanized variant within a document
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldKey {
    pub attribute: Attribute,
    pub adapter: String,
    pub variant: usize,
}

impl FieldKey {
    pub fn new(attribute: Attribute, adapter: impl Into<String>, variant: usize) -> Self {
        Self {
            attribute,
            adapter: adapter.into(),
            variant,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_romanized_by_{}_{}",
            self.attribute, self.adapter, self.variant
        )
    }
}

/// A romanized variant and the key it is stored under
pub type RomanizedField = (FieldKey, String);

/// Wire name of the colon-joined summary of every name variant by `adapter`
pub fn romanized_names_field(adapter: &str) -> String {
    format!("names_romanized_by_{}", adapter)
}

/// Output of [`build_name_fields`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameFields {
    pub adapter: String,
    /// Per-attribute variants, no-space combinations last
    pub fields: Vec<RomanizedField>,
    /// Every variant value in emission order, combinations included
    pub names: Vec<String>,
}

impl NameFields {
    /// Non-empty names joined with [`NAMES_SEPARATOR`]
    pub fn summary(&self) -> String {
        let names: Vec<&str> = self
            .names
            .iter()
            .map(String::as_str)
            .filter(|name| !name.is_empty())
            .collect();
        names.join(&NAMES_SEPARATOR.to_string())
    }
}

/// Romanize every input once. Empty input never reaches the adapter.
fn romanize_all<'a>(
    adapter: &dyn Romanizer,
    inputs: impl IntoIterator<Item = &'a str>,
) -> SearchResult<Vec<String>> {
    let mut variants = Vec::new();
    for text in inputs {
        if text.trim().is_empty() {
            continue;
        }
        variants.extend(adapter.romanize(text)?);
    }
    Ok(variants)
}

fn emit_variants(
    fields: &mut Vec<RomanizedField>,
    attribute: Attribute,
    adapter: &str,
    variants: &[String],
) {
    for (index, value) in variants.iter().enumerate() {
        if !value.is_empty() {
            fields.push((FieldKey::new(attribute, adapter, index), value.clone()));
        }
    }
}

/// Cross product of given × family variants as `(given+family, family+given)`.
///
/// Empty when either side has no non-empty variant.
pub fn no_space_full_names(given: &[String], family: &[String]) -> Vec<(String, String)> {
    let given: Vec<&String> = given.iter().filter(|g| !g.is_empty()).collect();
    let family: Vec<&String> = family.iter().filter(|f| !f.is_empty()).collect();

    let mut combinations = Vec::with_capacity(given.len() * family.len());
    for g in &given {
        for f in &family {
            combinations.push((format!("{}{}", g, f), format!("{}{}", f, g)));
        }
    }
    combinations
}

/// Romanize the name attributes of a record with one adapter
pub fn build_name_fields(
    adapter: &dyn Romanizer,
    attributes: &NameAttributes<'_>,
) -> SearchResult<NameFields> {
    let adapter_name = adapter.name().to_string();
    let mut fields = Vec::new();
    let mut names = Vec::new();

    let given = romanize_all(adapter, [attributes.given_name])?;
    let family = romanize_all(adapter, [attributes.family_name])?;
    let full = romanize_all(adapter, [attributes.full_name])?;
    let alternates = romanize_all(
        adapter,
        attributes.alternate_names.iter().map(String::as_str),
    )?;

    for (attribute, variants) in [
        (Attribute::GivenName, &given),
        (Attribute::FamilyName, &family),
        (Attribute::FullName, &full),
        (Attribute::AlternateNames, &alternates),
    ] {
        emit_variants(&mut fields, attribute, &adapter_name, variants);
        names.extend(variants.iter().cloned());
    }

    if !attributes.given_name.trim().is_empty() && !attributes.family_name.trim().is_empty() {
        for (index, (given_family, family_given)) in
            no_space_full_names(&given, &family).into_iter().enumerate()
        {
            fields.push((
                FieldKey::new(Attribute::NoSpaceGivenFamily, &adapter_name, index),
                given_family.clone(),
            ));
            fields.push((
                FieldKey::new(Attribute::NoSpaceFamilyGiven, &adapter_name, index),
                family_given.clone(),
            ));
            names.push(given_family);
            names.push(family_given);
        }
    }

    tracing::trace!(
        adapter = %adapter_name,
        variants = fields.len(),
        "Built romanized name fields"
    );

    Ok(NameFields {
        adapter: adapter_name,
        fields,
        names,
    })
}

/// Romanize the home location attributes of a record with one adapter
pub fn build_location_fields(
    adapter: &dyn Romanizer,
    attributes: &LocationAttributes<'_>,
) -> SearchResult<Vec<RomanizedField>> {
    let adapter_name = adapter.name();
    let mut fields = Vec::new();

    for (attribute, text) in [
        (Attribute::HomeStreet, attributes.street),
        (Attribute::HomeCity, attributes.city),
        (Attribute::HomeState, attributes.state),
        (Attribute::HomePostalCode, attributes.postal_code),
        (Attribute::HomeNeighborhood, attributes.neighborhood),
        (Attribute::HomeCountry, attributes.country),
    ] {
        let variants = romanize_all(adapter, [text])?;
        emit_variants(&mut fields, attribute, adapter_name, &variants);
    }

    Ok(fields)
}
