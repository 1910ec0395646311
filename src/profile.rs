
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::dialect::DialectId;
use crate::error::{DialectError, DialectErrorKind};

/// Ordered standard-form -> dialect-form substitution rules.
///
/// Serialized as an array of pairs so the rule order survives JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversionMap(Vec<(String, String)>);

impl ConversionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, standard: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == standard).map(|(_, v)| v.as_str())
    }

    /// Rules in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for (standard, _) in &self.0 {
            if standard.is_empty() {
                return Err("conversion map contains an empty key".to_string());
            }
            if !seen.insert(standard.as_str()) {
                return Err(format!("conversion map key {:?} is declared more than once", standard));
            }
        }
        Ok(())
    }
}

impl<K, V> FromIterator<(K, V)> for ConversionMap
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Linguistic pattern table for one dialect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialectProfile {
    pub id: DialectId,
    #[serde(default)]
    pub vocabulary: Vec<String>,
    #[serde(default)]
    pub grammar_markers: Vec<String>,
    #[serde(default)]
    pub unique_expressions: Vec<String>,
    /// Informational only; never matched against text.
    #[serde(default)]
    pub pronunciation_notes: Vec<String>,
    #[serde(default)]
    pub conversion_map: ConversionMap,
}

impl DialectProfile {
    pub fn new(id: DialectId) -> Self {
        Self {
            id,
            vocabulary: Vec::new(),
            grammar_markers: Vec::new(),
            unique_expressions: Vec::new(),
            pronunciation_notes: Vec::new(),
            conversion_map: ConversionMap::new(),
        }
    }

    pub fn with_vocabulary<S: Into<String>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.vocabulary = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_grammar_markers<S: Into<String>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.grammar_markers = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_unique_expressions<S: Into<String>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.unique_expressions = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pronunciation_notes<S: Into<String>>(mut self, items: impl IntoIterator<Item = S>) -> Self {
        self.pronunciation_notes = items.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_conversion_map<K: Into<String>, V: Into<String>>(mut self, rules: impl IntoIterator<Item = (K, V)>) -> Self {
        self.conversion_map = rules.into_iter().collect();
        self
    }

    fn validate(&self) -> Result<(), DialectError> {
        let malformed = |reason: String| {
            DialectError::new(DialectErrorKind::MalformedProfile {
                dialect: self.id,
                reason,
            })
        };

        if !self.id.is_standard() && self.unique_expressions.is_empty() {
            return Err(malformed("unique_expressions must not be empty".to_string()));
        }

        let lists = [
            ("vocabulary", &self.vocabulary),
            ("grammar_markers", &self.grammar_markers),
            ("unique_expressions", &self.unique_expressions),
        ];
        for (name, list) in lists {
            if list.iter().any(|pattern| pattern.is_empty()) {
                return Err(malformed(format!("{} contains an empty pattern", name)));
            }
        }

        self.conversion_map.validate().map_err(malformed)
    }
}

/// Validated profiles in declaration order.
///
/// Declaration order is the detection tie-break: the earlier profile wins.
#[derive(Debug, Clone)]
pub struct ProfileTable {
    profiles: Vec<DialectProfile>,
}

impl ProfileTable {
    pub fn new(profiles: Vec<DialectProfile>) -> Result<Self, DialectError> {
        let mut seen = HashSet::new();
        for profile in &profiles {
            if !seen.insert(profile.id) {
                return Err(DialectError::new(DialectErrorKind::DuplicateProfile(profile.id)));
            }
            profile.validate()?;
        }
        Ok(Self { profiles })
    }

    pub(crate) fn new_unchecked(profiles: Vec<DialectProfile>) -> Self {
        Self { profiles }
    }

    pub fn get(&self, id: DialectId) -> Option<&DialectProfile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DialectProfile> {
        self.profiles.iter()
    }

    pub fn ids(&self) -> Vec<DialectId> {
        self.profiles.iter().map(|p| p.id).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
