
use std::path::Path;

use serde::Serialize;

use crate::builtin::builtin_profiles;
use crate::config::{EngineConfig, ProfileFile, RewriteMode, ScoringWeights};
use crate::dialect::DialectId;
use crate::error::{DialectError, DialectErrorKind};
use crate::profile::{ConversionMap, DialectProfile, ProfileTable};

/// Outcome of a single `detect` call.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub dialect: DialectId,
    pub confidence: f64,
}

impl DetectionResult {
    const STANDARD_NO_SIGNAL: Self = Self {
        dialect: DialectId::Standard,
        confidence: 0.0,
    };
}

/// Summary of a configured profile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DialectInfo {
    pub name: DialectId,
    pub vocabulary_count: usize,
    pub grammar_count: usize,
    pub pronunciation_features: Vec<String>,
    pub unique_expressions: Vec<String>,
    pub conversion_rule_count: usize,
}

/// Rule-based dialect detector and rewriter.
///
/// Holds an immutable profile table; every method takes `&self`, so one engine
/// can be shared across threads behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct DialectEngine {
    profiles: ProfileTable,
    config: EngineConfig,
}

impl DialectEngine {
    pub fn new(profiles: Vec<DialectProfile>, config: EngineConfig) -> Result<Self, DialectError> {
        config.validate()?;
        let profiles = ProfileTable::new(profiles)?;
        log::debug!("Dialect engine ready with {} profiles", profiles.len());
        Ok(Self { profiles, config })
    }

    /// Engine over the built-in profile table with the default configuration.
    pub fn builtin() -> Self {
        Self {
            profiles: ProfileTable::new_unchecked(builtin_profiles()),
            config: EngineConfig::default(),
        }
    }

    pub fn from_profile_file(file: ProfileFile) -> Result<Self, DialectError> {
        Self::new(file.profiles, file.config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DialectError> {
        Self::from_profile_file(ProfileFile::load(path)?)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn profiles(&self) -> &ProfileTable {
        &self.profiles
    }

    pub fn supported_dialects(&self) -> Vec<DialectId> {
        self.profiles.ids()
    }

    pub fn dialect_info(&self, dialect: DialectId) -> Option<DialectInfo> {
        self.profiles.get(dialect).map(|p| DialectInfo {
            name: p.id,
            vocabulary_count: p.vocabulary.len(),
            grammar_count: p.grammar_markers.len(),
            pronunciation_features: p.pronunciation_notes.clone(),
            unique_expressions: p.unique_expressions.clone(),
            conversion_rule_count: p.conversion_map.len(),
        })
    }

    /// Classifies `text` using the configured confidence threshold.
    pub fn detect(&self, text: &str) -> DetectionResult {
        self.detect_with_threshold(text, self.config.confidence_threshold)
    }

    /// Classifies `text`; a dialect qualifies when its score is `>= threshold`.
    ///
    /// Below the threshold the result is STANDARD but still carries the best
    /// score. Ties go to the profile declared first.
    pub fn detect_with_threshold(&self, text: &str, threshold: f64) -> DetectionResult {
        if text.trim().is_empty() {
            return DetectionResult::STANDARD_NO_SIGNAL;
        }

        let mut best: Option<(DialectId, f64)> = None;
        for (dialect, score) in self.scores(text) {
            log::trace!("{}: {:.4}", dialect, score);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((dialect, score)),
            }
        }

        let Some((dialect, confidence)) = best else {
            return DetectionResult::STANDARD_NO_SIGNAL;
        };

        // Zero means no pattern matched anywhere, whatever the threshold says.
        let result = if confidence > 0.0 && confidence >= threshold {
            DetectionResult { dialect, confidence }
        } else {
            DetectionResult {
                dialect: DialectId::Standard,
                confidence,
            }
        };
        log::debug!("Detected {} ({:.3}) for {:?}", result.dialect, result.confidence, text);
        result
    }

    /// Normalised score of every non-STANDARD profile, in declaration order.
    pub fn scores(&self, text: &str) -> Vec<(DialectId, f64)> {
        if text.trim().is_empty() {
            return Vec::new();
        }
        self.profiles
            .iter()
            .filter(|p| !p.id.is_standard())
            .map(|p| (p.id, weighted_score(text, p, &self.config.weights)))
            .collect()
    }

    /// Rewrites standard-form `text` into `target` using the configured mode.
    pub fn rewrite(&self, text: &str, target: DialectId) -> Result<String, DialectError> {
        self.rewrite_with_mode(text, target, self.config.rewrite_mode)
    }

    pub fn rewrite_with_mode(&self, text: &str, target: DialectId, mode: RewriteMode) -> Result<String, DialectError> {
        if target.is_standard() {
            return Ok(text.to_owned());
        }

        let profile = self
            .profiles
            .get(target)
            .ok_or_else(|| DialectError::new(DialectErrorKind::UnknownDialect(target.to_string())))?;

        let map = &profile.conversion_map;
        if map.is_empty() {
            return Ok(text.to_owned());
        }

        Ok(match mode {
            RewriteMode::Cascading => rewrite_cascading(text, map),
            RewriteMode::Strict => rewrite_strict(text, map),
        })
    }

    /// Like [`rewrite`](Self::rewrite) but takes a dialect id string.
    pub fn rewrite_named(&self, text: &str, target: &str) -> Result<String, DialectError> {
        self.rewrite(text, target.parse()?)
    }
}

impl Default for DialectEngine {
    fn default() -> Self {
        Self::builtin()
    }
}

fn pattern_ratio(text: &str, patterns: &[String]) -> f64 {
    if patterns.is_empty() {
        return 0.0;
    }
    let matches = patterns.iter().filter(|p| text.contains(p.as_str())).count();
    matches as f64 / patterns.len() as f64
}

fn weighted_score(text: &str, profile: &DialectProfile, weights: &ScoringWeights) -> f64 {
    let vocabulary = pattern_ratio(text, &profile.vocabulary);
    let grammar = pattern_ratio(text, &profile.grammar_markers);
    let pronunciation = 0.0;
    let unique = pattern_ratio(text, &profile.unique_expressions);

    let total = vocabulary * weights.vocabulary
        + grammar * weights.grammar
        + pronunciation * weights.pronunciation
        + unique * weights.unique_expressions;

    total / weights.total()
}

fn rewrite_cascading(text: &str, map: &ConversionMap) -> String {
    map.iter().fold(text.to_owned(), |acc, (standard, dialect)| acc.replace(standard, dialect))
}

fn rewrite_strict(text: &str, map: &ConversionMap) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    'scan: while let Some(c) = rest.chars().next() {
        for (standard, dialect) in map.iter() {
            if let Some(tail) = rest.strip_prefix(standard) {
                out.push_str(dialect);
                rest = tail;
                continue 'scan;
            }
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }
    out
}
