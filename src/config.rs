
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, DialectErrorKind};
use crate::profile::DialectProfile;

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.3;

/// Per-category weights of the detection score.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub vocabulary: f64,
    pub grammar: f64,
    /// Always multiplied by a zero score: text alone carries no pronunciation.
    /// Still part of the normalisation denominator.
    pub pronunciation: f64,
    pub unique_expressions: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            vocabulary: 3.0,
            grammar: 2.0,
            pronunciation: 1.5,
            unique_expressions: 4.0,
        }
    }
}

impl ScoringWeights {
    pub fn total(&self) -> f64 {
        self.vocabulary + self.grammar + self.pronunciation + self.unique_expressions
    }

    fn validate(&self) -> Result<(), String> {
        let weights = [self.vocabulary, self.grammar, self.pronunciation, self.unique_expressions];
        if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err("weights must be finite and non-negative".to_string());
        }
        if self.total() <= 0.0 {
            return Err("weights must not all be zero".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewriteMode {
    /// Each rule rewrites the output of the rules before it.
    #[default]
    Cascading,
    /// One left-to-right pass; replaced text is never rescanned.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub confidence_threshold: f64,
    pub weights: ScoringWeights,
    pub rewrite_mode: RewriteMode,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            weights: ScoringWeights::default(),
            rewrite_mode: RewriteMode::default(),
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), DialectError> {
        let invalid = |reason: String| DialectError::new(DialectErrorKind::InvalidConfig(reason));
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(invalid(format!(
                "confidence_threshold must be within [0, 1], got {}",
                self.confidence_threshold
            )));
        }
        self.weights.validate().map_err(invalid)
    }
}

/// On-disk profile table: an optional engine config plus the ordered profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFile {
    #[serde(default)]
    pub config: EngineConfig,
    pub profiles: Vec<DialectProfile>,
}

impl ProfileFile {
    pub fn from_json_str(json: &str) -> Result<Self, DialectError> {
        serde_json::from_str(json).map_err(|e| DialectError::new(DialectErrorKind::ProfileFile(e.to_string())))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DialectError> {
        let path = path.as_ref();
        log::debug!("Loading profile file {}", path.display());
        let json = std::fs::read_to_string(path).map_err(|e| {
            DialectError::new(DialectErrorKind::ProfileFile(format!("{}: {}", path.display(), e)))
        })?;
        Self::from_json_str(&json)
    }
}
