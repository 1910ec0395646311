
pub mod error;
pub mod dialect;
pub mod profile;
pub mod builtin;
pub mod config;
pub mod engine;
pub mod synth;
pub mod service;
pub mod types;
pub mod server;

pub mod deps {
    pub use serde_json;
    pub use serde;
}

pub use dialect::DialectId;
pub use profile::{ConversionMap, DialectProfile, ProfileTable};
pub use config::{EngineConfig, ProfileFile, RewriteMode, ScoringWeights};
pub use engine::{DetectionResult, DialectEngine, DialectInfo};
pub use synth::{AudioBuffer, HarmonicSynthesizer, SynthesisParams, VoiceStyle, VoiceSynthesizer};
pub use service::{ServiceConfig, SpeechHandle, SpeechOutput, SpeechRequest, SpeechService};

pub use error::{
    DialectError,
    DialectErrorKind,
    ErrorDescription,
    GenericError,
    ServiceError,
    ServiceErrorKind,
    SynthesisError,
    SynthesisErrorKind,
};

/// Splits text into sentences for one-at-a-time playback.
pub struct TextSplitter {
    sentence_enders: Vec<char>,
}

impl Default for TextSplitter {
    fn default() -> Self {
        Self {
            sentence_enders: vec!['。', '？', '！', '!', '?', '…', '\n'],
        }
    }
}

impl TextSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn split_text(&self, text: &str) -> Vec<String> {
        text.split(|c: char| self.sentence_enders.contains(&c))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_cjk_and_ascii_enders() {
        let splitter = TextSplitter::new();
        let sentences = splitter.split_text("侬好！今朝天气蛮好。 Are you ok?\n\n오이소…");
        assert_eq!(sentences, vec!["侬好", "今朝天气蛮好", "Are you ok", "오이소"]);
    }

    #[test]
    fn commas_do_not_split() {
        let splitter = TextSplitter::new();
        assert_eq!(splitter.split_text("你好，今天天气很好"), vec!["你好，今天天气很好"]);
        assert!(splitter.split_text("  。。 ").is_empty());
    }
}
