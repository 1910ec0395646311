
use std::f32::consts::PI;
use std::io::Cursor;

use crate::dialect::DialectId;
use crate::error::{SynthesisError, SynthesisErrorKind};

pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

const SECONDS_PER_CHAR: f32 = 0.2;
const MIN_DURATION_SECS: f32 = 1.0;
const MAX_DURATION_SECS: u64 = 600;
const SCALE_RANGE: std::ops::RangeInclusive<f32> = 0.25..=4.0;
const SAMPLE_RATE_RANGE: std::ops::RangeInclusive<u32> = 8000..=192_000;
const OUTPUT_GAIN: f32 = 0.3;
const PITCH_CONTOUR: [f32; 5] = [1.0, 1.12, 0.94, 1.06, 0.89];

/// Mono floating-point PCM.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self { samples, sample_rate }
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        (self.samples.len() as u128 * 1000 / self.sample_rate as u128) as u64
    }

    pub fn to_pcm16(&self) -> Vec<i16> {
        self.samples
            .iter()
            .map(|&x| {
                let x = x.clamp(-1.0, 1.0);
                if x >= 0.0 {
                    (x * 32767.0).round() as i16
                } else {
                    (x * 32768.0).round() as i16
                }
            })
            .collect()
    }

    /// 16-bit mono WAV.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, SynthesisError> {
        if self.sample_rate == 0 {
            return Err(SynthesisError::new(SynthesisErrorKind::InvalidSampleRate(0)));
        }
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let encoding = |e: hound::Error| SynthesisError::new(SynthesisErrorKind::Encoding(e.to_string()));

        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut buf, spec).map_err(encoding)?;
            for sample in self.to_pcm16() {
                writer.write_sample(sample).map_err(encoding)?;
            }
            writer.finalize().map_err(encoding)?;
        }
        Ok(buf.into_inner())
    }
}

/// Turns (already rewritten) text into audio.
pub trait VoiceSynthesizer: Send + 'static {
    fn sample_rate(&self) -> u32;
    fn synthesize(&mut self, text: &str, dialect: Option<DialectId>) -> Result<AudioBuffer, SynthesisError>;
}

/// Per-dialect voice colouring.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct VoiceStyle {
    pub base_frequency: f32,
    pub speaking_rate: f32,
}

impl VoiceStyle {
    pub fn for_dialect(dialect: DialectId) -> Self {
        let (base_frequency, speaking_rate) = match dialect {
            DialectId::Standard => (200.0, 1.0),
            DialectId::Shanghai => (220.0, 0.95),
            DialectId::Sichuan => (210.0, 1.05),
            DialectId::Gyeongsang => (190.0, 1.0),
            DialectId::Jeju => (240.0, 0.9),
        };
        Self { base_frequency, speaking_rate }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SynthesisParams {
    pitch_scale: f32,
    speed_scale: f32,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            pitch_scale: 1.0,
            speed_scale: 1.0,
        }
    }
}

impl SynthesisParams {
    pub fn new(pitch_scale: f32, speed_scale: f32) -> Result<Self, SynthesisError> {
        for (name, value) in [("pitch_scale", pitch_scale), ("speed_scale", speed_scale)] {
            if !SCALE_RANGE.contains(&value) {
                return Err(SynthesisError::new(SynthesisErrorKind::InvalidParameter(format!(
                    "{} must be within {}..={}, got {}",
                    name,
                    SCALE_RANGE.start(),
                    SCALE_RANGE.end(),
                    value
                ))));
            }
        }
        Ok(Self { pitch_scale, speed_scale })
    }

    pub fn pitch_scale(&self) -> f32 {
        self.pitch_scale
    }

    pub fn speed_scale(&self) -> f32 {
        self.speed_scale
    }
}

/// Tone generator standing in for a real voice: one harmonic syllable per
/// spoken character, short pauses on punctuation and whitespace.
#[derive(Debug, Clone)]
pub struct HarmonicSynthesizer {
    sample_rate: u32,
    params: SynthesisParams,
}

impl HarmonicSynthesizer {
    pub fn new(sample_rate: u32, params: SynthesisParams) -> Result<Self, SynthesisError> {
        if !SAMPLE_RATE_RANGE.contains(&sample_rate) {
            return Err(SynthesisError::new(SynthesisErrorKind::InvalidSampleRate(sample_rate)));
        }
        Ok(Self { sample_rate, params })
    }

    pub fn params(&self) -> SynthesisParams {
        self.params
    }

    fn render(&self, text: &str, style: VoiceStyle) -> Result<Vec<f32>, SynthesisError> {
        let sr = self.sample_rate as f32;
        let rate = style.speaking_rate * self.params.speed_scale;
        let syllable_len = (SECONDS_PER_CHAR / rate * sr) as usize;
        let pause_len = syllable_len / 2;
        let base = style.base_frequency * self.params.pitch_scale;

        let (syllables, pauses) = text.chars().fold((0u64, 0u64), |(syllables, pauses), c| {
            if c.is_alphanumeric() {
                (syllables + 1, pauses)
            } else if is_pause(c) {
                (syllables, pauses + 1)
            } else {
                (syllables, pauses)
            }
        });
        let needed = syllables
            .saturating_mul(syllable_len as u64)
            .saturating_add(pauses.saturating_mul(pause_len as u64));
        let max_samples = MAX_DURATION_SECS * self.sample_rate as u64;
        if needed > max_samples {
            return Err(SynthesisError::new(SynthesisErrorKind::InvalidParameter(format!(
                "text would render {} samples, more than {} s of audio",
                needed, MAX_DURATION_SECS
            ))));
        }

        let mut out = Vec::with_capacity(needed as usize);
        for c in text.chars() {
            if c.is_alphanumeric() {
                let freq = base * PITCH_CONTOUR[c as usize % PITCH_CONTOUR.len()];
                out.extend((0..syllable_len).map(|n| {
                    let t = n as f32 / sr;
                    let phase = 2.0 * PI * freq * t;
                    let voice = (phase.sin() + 0.3 * (2.0 * phase).sin() + 0.1 * (3.0 * phase).sin()) / 1.4;
                    OUTPUT_GAIN * envelope(n, syllable_len) * voice
                }));
            } else if is_pause(c) {
                out.extend(std::iter::repeat(0.0).take(pause_len));
            }
        }

        let min_len = (MIN_DURATION_SECS * sr) as usize;
        if out.len() < min_len {
            out.resize(min_len, 0.0);
        }
        Ok(out)
    }
}

impl Default for HarmonicSynthesizer {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            params: SynthesisParams::default(),
        }
    }
}

impl VoiceSynthesizer for HarmonicSynthesizer {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn synthesize(&mut self, text: &str, dialect: Option<DialectId>) -> Result<AudioBuffer, SynthesisError> {
        let style = VoiceStyle::for_dialect(dialect.unwrap_or(DialectId::Standard));
        let samples = self.render(text, style)?;
        log::debug!(
            "Rendered {} samples ({} ms) for {} chars",
            samples.len(),
            samples.len() as u64 * 1000 / self.sample_rate as u64,
            text.chars().count()
        );
        Ok(AudioBuffer::new(samples, self.sample_rate))
    }
}

fn is_pause(c: char) -> bool {
    !c.is_alphanumeric() && (!c.is_control() || c == '\n')
}

// 10% linear attack, exponential decay for the rest.
fn envelope(n: usize, len: usize) -> f32 {
    let pos = n as f32 / len.max(1) as f32;
    if pos < 0.1 {
        pos / 0.1
    } else {
        (-3.0 * (pos - 0.1)).exp()
    }
}
