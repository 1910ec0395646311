use std::fmt::Debug;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::oneshot;

use crate::dialect::DialectId;
use crate::engine::DialectEngine;
use crate::error::{ServiceError, ServiceErrorKind, SynthesisError, SynthesisErrorKind};
use crate::synth::{AudioBuffer, VoiceSynthesizer};

const QUEUE_DEPTH: usize = 100;

struct RequestData<Req, Res> {
    req: Req,
    res_sender: oneshot::Sender<Res>,
}

impl<Req, Res> RequestData<Req, Res>
where
    Req: Send + 'static,
    Res: Send + 'static,
{
    fn new(req: Req) -> (Self, oneshot::Receiver<Res>) {
        let (res_sender, res_receiver) = oneshot::channel();
        (Self {
            req,
            res_sender,
        }, res_receiver)
    }
}

impl<Req, Res> Debug for RequestData<Req, Res>
where
    Req: Debug,
    Res: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestData")
            .field("req", &self.req)
            .field("res_sender", &self.res_sender)
            .finish()
    }
}

/// Text to speak. Without a dialect the service decides (see [`ServiceConfig`]).
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechRequest {
    pub text: String,
    pub dialect: Option<DialectId>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>, dialect: Option<DialectId>) -> Self {
        Self {
            text: text.into(),
            dialect,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SpeechOutput {
    pub dialect: DialectId,
    /// Set when the dialect came from detection.
    pub confidence: Option<f64>,
    /// The text that was actually spoken.
    pub text: String,
    pub audio: AudioBuffer,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Detect the dialect of requests that do not name one. When off, such
    /// requests are spoken as STANDARD.
    pub auto_detect: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { auto_detect: true }
    }
}

#[derive(Debug)]
enum ServiceRequest {
    Synthesis(RequestData<SpeechRequest, Result<SpeechOutput, ServiceError>>),
}

struct Runner<S> {
    engine: Arc<DialectEngine>,
    synthesizer: S,
    config: ServiceConfig,
    receiver: mpsc::Receiver<ServiceRequest>,
}

impl<S: VoiceSynthesizer> Runner<S> {
    fn run(mut self) {
        while let Some(request) = self.receiver.blocking_recv() {
            match request {
                ServiceRequest::Synthesis(data) => {
                    let res = self.speak(data.req);
                    if let Err(e) = &res {
                        log::error!("Speech request failed: {}", e);
                    }
                    let _ = data.res_sender.send(res);
                },
            }
        }

        log::warn!("Runner thread exited");
    }

    fn speak(&mut self, req: SpeechRequest) -> Result<SpeechOutput, ServiceError> {
        // Detected text is already in dialect form; rewriting it again would
        // stack substitutions such as 谢谢 -> 谢谢侬 -> 谢谢侬侬.
        let (dialect, confidence, text) = match req.dialect {
            Some(dialect) => {
                let text = self.engine.rewrite(&req.text, dialect)?;
                (dialect, None, text)
            },
            None if self.config.auto_detect => {
                let detected = self.engine.detect(&req.text);
                log::info!("Auto-detected dialect: {} (confidence {:.2})", detected.dialect, detected.confidence);
                (detected.dialect, Some(detected.confidence), req.text)
            },
            None => (DialectId::Standard, None, req.text),
        };

        let sample_rate = self.synthesizer.sample_rate();
        log::info!("Requesting speech ({}, {} Hz): {}", dialect, sample_rate, text);
        let audio = self.synthesizer.synthesize(&text, Some(dialect))?;
        if audio.sample_rate != sample_rate {
            return Err(SynthesisError::new(SynthesisErrorKind::InvalidSampleRate(audio.sample_rate)).into());
        }

        Ok(SpeechOutput {
            dialect,
            confidence,
            text,
            audio,
        })
    }
}

/// Starts the runner thread that owns the synthesizer.
pub struct SpeechService;

impl SpeechService {
    pub fn start<S: VoiceSynthesizer>(engine: Arc<DialectEngine>, synthesizer: S, config: ServiceConfig) -> SpeechHandle {
        let (sender, receiver) = mpsc::channel(QUEUE_DEPTH);

        let runner = Runner {
            engine,
            synthesizer,
            config,
            receiver,
        };

        std::thread::spawn(move || {
            runner.run();
        });

        SpeechHandle { sender }
    }
}

/// Cloneable handle to a running [`SpeechService`]. The runner stops once
/// every handle is dropped.
#[derive(Debug, Clone)]
pub struct SpeechHandle {
    sender: mpsc::Sender<ServiceRequest>,
}

impl SpeechHandle {
    /// Must not be called from inside an async runtime; use [`synthesize`](Self::synthesize) there.
    pub fn synthesize_blocking(&self, req: SpeechRequest) -> Result<SpeechOutput, ServiceError> {
        let (data, receiver) = RequestData::new(req);
        self.sender.blocking_send(ServiceRequest::Synthesis(data)).map_err(|_| disconnected())?;
        receiver.blocking_recv().map_err(|_| disconnected())?
    }

    pub async fn synthesize(&self, req: SpeechRequest) -> Result<SpeechOutput, ServiceError> {
        let (data, receiver) = RequestData::new(req);
        self.sender.send(ServiceRequest::Synthesis(data)).await.map_err(|_| disconnected())?;
        receiver.await.map_err(|_| disconnected())?
    }

    /// Speaks each text in order with the same dialect setting. One failed
    /// item does not stop the rest.
    pub fn synthesize_batch_blocking<I, T>(&self, texts: I, dialect: Option<DialectId>) -> Vec<Result<SpeechOutput, ServiceError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        texts
            .into_iter()
            .map(|text| self.synthesize_blocking(SpeechRequest::new(text, dialect)))
            .collect()
    }

    pub async fn synthesize_batch<I, T>(&self, texts: I, dialect: Option<DialectId>) -> Vec<Result<SpeechOutput, ServiceError>>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let mut results = Vec::new();
        for text in texts {
            results.push(self.synthesize(SpeechRequest::new(text, dialect)).await);
        }
        results
    }
}

fn disconnected() -> ServiceError {
    ServiceError::new(ServiceErrorKind::Disconnected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DialectErrorKind, SynthesisError};
    use crate::profile::DialectProfile;
    use crate::synth::{HarmonicSynthesizer, SynthesisParams};
    use crate::config::EngineConfig;

    /// Records what it was asked to speak.
    struct Recorder(std::sync::mpsc::Sender<(String, Option<DialectId>)>);

    impl VoiceSynthesizer for Recorder {
        fn sample_rate(&self) -> u32 {
            16000
        }

        fn synthesize(&mut self, text: &str, dialect: Option<DialectId>) -> Result<AudioBuffer, SynthesisError> {
            let _ = self.0.send((text.to_string(), dialect));
            Ok(AudioBuffer::new(vec![0.0; 16], 16000))
        }
    }

    #[test]
    fn explicit_dialect_is_rewritten() {
        let handle = SpeechService::start(Arc::new(DialectEngine::builtin()), HarmonicSynthesizer::default(), ServiceConfig::default());
        let out = handle
            .synthesize_blocking(SpeechRequest::new("你好，今天天气很好", Some(DialectId::Shanghai)))
            .unwrap();
        assert_eq!(out.dialect, DialectId::Shanghai);
        assert_eq!(out.text, "侬好，今朝天气蛮好");
        assert_eq!(out.confidence, None);
        assert!(!out.audio.is_empty());
    }

    #[test]
    fn detected_text_is_spoken_as_is() {
        let (tx, rx) = std::sync::mpsc::channel();
        let handle = SpeechService::start(Arc::new(DialectEngine::builtin()), Recorder(tx), ServiceConfig::default());
        let out = handle.synthesize_blocking(SpeechRequest::new("侬好，谢谢侬，今朝蛮好", None)).unwrap();
        assert_eq!(out.dialect, DialectId::Shanghai);
        assert!(out.confidence.unwrap() >= 0.3);
        assert_eq!(rx.recv().unwrap(), ("侬好，谢谢侬，今朝蛮好".to_string(), Some(DialectId::Shanghai)));
    }

    #[test]
    fn auto_detect_off_speaks_standard() {
        let (tx, rx) = std::sync::mpsc::channel();
        let config = ServiceConfig { auto_detect: false };
        let handle = SpeechService::start(Arc::new(DialectEngine::builtin()), Recorder(tx), config);
        let out = handle.synthesize_blocking(SpeechRequest::new("侬好，今朝天气蛮好", None)).unwrap();
        assert_eq!(out.dialect, DialectId::Standard);
        assert_eq!(rx.recv().unwrap().1, Some(DialectId::Standard));
    }

    #[test]
    fn unknown_target_surfaces_dialect_error() {
        let profiles = vec![DialectProfile::new(DialectId::Standard)];
        let engine = DialectEngine::new(profiles, EngineConfig::default()).unwrap();
        let handle = SpeechService::start(Arc::new(engine), HarmonicSynthesizer::default(), ServiceConfig::default());
        let err = handle
            .synthesize_blocking(SpeechRequest::new("你好", Some(DialectId::Jeju)))
            .unwrap_err();
        assert!(matches!(err.as_inner(), ServiceErrorKind::Dialect(DialectErrorKind::UnknownDialect(_))));
    }

    #[tokio::test]
    async fn async_requests_are_served() {
        let handle = SpeechService::start(Arc::new(DialectEngine::builtin()), HarmonicSynthesizer::default(), ServiceConfig::default());
        let out = handle.synthesize(SpeechRequest::new("我们去学校", Some(DialectId::Shanghai))).await.unwrap();
        assert_eq!(out.text, "阿拉去学堂");
    }

    /// Claims one rate but produces another.
    struct WrongRate;

    impl VoiceSynthesizer for WrongRate {
        fn sample_rate(&self) -> u32 {
            22050
        }

        fn synthesize(&mut self, _text: &str, _dialect: Option<DialectId>) -> Result<AudioBuffer, SynthesisError> {
            Ok(AudioBuffer::new(vec![0.0; 16], 16000))
        }
    }

    #[test]
    fn mismatched_output_rate_is_rejected() {
        let handle = SpeechService::start(Arc::new(DialectEngine::builtin()), WrongRate, ServiceConfig::default());
        let err = handle.synthesize_blocking(SpeechRequest::new("你好", None)).unwrap_err();
        assert_eq!(err.as_inner(), &ServiceErrorKind::Synthesis(SynthesisErrorKind::InvalidSampleRate(16000)));
    }

    #[test]
    fn overlong_request_fails_without_killing_the_runner() {
        let params = SynthesisParams::new(1.0, 0.25).unwrap();
        let synth = HarmonicSynthesizer::new(22050, params).unwrap();
        let handle = SpeechService::start(Arc::new(DialectEngine::builtin()), synth, ServiceConfig::default());

        let err = handle
            .synthesize_blocking(SpeechRequest::new("好".repeat(2000), Some(DialectId::Standard)))
            .unwrap_err();
        assert!(matches!(err.as_inner(), ServiceErrorKind::Synthesis(SynthesisErrorKind::InvalidParameter(_))));

        let out = handle.synthesize_blocking(SpeechRequest::new("你好", Some(DialectId::Standard))).unwrap();
        assert_eq!(out.text, "你好");
    }

    #[test]
    fn batch_keeps_order_and_per_item_errors() {
        let profiles = vec![DialectProfile::new(DialectId::Standard)];
        let engine = DialectEngine::new(profiles, EngineConfig::default()).unwrap();
        let (tx, _rx) = std::sync::mpsc::channel();
        let handle = SpeechService::start(Arc::new(engine), Recorder(tx), ServiceConfig::default());

        let results = handle.synthesize_batch_blocking(["你好", "再见"], Some(DialectId::Standard));
        let texts: Vec<_> = results.into_iter().map(|r| r.unwrap().text).collect();
        assert_eq!(texts, vec!["你好", "再见"]);

        let results = handle.synthesize_batch_blocking(vec!["你好".to_string()], Some(DialectId::Jeju));
        assert_eq!(results.len(), 1);
        assert!(results[0].is_err());
    }

    #[tokio::test]
    async fn async_batch_rewrites_every_item() {
        let handle = SpeechService::start(Arc::new(DialectEngine::builtin()), HarmonicSynthesizer::default(), ServiceConfig::default());
        let results = handle.synthesize_batch(["你好", "我们去学校"], Some(DialectId::Shanghai)).await;
        let texts: Vec<_> = results.into_iter().map(|r| r.unwrap().text).collect();
        assert_eq!(texts, vec!["侬好", "阿拉去学堂"]);
    }
}
