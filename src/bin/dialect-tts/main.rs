
pub(crate) mod audio_output;


use dialect_tts::{
    DialectEngine, DialectId, HarmonicSynthesizer, RewriteMode, ServiceConfig, SpeechRequest, SpeechService,
    SynthesisParams, TextSplitter,
};
use dialect_tts::synth::DEFAULT_SAMPLE_RATE;

use std::io::Read;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

pub(crate) const VERSION: &str = env!("CARGO_PKG_VERSION");
pub(crate) const PKG_NAME: &str = "dialect-tts";


#[derive(Debug, Parser)]
#[command(about = "Dialect detection, rewriting and speech synthesis", long_about = None, version)]
struct Cli {
    /// JSON profile table replacing the built-in one
    #[arg(long, global = true)]
    profiles: Option<PathBuf>,

    #[command(subcommand)]
    subcommand: Command,
}

#[derive(Debug, Args)]
struct SynthesisArgs {
    /// Target dialect; detected from the input when omitted
    #[arg(long, value_enum)]
    dialect: Option<DialectId>,

    /// Speak unmarked input as standard instead of detecting its dialect
    #[arg(long)]
    no_detect: bool,

    /// Pitch scale
    #[arg(long, default_value_t = SynthesisParams::default().pitch_scale())]
    pitch_scale: f32,

    /// Speed scale
    #[arg(long, default_value_t = SynthesisParams::default().speed_scale())]
    speed_scale: f32,

    /// Output sample rate
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Speak the program version and sample text (ignores input)
    #[arg(long)]
    speak_sample_text: bool,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Detect the dialect of the input text
    #[command()]
    Detect {
        /// Minimum score for a dialect to be reported
        #[arg(long)]
        threshold: Option<f64>,

        /// Print every candidate score
        #[arg(long)]
        scores: bool,

        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Rewrite standard text into a dialect
    #[command(arg_required_else_help = true)]
    Rewrite {
        /// Target dialect
        #[arg(long, value_enum)]
        dialect: DialectId,

        /// Never rewrite text produced by an earlier rule
        #[arg(long)]
        strict: bool,
    },

    /// List configured dialects
    #[command()]
    ListDialects {
        /// JSON output
        #[arg(long)]
        json: bool,
    },

    /// Show the profile summary of one dialect
    #[command(arg_required_else_help = true)]
    Info {
        #[arg(value_enum)]
        dialect: DialectId,
    },

    /// One-shot synthesis, WAV on stdout
    #[command()]
    TestSynthesis(SynthesisArgs),

    /// Plays synthesized audio sentence by sentence
    #[command()]
    PlaySynthesis(SynthesisArgs),

    /// Answer JSON requests line by line on stdin/stdout
    #[command()]
    Serve,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Cli::parse();

    let engine = match &args.profiles {
        Some(path) => {
            log::info!("Loading profiles from {}", path.display());
            DialectEngine::load(path)?
        },
        None => DialectEngine::builtin(),
    };
    log::debug!("Dialects: {:?}", engine.supported_dialects());

    match args.subcommand {
        Command::Detect { threshold, scores, json } => {
            let text = read_stdin()?;
            let result = match threshold {
                Some(threshold) => engine.detect_with_threshold(&text, threshold),
                None => engine.detect(&text),
            };

            if json {
                let mut out = serde_json::to_string_pretty(&result)?;
                out.push('\n');
                std::io::stdout().write_all(out.as_bytes())?;
            } else {
                println!("{}\t{:.4}", result.dialect, result.confidence);
            }

            if scores {
                for (dialect, score) in engine.scores(&text) {
                    eprintln!("{}\t{:.4}", dialect, score);
                }
            }
        },

        Command::Rewrite { dialect, strict } => {
            let text = read_stdin()?;
            let mode = if strict { RewriteMode::Strict } else { engine.config().rewrite_mode };
            let converted = engine.rewrite_with_mode(&text, dialect, mode)?;
            std::io::stdout().write_all(converted.as_bytes())?;
        },

        Command::ListDialects { json } => {
            let dialects = engine.supported_dialects();
            if json {
                let mut out = serde_json::to_string_pretty(&dialects)?;
                out.push('\n');
                std::io::stdout().write_all(out.as_bytes())?;
            } else {
                println!("DIALECT\tVOCABULARY\tGRAMMAR\tRULES");
                for dialect in dialects {
                    if let Some(info) = engine.dialect_info(dialect) {
                        println!("{}\t{}\t{}\t{}", dialect, info.vocabulary_count, info.grammar_count, info.conversion_rule_count);
                    }
                }
            }
        },

        Command::Info { dialect } => {
            let info = engine
                .dialect_info(dialect)
                .ok_or_else(|| anyhow::anyhow!("Dialect {} is not configured", dialect))?;
            let mut out = serde_json::to_string_pretty(&info)?;
            out.push('\n');
            std::io::stdout().write_all(out.as_bytes())?;
        },

        Command::TestSynthesis(synthesis) => {
            let text = input_text(&synthesis)?;
            let handle = start_service(engine, &synthesis)?;
            let out = handle.synthesize_blocking(SpeechRequest::new(text, synthesis.dialect))?;
            log::info!("Spoke as {} ({} ms)", out.dialect, out.audio.duration_ms());
            std::io::stdout().write_all(&out.audio.to_wav_bytes()?)?;
        },

        Command::PlaySynthesis(synthesis) => {
            let text = input_text(&synthesis)?;
            let handle = start_service(engine, &synthesis)?;
            let audio = audio_output::AudioPlayer::new()?;
            log::info!("Playing at {} Hz", audio.sample_rate());

            for sentence in TextSplitter::new().split_text(&text) {
                let out = handle.synthesize_blocking(SpeechRequest::new(sentence, synthesis.dialect))?;
                log::info!("Requesting speech ({}): {}", out.dialect, out.text);
                audio.play_buffer(&out.audio)?;
            }

            log::info!("Waiting for audio to finish...");
            audio.wait_blocking_until_empty();

            log::info!("Audio playback finished.");
            log::debug!("Processed blocks count: {}", audio.blocks_processed());
        },

        Command::Serve => {
            let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
            runtime.block_on(async {
                let stdin = tokio::io::BufReader::new(tokio::io::stdin());
                dialect_tts::server::serve_json_lines(&engine, stdin, tokio::io::stdout()).await
            })?;
        },
    }

    Ok(())
}

fn read_stdin() -> anyhow::Result<String> {
    let mut text = String::new();
    let _ = std::io::stdin().read_to_string(&mut text)?;
    Ok(text)
}

fn input_text(args: &SynthesisArgs) -> anyhow::Result<String> {
    if args.speak_sample_text {
        Ok(sample_text(args.dialect.unwrap_or(DialectId::Shanghai)))
    } else {
        read_stdin()
    }
}

fn start_service(engine: DialectEngine, args: &SynthesisArgs) -> anyhow::Result<dialect_tts::SpeechHandle> {
    let params = SynthesisParams::new(args.pitch_scale, args.speed_scale)?;
    let synthesizer = HarmonicSynthesizer::new(args.sample_rate, params)?;
    let config = ServiceConfig {
        auto_detect: !args.no_detect,
    };
    Ok(SpeechService::start(Arc::new(engine), synthesizer, config))
}

fn sample_text(dialect: DialectId) -> String {
    match dialect {
        DialectId::Gyeongsang => format!("{} 버전 {}. 오이소, 뭐하노?", PKG_NAME, VERSION),
        DialectId::Jeju => format!("{} 버전 {}. 혼저 옵서예, 하르방.", PKG_NAME, VERSION),
        _ => format!(
            "这是{}，版本{}。你好，今天天气很好。我们一起去学校学习，谢谢，再见。",
            PKG_NAME,
            VERSION.replace('.', "点")
        ),
    }
}
