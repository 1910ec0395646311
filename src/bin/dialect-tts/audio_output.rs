
use std::collections::VecDeque;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use parking_lot::Mutex;

use dialect_tts::AudioBuffer;
use rubato::{Resampler, SincFixedIn, SincInterpolationType, SincInterpolationParameters, WindowFunction};

use cpal::{
    traits::{DeviceTrait, HostTrait, StreamTrait},
    FromSample,
    Sample,
    StreamConfig,
};

const RESAMPLER_CHUNK: usize = 1024;

/// Queue-fed playback on the default output device.
#[derive(Debug, Clone)]
pub(crate) struct AudioPlayer {
    chunk_queue: Arc<Mutex<VecDeque<Vec<f32>>>>,
    sample_rate: u32,
    channel_count: u16,
    current: Arc<Mutex<Option<PlayingChunk>>>,
    blocks_processed: Arc<AtomicUsize>,
    is_playing: Arc<AtomicBool>,
}

#[derive(Debug, Clone)]
struct PlayingChunk {
    frames: Vec<f32>,
    pos: usize,
}

impl AudioPlayer {
    pub fn new() -> Result<Self, anyhow::Error> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or_else(|| anyhow::anyhow!("No default output device"))?;
        let supported_config = device
            .supported_output_configs()?
            .next()
            .ok_or_else(|| anyhow::anyhow!("No supported audio config"))?
            .with_max_sample_rate();
        let sample_format = supported_config.sample_format();
        let config: StreamConfig = supported_config.into();

        let player = Self {
            chunk_queue: Arc::new(Mutex::new(VecDeque::new())),
            sample_rate: config.sample_rate.0,
            channel_count: config.channels,
            current: Arc::new(Mutex::new(None)),
            blocks_processed: Arc::new(AtomicUsize::new(0)),
            is_playing: Arc::new(AtomicBool::new(false)),
        };
        log::debug!("Output device: {} Hz, {} channels, {:?}", player.sample_rate, player.channel_count, sample_format);

        let err_fn = |err| log::error!("an error occurred on the output audio stream: {}", err);

        let stream = match sample_format {
            cpal::SampleFormat::F32 => device.build_output_stream(&config, player.callback::<f32>(), err_fn, None)?,
            cpal::SampleFormat::F64 => device.build_output_stream(&config, player.callback::<f64>(), err_fn, None)?,
            cpal::SampleFormat::I16 => device.build_output_stream(&config, player.callback::<i16>(), err_fn, None)?,
            cpal::SampleFormat::U16 => device.build_output_stream(&config, player.callback::<u16>(), err_fn, None)?,
            cpal::SampleFormat::I32 => device.build_output_stream(&config, player.callback::<i32>(), err_fn, None)?,
            cpal::SampleFormat::U32 => device.build_output_stream(&config, player.callback::<u32>(), err_fn, None)?,
            cpal::SampleFormat::I8 => device.build_output_stream(&config, player.callback::<i8>(), err_fn, None)?,
            cpal::SampleFormat::U8 => device.build_output_stream(&config, player.callback::<u8>(), err_fn, None)?,
            other => {
                return Err(anyhow::anyhow!("Unsupported sample format: {:?}", other));
            },
        };

        stream.play()?;

        // The stream lives for the rest of the process.
        let _leaked_stream = Box::leak(Box::new(stream));

        Ok(player)
    }

    fn callback<T>(&self) -> impl FnMut(&mut [T], &cpal::OutputCallbackInfo) + Send + 'static
    where
        T: FromSample<f32> + Sample,
    {
        let player = self.clone();
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            player.fill(data);
        }
    }

    fn fill<S: FromSample<f32> + Sample>(&self, out: &mut [S]) {
        self.blocks_processed.fetch_add(1, Ordering::Relaxed);
        let mut written = 0;
        let mut current = self.current.lock();

        while written < out.len() {
            if current.is_none() {
                *current = self.chunk_queue.lock().pop_front().map(|frames| PlayingChunk { frames, pos: 0 });
            }
            let Some(chunk) = current.as_mut() else {
                break;
            };

            let available = &chunk.frames[chunk.pos..];
            let n = available.len().min(out.len() - written);
            for (dst, src) in out[written..written + n].iter_mut().zip(available) {
                *dst = S::from_sample(*src);
            }
            written += n;
            chunk.pos += n;

            if chunk.pos >= chunk.frames.len() {
                *current = None;
            }
        }

        for dst in &mut out[written..] {
            *dst = S::EQUILIBRIUM;
        }

        let busy = current.is_some() || !self.chunk_queue.lock().is_empty();
        self.is_playing.store(busy, Ordering::Relaxed);
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn blocks_processed(&self) -> usize {
        self.blocks_processed.load(Ordering::Relaxed)
    }

    /// Queues interleaved samples already in the device format.
    fn enqueue(&self, interleaved: Vec<f32>) {
        if interleaved.is_empty() {
            return;
        }
        self.chunk_queue.lock().push_back(interleaved);
        self.is_playing.store(true, Ordering::Relaxed);
    }

    pub fn wait_blocking_until_empty(&self) {
        while self.is_playing.load(Ordering::Relaxed) {
            std::thread::sleep(std::time::Duration::from_millis(10));
        }

        std::thread::sleep(std::time::Duration::from_millis(100));
    }

    /// Resamples a mono buffer to the device rate and queues it on every channel.
    pub fn play_buffer(&self, audio: &AudioBuffer) -> Result<(), anyhow::Error> {
        if audio.is_empty() {
            return Ok(());
        }
        let mono = if audio.sample_rate == self.sample_rate {
            audio.samples.clone()
        } else {
            resample_mono(&audio.samples, audio.sample_rate, self.sample_rate)?
        };

        let channels = self.channel_count as usize;
        let interleaved = mono
            .iter()
            .flat_map(|&s| std::iter::repeat(s).take(channels))
            .collect::<Vec<_>>();
        self.enqueue(interleaved);
        Ok(())
    }
}

fn resample_mono(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>, anyhow::Error> {
    let ratio = to_rate as f64 / from_rate as f64;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let chunk_size = samples.len().min(RESAMPLER_CHUNK);
    let mut resampler = SincFixedIn::<f64>::new(ratio, 2.0, params, chunk_size, 1)?;

    let input = samples.iter().map(|&s| s as f64).collect::<Vec<_>>();
    let expected_len = (input.len() as f64 * ratio) as usize;
    let delay = resampler.output_delay();

    let mut output = Vec::with_capacity(expected_len + delay);
    let mut frames_out = vec![vec![0.0f64; resampler.output_frames_max()]];
    let mut pos = 0;

    while input.len() - pos >= resampler.input_frames_next() {
        let n = resampler.input_frames_next();
        let chunk = [&input[pos..pos + n]];
        let (_, produced) = resampler.process_into_buffer(&chunk, &mut frames_out, None)?;
        output.extend_from_slice(&frames_out[0][..produced]);
        pos += n;
    }

    if pos < input.len() {
        let chunk = [&input[pos..]];
        let (_, produced) = resampler.process_partial_into_buffer(Some(&chunk[..]), &mut frames_out, None)?;
        output.extend_from_slice(&frames_out[0][..produced]);
    }

    while output.len() < expected_len + delay {
        let (_, produced) = resampler.process_partial_into_buffer(None::<&[Vec<f64>]>, &mut frames_out, None)?;
        if produced == 0 {
            break;
        }
        output.extend_from_slice(&frames_out[0][..produced]);
    }

    Ok(output
        .into_iter()
        .skip(delay)
        .take(expected_len)
        .map(|s| s as f32)
        .collect())
}
