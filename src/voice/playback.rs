//! Audio playback to speakers

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, SampleRate, StreamConfig};

use crate::{Error, Result};

/// Something that can play an encoded audio artifact to completion
pub trait AudioSink: Send + Sync {
    /// Play an MP3 file, blocking until playback finishes
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be decoded or played
    fn play_file(&self, path: &Path) -> Result<()>;
}

/// Decoded mono PCM audio
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio {
    /// Mono samples in [-1.0, 1.0]
    pub samples: Vec<f32>,
    /// Sample rate of `samples`
    pub sample_rate: u32,
}

/// Plays audio to the default output device
///
/// The device is opened per call so the handle can be shared freely across
/// worker threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct AudioPlayback;

impl AudioPlayback {
    /// Create a playback handle, checking that an output device exists
    ///
    /// # Errors
    ///
    /// Returns error if no output device is available
    pub fn new() -> Result<Self> {
        let device = default_output()?;
        tracing::debug!(
            device = device.name().unwrap_or_default(),
            "audio playback initialized"
        );
        Ok(Self)
    }

    /// Play MP3 bytes, blocking until done
    ///
    /// # Errors
    ///
    /// Returns error if decoding or playback fails
    pub fn play_mp3(&self, mp3_data: &[u8]) -> Result<()> {
        let audio = decode_mp3(mp3_data)?;
        self.play(&audio)
    }

    /// Play mono samples, blocking until done
    ///
    /// # Errors
    ///
    /// Returns error if the output stream fails
    pub fn play(&self, audio: &DecodedAudio) -> Result<()> {
        if audio.samples.is_empty() {
            return Ok(());
        }

        let device = default_output()?;
        let (config, format) = output_config(&device, audio.sample_rate)?;
        if format != SampleFormat::F32 {
            return Err(Error::Audio(format!("unsupported output format {format:?}")));
        }

        let samples = if config.sample_rate.0 == audio.sample_rate {
            audio.samples.clone()
        } else {
            resample(&audio.samples, audio.sample_rate, config.sample_rate.0)?
        };

        play_blocking(&device, &config, samples)
    }
}

impl AudioSink for AudioPlayback {
    fn play_file(&self, path: &Path) -> Result<()> {
        let data = std::fs::read(path)?;
        tracing::debug!(path = %path.display(), bytes = data.len(), "playing audio file");
        self.play_mp3(&data)
    }
}

fn default_output() -> Result<Device> {
    cpal::default_host()
        .default_output_device()
        .ok_or_else(|| Error::Audio("no output device available".to_string()))
}

/// Pick an output config at `rate` if the device supports it, else the default
fn output_config(device: &Device, rate: u32) -> Result<(StreamConfig, SampleFormat)> {
    let matching = device
        .supported_output_configs()
        .map_err(|e| Error::Audio(e.to_string()))?
        .filter(|c| c.sample_format() == SampleFormat::F32)
        .filter(|c| c.min_sample_rate() <= SampleRate(rate) && c.max_sample_rate() >= SampleRate(rate))
        .min_by_key(cpal::SupportedStreamConfigRange::channels);

    if let Some(range) = matching {
        let supported = range.with_sample_rate(SampleRate(rate));
        return Ok((supported.config(), supported.sample_format()));
    }

    let supported = device
        .default_output_config()
        .map_err(|e| Error::Audio(e.to_string()))?;
    Ok((supported.config(), supported.sample_format()))
}

fn play_blocking(device: &Device, config: &StreamConfig, samples: Vec<f32>) -> Result<()> {
    let channels = usize::from(config.channels);
    let sample_count = samples.len();
    let samples = Arc::new(samples);
    let position = Arc::new(AtomicUsize::new(0));
    let finished = Arc::new(AtomicBool::new(false));

    let stream = {
        let samples = Arc::clone(&samples);
        let position = Arc::clone(&position);
        let finished = Arc::clone(&finished);

        device
            .build_output_stream(
                config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut pos = position.load(Ordering::Relaxed);
                    for frame in data.chunks_mut(channels) {
                        let sample = samples.get(pos).copied().unwrap_or_else(|| {
                            finished.store(true, Ordering::Release);
                            0.0
                        });
                        frame.fill(sample);
                        pos = (pos + 1).min(samples.len());
                    }
                    position.store(pos, Ordering::Relaxed);
                },
                |err| {
                    tracing::error!(error = %err, "audio playback error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))?
    };

    stream.play().map_err(|e| Error::Audio(e.to_string()))?;

    let duration_ms = (sample_count as u64 * 1000) / u64::from(config.sample_rate.0);
    let start = Instant::now();
    let timeout = Duration::from_millis(duration_ms + 500);

    while !finished.load(Ordering::Acquire) {
        if start.elapsed() > timeout {
            tracing::warn!("playback did not signal completion, stopping");
            break;
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    // Let the device drain its last buffer
    std::thread::sleep(Duration::from_millis(100));

    drop(stream);
    tracing::debug!(samples = sample_count, "playback complete");

    Ok(())
}

/// Resample mono audio using rubato
#[allow(clippy::cast_possible_truncation)]
fn resample(samples: &[f32], from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    use rubato::{FftFixedIn, Resampler};

    let chunk_size = 1024;
    let sub_chunks = 2;

    let mut resampler =
        FftFixedIn::<f64>::new(from_rate as usize, to_rate as usize, chunk_size, sub_chunks, 1)
            .map_err(|e| Error::Audio(format!("resampler init failed: {e}")))?;

    let mut input: Vec<f64> = samples.iter().map(|&s| f64::from(s)).collect();
    // Pad the tail so the last partial chunk is not dropped
    let remainder = input.len() % chunk_size;
    if remainder != 0 {
        input.resize(input.len() + chunk_size - remainder, 0.0);
    }

    let mut output = Vec::with_capacity(input.len() * to_rate as usize / from_rate.max(1) as usize);
    for chunk in input.chunks(chunk_size) {
        let result = resampler
            .process(&[chunk.to_vec()], None)
            .map_err(|e| Error::Audio(format!("resample failed: {e}")))?;
        output.extend(result[0].iter().map(|&s| s as f32));
    }

    Ok(output)
}

/// Decode MP3 bytes to mono f32 samples
///
/// # Errors
///
/// Returns error if the data is not valid MP3
pub fn decode_mp3(mp3_data: &[u8]) -> Result<DecodedAudio> {
    let mut decoder = minimp3::Decoder::new(Cursor::new(mp3_data));
    let mut samples = Vec::new();
    let mut sample_rate = 0;

    loop {
        match decoder.next_frame() {
            Ok(frame) => {
                if sample_rate == 0 {
                    sample_rate = u32::try_from(frame.sample_rate).unwrap_or(0);
                }

                if frame.channels == 2 {
                    samples.extend(frame.data.chunks(2).map(|chunk| {
                        let left = f32::from(chunk[0]) / 32768.0;
                        let right = f32::from(chunk.get(1).copied().unwrap_or(chunk[0])) / 32768.0;
                        f32::midpoint(left, right)
                    }));
                } else {
                    samples.extend(frame.data.iter().map(|&s| f32::from(s) / 32768.0));
                }
            }
            Err(minimp3::Error::Eof) => break,
            Err(e) => return Err(Error::Audio(format!("MP3 decode error: {e}"))),
        }
    }

    if sample_rate == 0 {
        return Err(Error::Audio("no MP3 frames found".to_string()));
    }

    Ok(DecodedAudio {
        samples,
        sample_rate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_mp3(b"definitely not an mp3").is_err());
    }

    #[test]
    fn test_resample_changes_length() {
        let samples = vec![0.0f32; 4800];
        let out = resample(&samples, 24000, 48000).unwrap();
        assert!(out.len() > 8000);
    }
}
