//! Audio capture from microphone

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};

use crate::{Error, Result};

/// Preferred sample rate for speech capture (16kHz)
pub const SAMPLE_RATE: u32 = 16000;

/// Captures mono audio from the default input device
///
/// Uses 16kHz mono when the device supports it, otherwise the device default
/// config downmixed to mono. Consumers read the effective rate from
/// [`AudioCapture::sample_rate`].
pub struct AudioCapture {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    buffer: Arc<Mutex<Vec<f32>>>,
    stream: Option<Stream>,
}

impl AudioCapture {
    /// Open the default input device
    ///
    /// # Errors
    ///
    /// Returns error if no input device or usable config is available
    pub fn new() -> Result<Self> {
        let host = cpal::default_host();

        let device = host
            .default_input_device()
            .ok_or_else(|| Error::Audio("no input device available".to_string()))?;

        let preferred = device
            .supported_input_configs()
            .map_err(|e| Error::Audio(e.to_string()))?
            .find(|c| {
                c.channels() == 1
                    && c.sample_format() == SampleFormat::F32
                    && c.min_sample_rate() <= cpal::SampleRate(SAMPLE_RATE)
                    && c.max_sample_rate() >= cpal::SampleRate(SAMPLE_RATE)
            })
            .map(|c| c.with_sample_rate(cpal::SampleRate(SAMPLE_RATE)));

        let supported = match preferred {
            Some(config) => config,
            None => device
                .default_input_config()
                .map_err(|e| Error::Audio(e.to_string()))?,
        };

        let sample_format = supported.sample_format();
        let config = supported.config();

        tracing::debug!(
            device = device.name().unwrap_or_default(),
            sample_rate = config.sample_rate.0,
            channels = config.channels,
            ?sample_format,
            "audio capture initialized"
        );

        Ok(Self {
            device,
            config,
            sample_format,
            buffer: Arc::new(Mutex::new(Vec::new())),
            stream: None,
        })
    }

    /// Start capturing audio
    ///
    /// # Errors
    ///
    /// Returns error if the input stream cannot be built or started
    pub fn start(&mut self) -> Result<()> {
        if self.stream.is_some() {
            return Ok(());
        }

        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32>()?,
            SampleFormat::I16 => self.build_stream::<i16>()?,
            SampleFormat::U16 => self.build_stream::<u16>()?,
            other => {
                return Err(Error::Audio(format!("unsupported sample format {other:?}")));
            }
        };

        stream.play().map_err(|e| Error::Audio(e.to_string()))?;
        self.stream = Some(stream);

        tracing::debug!("audio capture started");
        Ok(())
    }

    fn build_stream<T>(&self) -> Result<Stream>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let buffer = Arc::clone(&self.buffer);
        let channels = usize::from(self.config.channels);

        self.device
            .build_input_stream(
                &self.config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    let samples: Vec<f32> = data.iter().map(|&s| f32::from_sample(s)).collect();
                    if let Ok(mut buf) = buffer.lock() {
                        buf.extend(downmix(&samples, channels));
                    }
                },
                |err| {
                    tracing::error!(error = %err, "audio capture error");
                },
                None,
            )
            .map_err(|e| Error::Audio(e.to_string()))
    }

    /// Stop capturing audio
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            drop(stream);
            tracing::debug!("audio capture stopped");
        }
    }

    /// Take the samples captured since the last call
    #[must_use]
    pub fn take_buffer(&self) -> Vec<f32> {
        self.buffer
            .lock()
            .map(|mut buf| std::mem::take(&mut *buf))
            .unwrap_or_default()
    }

    /// Effective capture sample rate
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }
}

impl Drop for AudioCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Average interleaved frames down to a single channel
#[allow(clippy::cast_precision_loss)]
fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return samples.to_vec();
    }

    samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

/// Convert f32 samples to WAV bytes for STT APIs
///
/// # Errors
///
/// Returns error if WAV encoding fails
pub fn samples_to_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).map_err(|e| Error::Audio(e.to_string()))?;

        for &sample in samples {
            // Convert f32 [-1.0, 1.0] to i16
            #[allow(clippy::cast_possible_truncation)]
            let sample_i16 = (sample * 32767.0).clamp(-32768.0, 32767.0) as i16;
            writer
                .write_sample(sample_i16)
                .map_err(|e| Error::Audio(e.to_string()))?;
        }

        writer.finalize().map_err(|e| Error::Audio(e.to_string()))?;
    }

    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_mono_is_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix(&samples, 1), samples);
    }

    #[test]
    fn test_downmix_stereo_averages_frames() {
        let samples = vec![0.2, 0.4, -1.0, 1.0];
        let mono = downmix(&samples, 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!(mono[1].abs() < 1e-6);
    }
}
