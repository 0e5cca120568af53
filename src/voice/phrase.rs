//! Phrase detection over a live capture stream
//!
//! Calibrates an ambient-noise threshold, waits for speech onset, then
//! records until a pause or the phrase limit.

use std::time::Duration;

/// Lowest energy threshold regardless of how quiet the room is
const MIN_ENERGY_THRESHOLD: f32 = 0.01;

/// Speech must exceed ambient energy by this factor
const AMBIENT_RATIO: f32 = 1.5;

/// Timing bounds for one listening session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenTiming {
    /// Ambient-noise calibration window
    pub calibration: Duration,
    /// Maximum wait for speech onset
    pub onset_timeout: Duration,
    /// Maximum phrase length once speech starts
    pub phrase_limit: Duration,
    /// Trailing silence that ends a phrase
    pub pause: Duration,
}

impl Default for ListenTiming {
    fn default() -> Self {
        Self {
            calibration: Duration::from_millis(500),
            onset_timeout: Duration::from_secs(5),
            phrase_limit: Duration::from_secs(10),
            pause: Duration::from_millis(800),
        }
    }
}

impl ListenTiming {
    /// Upper bound on a whole session, used as a watchdog by capture loops
    #[must_use]
    pub fn session_limit(&self) -> Duration {
        self.calibration + self.onset_timeout + self.phrase_limit + Duration::from_secs(1)
    }
}

/// Phase of the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhrasePhase {
    /// Measuring ambient noise
    Calibrating,
    /// Waiting for energy above the threshold
    AwaitingSpeech,
    /// Speech started, accumulating the phrase
    Recording,
    /// Finished (phrase emitted or timed out)
    Done,
}

/// Result of feeding a chunk of samples
#[derive(Debug, Clone, PartialEq)]
pub enum PhraseProgress {
    /// Keep feeding samples
    Pending,
    /// Phrase complete
    Complete(Vec<f32>),
    /// No speech began within the onset timeout
    TimedOut,
}

/// Detects a single spoken phrase in a stream of mono samples
pub struct PhraseDetector {
    phase: PhrasePhase,
    threshold: f32,
    calibration_target: usize,
    onset_target: usize,
    phrase_target: usize,
    pause_target: usize,
    ambient_sum_sq: f64,
    ambient_count: usize,
    waited: usize,
    silence: usize,
    phrase: Vec<f32>,
}

impl PhraseDetector {
    /// Create a detector for the given sample rate and timing
    #[must_use]
    pub fn new(sample_rate: u32, timing: ListenTiming) -> Self {
        Self {
            phase: PhrasePhase::Calibrating,
            threshold: MIN_ENERGY_THRESHOLD,
            calibration_target: samples_for(timing.calibration, sample_rate),
            onset_target: samples_for(timing.onset_timeout, sample_rate),
            phrase_target: samples_for(timing.phrase_limit, sample_rate).max(1),
            pause_target: samples_for(timing.pause, sample_rate),
            ambient_sum_sq: 0.0,
            ambient_count: 0,
            waited: 0,
            silence: 0,
            phrase: Vec::new(),
        }
    }

    /// Feed the next chunk of samples
    pub fn feed(&mut self, mut chunk: &[f32]) -> PhraseProgress {
        if self.phase == PhrasePhase::Calibrating {
            let take = (self.calibration_target - self.ambient_count).min(chunk.len());
            let (ambient, rest) = chunk.split_at(take);
            self.ambient_sum_sq += ambient.iter().map(|&s| f64::from(s * s)).sum::<f64>();
            self.ambient_count += ambient.len();

            if self.ambient_count < self.calibration_target {
                return PhraseProgress::Pending;
            }

            self.finish_calibration();
            chunk = rest;
        }

        if chunk.is_empty() {
            return PhraseProgress::Pending;
        }

        let is_speech = calculate_energy(chunk) > self.threshold;

        match self.phase {
            PhrasePhase::Calibrating | PhrasePhase::Done => PhraseProgress::Pending,
            PhrasePhase::AwaitingSpeech => {
                if is_speech {
                    tracing::trace!(threshold = self.threshold, "speech onset");
                    self.phase = PhrasePhase::Recording;
                    self.record(chunk, true)
                } else {
                    self.waited += chunk.len();
                    if self.waited >= self.onset_target {
                        tracing::debug!(waited = self.waited, "no speech before onset timeout");
                        self.phase = PhrasePhase::Done;
                        PhraseProgress::TimedOut
                    } else {
                        PhraseProgress::Pending
                    }
                }
            }
            PhrasePhase::Recording => self.record(chunk, is_speech),
        }
    }

    fn record(&mut self, chunk: &[f32], is_speech: bool) -> PhraseProgress {
        self.phrase.extend_from_slice(chunk);

        if is_speech {
            self.silence = 0;
        } else {
            self.silence += chunk.len();
        }

        if self.phrase.len() >= self.phrase_target {
            self.phrase.truncate(self.phrase_target);
            tracing::debug!(samples = self.phrase.len(), "phrase limit reached");
            return self.complete();
        }

        if self.silence >= self.pause_target {
            tracing::debug!(samples = self.phrase.len(), "phrase complete");
            return self.complete();
        }

        PhraseProgress::Pending
    }

    fn complete(&mut self) -> PhraseProgress {
        self.phase = PhrasePhase::Done;
        PhraseProgress::Complete(std::mem::take(&mut self.phrase))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    fn finish_calibration(&mut self) {
        let ambient = if self.ambient_count == 0 {
            0.0
        } else {
            (self.ambient_sum_sq / self.ambient_count as f64).sqrt() as f32
        };
        self.threshold = (ambient * AMBIENT_RATIO).max(MIN_ENERGY_THRESHOLD);
        self.phase = PhrasePhase::AwaitingSpeech;
        tracing::debug!(ambient, threshold = self.threshold, "ambient noise calibrated");
    }

    /// Current phase
    #[must_use]
    pub const fn phase(&self) -> PhrasePhase {
        self.phase
    }

    /// Energy threshold in effect (meaningful after calibration)
    #[must_use]
    pub const fn threshold(&self) -> f32 {
        self.threshold
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn samples_for(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * f64::from(sample_rate)) as usize
}

/// Calculate RMS energy of audio samples
#[allow(clippy::cast_precision_loss)]
pub fn calculate_energy(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: u32 = 1000;

    fn timing() -> ListenTiming {
        ListenTiming {
            calibration: Duration::from_millis(100),
            onset_timeout: Duration::from_millis(500),
            phrase_limit: Duration::from_millis(1000),
            pause: Duration::from_millis(200),
        }
    }

    #[test]
    fn test_energy_calculation() {
        let silence = vec![0.0f32; 100];
        assert!(calculate_energy(&silence) < 0.001);

        let loud = vec![0.5f32; 100];
        assert!(calculate_energy(&loud) > 0.4);
    }

    #[test]
    fn test_calibration_sets_threshold_from_ambient() {
        let mut detector = PhraseDetector::new(RATE, timing());
        assert_eq!(detector.phase(), PhrasePhase::Calibrating);

        assert_eq!(detector.feed(&[0.1; 100]), PhraseProgress::Pending);
        assert_eq!(detector.phase(), PhrasePhase::AwaitingSpeech);
        assert!((detector.threshold() - 0.15).abs() < 1e-4);
    }

    #[test]
    fn test_quiet_room_uses_floor() {
        let mut detector = PhraseDetector::new(RATE, timing());
        detector.feed(&[0.0; 100]);
        assert!((detector.threshold() - MIN_ENERGY_THRESHOLD).abs() < f32::EPSILON);
    }

    #[test]
    fn test_times_out_without_speech() {
        let mut detector = PhraseDetector::new(RATE, timing());
        detector.feed(&[0.0; 100]);

        for _ in 0..4 {
            assert_eq!(detector.feed(&[0.0; 100]), PhraseProgress::Pending);
        }
        assert_eq!(detector.feed(&[0.0; 100]), PhraseProgress::TimedOut);
        assert_eq!(detector.phase(), PhrasePhase::Done);
    }

    #[test]
    fn test_phrase_ends_on_pause() {
        let mut detector = PhraseDetector::new(RATE, timing());
        detector.feed(&[0.0; 100]);

        assert_eq!(detector.feed(&[0.5; 100]), PhraseProgress::Pending);
        assert_eq!(detector.phase(), PhrasePhase::Recording);
        assert_eq!(detector.feed(&[0.0; 100]), PhraseProgress::Pending);

        match detector.feed(&[0.0; 100]) {
            PhraseProgress::Complete(samples) => assert_eq!(samples.len(), 300),
            other => panic!("expected complete phrase, got {other:?}"),
        }
    }

    #[test]
    fn test_phrase_limit_truncates() {
        let mut detector = PhraseDetector::new(RATE, timing());
        detector.feed(&[0.0; 100]);

        let mut result = PhraseProgress::Pending;
        for _ in 0..20 {
            result = detector.feed(&[0.5; 100]);
            if result != PhraseProgress::Pending {
                break;
            }
        }

        match result {
            PhraseProgress::Complete(samples) => assert_eq!(samples.len(), 1000),
            other => panic!("expected truncated phrase, got {other:?}"),
        }
    }

    #[test]
    fn test_calibration_remainder_is_processed() {
        let mut detector = PhraseDetector::new(RATE, timing());

        let mut chunk = vec![0.0; 100];
        chunk.extend(vec![0.5; 50]);
        assert_eq!(detector.feed(&chunk), PhraseProgress::Pending);
        assert_eq!(detector.phase(), PhrasePhase::Recording);
    }
}
