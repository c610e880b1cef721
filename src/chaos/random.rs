//! Uniform randomness behind a trait so tests can script every roll.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

/// A source of uniform samples in `[0, 1)`.
///
/// Implementations must tolerate concurrent draws from many requests.
pub trait RandomSource: Send + Sync {
    fn next_f64(&self) -> f64;
}

/// Production source backed by the calling thread's RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_f64(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Replays a fixed list of samples, wrapping around at the end.
#[derive(Debug)]
pub struct SequenceRandom {
    samples: Vec<f64>,
    cursor: AtomicUsize,
}

impl SequenceRandom {
    /// Samples outside `[0, 1)` are clamped into range.
    pub fn new(samples: impl Into<Vec<f64>>) -> Self {
        let samples: Vec<f64> = samples
            .into()
            .into_iter()
            .map(|s| s.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self {
            samples,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_f64(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed);
        self.samples[i % self.samples.len()]
    }
}
