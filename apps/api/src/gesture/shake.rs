//! Shake gesture detection over 3-axis accelerometer samples.
//!
//! A sample counts as a shake when its magnitude, minus standard gravity,
//! exceeds the threshold. Shakes closer together than `min_interval_ms`
//! collapse into the first one.

use serde::{Deserialize, Serialize};

pub const STANDARD_GRAVITY: f64 = 9.80665;

const DEFAULT_THRESHOLD: f64 = 12.0;
const DEFAULT_MIN_INTERVAL_MS: u64 = 1000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct AccelerationSample {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Monotonic timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl AccelerationSample {
    /// Magnitude with gravity removed, or `None` for readings containing NaN
    /// or infinities.
    pub fn net_magnitude(&self) -> Option<f64> {
        if !(self.x.is_finite() && self.y.is_finite() && self.z.is_finite()) {
            return None;
        }
        Some((self.x * self.x + self.y * self.y + self.z * self.z).sqrt() - STANDARD_GRAVITY)
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct ShakeEvent {
    pub timestamp_ms: u64,
    pub magnitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShakeConfig {
    /// m/s² above gravity.
    pub threshold: f64,
    pub min_interval_ms: u64,
}

impl Default for ShakeConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            min_interval_ms: DEFAULT_MIN_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ShakeDetector {
    config: ShakeConfig,
    last_shake_ms: Option<u64>,
}

impl ShakeDetector {
    pub fn new(config: ShakeConfig) -> Self {
        Self {
            config,
            last_shake_ms: None,
        }
    }

    pub fn last_shake_ms(&self) -> Option<u64> {
        self.last_shake_ms
    }

    /// Feed one sample. Returns the shake it triggered, if any.
    pub fn on_sample(&mut self, sample: &AccelerationSample) -> Option<ShakeEvent> {
        let magnitude = sample.net_magnitude()?;
        if magnitude <= self.config.threshold {
            return None;
        }

        // Out-of-order timestamps saturate to 0 elapsed and are suppressed.
        let rested = match self.last_shake_ms {
            None => true,
            Some(last) => sample.timestamp_ms.saturating_sub(last) >= self.config.min_interval_ms,
        };
        if !rested {
            return None;
        }

        self.last_shake_ms = Some(sample.timestamp_ms);
        Some(ShakeEvent {
            timestamp_ms: sample.timestamp_ms,
            magnitude,
        })
    }

    /// Feeds samples in order and collects every shake they produce.
    pub fn process<'a, I>(&mut self, samples: I) -> Vec<ShakeEvent>
    where
        I: IntoIterator<Item = &'a AccelerationSample>,
    {
        samples
            .into_iter()
            .filter_map(|s| self.on_sample(s))
            .collect()
    }
}

impl Default for ShakeDetector {
    fn default() -> Self {
        Self::new(ShakeConfig::default())
    }
}
