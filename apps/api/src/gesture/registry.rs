use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::gesture::shake::{AccelerationSample, ShakeConfig, ShakeDetector, ShakeEvent};

struct Tracked {
    detector: ShakeDetector,
    last_seen: Instant,
}

/// Per-device shake detectors.
///
/// A device that stops sending motion without calling reset would otherwise
/// keep its detector forever, so entries idle for longer than `idle_timeout`
/// are dropped on the next batch from any device. A device that comes back
/// after eviction starts with a fresh detector.
pub struct DetectorRegistry {
    config: ShakeConfig,
    idle_timeout: Duration,
    devices: HashMap<String, Tracked>,
}

impl DetectorRegistry {
    pub fn new(config: ShakeConfig, idle_timeout: Duration) -> Self {
        Self {
            config,
            idle_timeout,
            devices: HashMap::new(),
        }
    }

    /// Runs `samples` through the device's detector, creating it if needed.
    /// Returns the shakes found and the device's last shake timestamp.
    pub fn process(
        &mut self,
        device_id: &str,
        samples: &[AccelerationSample],
        now: Instant,
    ) -> (Vec<ShakeEvent>, Option<u64>) {
        self.evict_idle(now);
        let config = self.config;
        let tracked = self
            .devices
            .entry(device_id.to_string())
            .or_insert_with(|| Tracked {
                detector: ShakeDetector::new(config),
                last_seen: now,
            });
        tracked.last_seen = now;
        let shakes = tracked.detector.process(samples);
        (shakes, tracked.detector.last_shake_ms())
    }

    pub fn remove(&mut self, device_id: &str) -> bool {
        self.devices.remove(device_id).is_some()
    }

    /// Drops detectors not fed since `now - idle_timeout`; returns how many.
    pub fn evict_idle(&mut self, now: Instant) -> usize {
        let before = self.devices.len();
        let timeout = self.idle_timeout;
        self.devices
            .retain(|_, t| now.saturating_duration_since(t.last_seen) < timeout);
        before - self.devices.len()
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}
