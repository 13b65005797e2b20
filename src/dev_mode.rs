/// Development mode: synthetic sensor feed
///
/// When no broker or sensor is reachable, use this module to drive the
/// dashboard with generated payloads in the real wire format. The water
/// level follows a triangle wave from 0 cm up to a peak and back so every
/// alert tier shows up, and a malformed payload is injected periodically
/// to exercise the last-known-good path.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::ingest::{SharedReading, ingest_and_log};
use crate::logging::{self, Component};

/// Log context for synthetic payloads, in place of a topic name.
pub const DEV_SOURCE: &str = "dev-mode";

/// Configuration for the synthetic feed
pub struct DevMode {
    /// Water level change per emitted payload, in cm
    pub step_cm: f64,
    /// Highest level of the wave, in cm
    pub peak_cm: f64,
    /// Delay between payloads
    pub update_interval: Duration,
    /// Every Nth payload is malformed; 0 disables injection
    pub malformed_every: u64,
}

impl DevMode {
    pub fn new(update_interval: Duration) -> Self {
        Self {
            step_cm: 10.0,
            peak_cm: 300.0,
            update_interval,
            malformed_every: 25,
        }
    }

    /// False for a zero, negative or NaN step.
    fn has_step(&self) -> bool {
        self.step_cm > 0.0
    }

    /// Steps in one full rise and fall. A zero or negative step yields a
    /// flat wave at 0 cm.
    fn period(&self) -> u64 {
        if !self.has_step() {
            return 2;
        }
        let half = (self.peak_cm / self.step_cm).round().max(1.0) as u64;
        half.saturating_mul(2)
    }

    /// Water level at a given step of the wave.
    pub fn level_at(&self, step: u64) -> f64 {
        if !self.has_step() {
            return 0.0;
        }
        let period = self.period();
        let pos = step % period;
        let half = period / 2;
        let rung = if pos <= half { pos } else { period - pos };
        rung as f64 * self.step_cm
    }

    /// Payload emitted at a given step.
    pub fn payload_at(&self, step: u64) -> String {
        if self.malformed_every > 0 && step > 0 && step % self.malformed_every == 0 {
            return "Nivel: -- cm | T: -- | U: --".to_string();
        }
        let t = step as f64 / 10.0;
        format!(
            "Nivel: {:.2} cm | T: {:.1} | U: {:.1}",
            self.level_at(step),
            22.0 + 4.0 * t.sin(),
            65.0 + 10.0 * t.cos()
        )
    }

    /// Feeds payloads into `shared` on a background thread, forever.
    pub fn spawn(self, shared: Arc<SharedReading>) -> std::io::Result<JoinHandle<()>> {
        logging::info(
            Component::System,
            Some(DEV_SOURCE),
            &format!(
                "dev mode: synthetic payload every {}s, wave 0-{} cm",
                self.update_interval.as_secs(),
                self.peak_cm
            ),
        );
        thread::Builder::new()
            .name("dev-feed".to_string())
            .spawn(move || {
                let mut step = 0u64;
                loop {
                    let payload = self.payload_at(step);
                    ingest_and_log(&shared, DEV_SOURCE, payload.as_bytes());
                    step = step.wrapping_add(1);
                    thread::sleep(self.update_interval);
                }
            })
    }
}
