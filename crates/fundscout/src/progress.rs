//! Cosmetic progress while the recommendation request is in flight.
//!
//! The percentage is a timer, not a measurement. It climbs in fixed steps up
//! to a ceiling and is abandoned the moment the real response arrives.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

/// Timing of the progress indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressSettings {
  /// Milliseconds between increments
  pub tick_ms: u64,
  /// Percentage points added per tick
  pub step: u8,
  /// The ticker never goes past this; only a real response reaches 100
  pub ceiling: u8,
  /// How long the finished (or failed) indicator stays up
  pub hide_delay_ms: u64,
}

impl Default for ProgressSettings {
  fn default() -> Self {
    Self { tick_ms: 300, step: 5, ceiling: 90, hide_delay_ms: 800 }
  }
}

impl ProgressSettings {
  pub fn tick(&self) -> Duration {
    Duration::from_millis(self.tick_ms.max(1))
  }

  pub fn hide_delay(&self) -> Duration {
    Duration::from_millis(self.hide_delay_ms)
  }
}

pub struct ProgressTicker {
  percent: u8,
  step: u8,
  ceiling: u8,
  interval: Interval,
}

impl ProgressTicker {
  pub fn new(settings: &ProgressSettings) -> Self {
    let period = settings.tick();
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    Self { percent: 0, step: settings.step, ceiling: settings.ceiling.min(100), interval }
  }

  pub fn percent(&self) -> u8 {
    self.percent
  }

  /// Wait for the next tick and return the new percentage
  pub async fn tick(&mut self) -> u8 {
    self.interval.tick().await;
    self.percent = self.percent.saturating_add(self.step).min(self.ceiling);
    self.percent
  }
}

/// Poll `request` to completion, calling `on_tick` on every tick meanwhile.
///
/// Both run on the current task; the ticker stops as soon as `request`
/// resolves.
pub async fn drive<F, T>(request: F, ticker: &mut ProgressTicker, mut on_tick: impl FnMut(u8)) -> T
where
  F: Future<Output = T>,
{
  tokio::pin!(request);

  loop {
    tokio::select! {
      biased;
      output = &mut request => return output,
      percent = ticker.tick() => on_tick(percent),
    }
  }
}
