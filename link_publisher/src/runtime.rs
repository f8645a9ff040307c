//! Fixed-interval tick driver standing in for the host scheduler.
//!
//! The runtime owns nothing but timing: it calls `start` once, `tick` at the
//! configured interval until the running flag clears or the tick limit is
//! reached, and `dispose` on every exit path.

use crate::host::{HostSystem, LinkHost};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Optional per-tick host update (e.g. advancing a simulation).
pub trait HostClock {
    /// Advance host state by `dt` before systems tick.
    fn advance(&mut self, dt: Duration);
}

/// Timing statistics for the tick loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TickStats {
    /// Number of ticks executed
    pub tick_count: u64,
    /// Ticks whose work exceeded the interval
    pub overruns: u64,
    /// Longest observed tick work in microseconds
    pub max_tick_us: u64,
}

/// Drives a [`HostSystem`] at a fixed interval.
pub struct TickRuntime {
    interval: Duration,
    max_ticks: Option<u64>,
    running: Arc<AtomicBool>,
    stats: TickStats,
}

impl TickRuntime {
    /// Create a runtime ticking every `interval`.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            max_ticks: None,
            running: Arc::new(AtomicBool::new(false)),
            stats: TickStats::default(),
        }
    }

    /// Stop after `ticks` ticks.
    pub fn with_max_ticks(mut self, ticks: u64) -> Self {
        self.max_ticks = Some(ticks);
        self
    }

    /// Running flag for signal handlers.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Timing statistics.
    pub fn stats(&self) -> TickStats {
        self.stats
    }

    /// Run `system` against `host` until stopped.
    ///
    /// `dispose` is called whether or not `start` succeeded.
    ///
    /// # Errors
    /// Returns the system's `start` error.
    pub fn run<H, S>(&mut self, host: &mut H, system: &mut S) -> Result<(), S::Error>
    where
        H: LinkHost + HostClock,
        S: HostSystem,
    {
        info!(
            "Starting {} system (tick interval {}ms)",
            system.name(),
            self.interval.as_millis()
        );

        if let Err(e) = system.start(&*host) {
            system.dispose();
            return Err(e);
        }

        self.running.store(true, Ordering::SeqCst);
        let mut last_tick = Instant::now();

        while self.running.load(Ordering::SeqCst) {
            if self.max_ticks.is_some_and(|max| self.stats.tick_count >= max) {
                break;
            }

            let tick_start = Instant::now();
            let dt = tick_start.duration_since(last_tick);
            last_tick = tick_start;

            host.advance(dt);
            system.tick(&*host, dt);

            let work = tick_start.elapsed();
            let work_us = work.as_micros() as u64;
            self.stats.tick_count += 1;
            self.stats.max_tick_us = self.stats.max_tick_us.max(work_us);

            if work > self.interval {
                self.stats.overruns += 1;
                if self.stats.overruns <= 10 || self.stats.overruns % 1000 == 0 {
                    warn!(
                        "Tick overrun #{}: took {}us (interval {}us)",
                        self.stats.overruns,
                        work_us,
                        self.interval.as_micros()
                    );
                }
            } else {
                std::thread::sleep(self.interval - work);
            }

            if self.stats.tick_count % 500 == 0 {
                debug!(
                    "Tick loop: {} ticks, max={}us, overruns={}",
                    self.stats.tick_count, self.stats.max_tick_us, self.stats.overruns
                );
            }
        }

        self.running.store(false, Ordering::SeqCst);
        system.dispose();

        info!(
            "{} system stopped after {} ticks (overruns: {})",
            system.name(),
            self.stats.tick_count,
            self.stats.overruns
        );
        Ok(())
    }
}
