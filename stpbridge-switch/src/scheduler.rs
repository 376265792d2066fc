//! Periodic root hellos

use std::sync::Arc;
use std::time::Duration;
use stpbridge_core::{stp_constants::DEFAULT_HELLO_MS, Error, Link, Result};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, trace};

use crate::dispatch::transmit;
use crate::stats::SwitchStats;
use crate::SharedState;

/// Scheduler configuration; the hello period is never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    hello_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            hello_interval: Duration::from_millis(DEFAULT_HELLO_MS),
        }
    }
}

impl SchedulerConfig {
    pub fn new(hello_interval: Duration) -> Result<Self> {
        if hello_interval.is_zero() {
            return Err(Error::invalid_config("hello period must be greater than zero"));
        }
        Ok(Self { hello_interval })
    }

    pub fn with_hello_ms(ms: u64) -> Result<Self> {
        Self::new(Duration::from_millis(ms))
    }

    pub fn hello_interval(&self) -> Duration {
        self.hello_interval
    }
}

/// Sends `ControlFrame(own, own, 0)` on every trunk each period while this
/// bridge believes it is the root
pub struct BpduScheduler {
    link: Arc<dyn Link>,
    state: SharedState,
    stats: Arc<SwitchStats>,
    config: SchedulerConfig,
}

impl BpduScheduler {
    pub fn new(
        link: Arc<dyn Link>,
        state: SharedState,
        stats: Arc<SwitchStats>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            link,
            state,
            stats,
            config,
        }
    }

    /// One period's worth of work; returns the number of hellos sent
    pub fn tick(&self) -> usize {
        // Lock is released before anything is sent
        let hellos = self.state.lock().hello_frames();
        if hellos.is_empty() {
            trace!("Not root, no hello");
            return 0;
        }

        let sent = transmit(self.link.as_ref(), &self.stats, hellos);
        self.stats.add_bpdus_sent(sent as u64);
        sent
    }

    /// Tick forever on the configured period
    pub async fn run(self) {
        let mut interval = time::interval(self.config.hello_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(interval_ms = self.config.hello_interval.as_millis() as u64, "Hello scheduler started");

        loop {
            interval.tick().await;
            self.tick();
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
