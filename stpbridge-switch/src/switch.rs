use parking_lot::Mutex;
use std::sync::Arc;
use stpbridge_core::{Link, Result, SwitchConfig};
use tokio::task::JoinHandle;
use tracing::info;

use crate::bridge::{BridgeSnapshot, BridgeState};
use crate::dispatch::Dispatcher;
use crate::fdb::ForwardingTable;
use crate::scheduler::{BpduScheduler, SchedulerConfig};
use crate::stats::SwitchStats;
use crate::SharedState;

/// One simulated switch bound to a link
pub struct Switch {
    link: Arc<dyn Link>,
    state: SharedState,
    fdb: Arc<ForwardingTable>,
    stats: Arc<SwitchStats>,
    scheduler: SchedulerConfig,
}

impl Switch {
    /// Build a switch from its configuration
    ///
    /// Fails if the configuration does not describe exactly one port per
    /// link port.
    pub fn new(config: &SwitchConfig, link: Arc<dyn Link>) -> Result<Self> {
        config.ensure_port_count(link.port_count())?;

        let state = BridgeState::new(config.priority, link.mac_address(), config.kinds());

        Ok(Self {
            link,
            state: Arc::new(Mutex::new(state)),
            fdb: Arc::new(ForwardingTable::new()),
            stats: Arc::new(SwitchStats::default()),
            scheduler: SchedulerConfig::default(),
        })
    }

    pub fn with_scheduler(mut self, scheduler: SchedulerConfig) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn state(&self) -> SharedState {
        self.state.clone()
    }

    pub fn fdb(&self) -> Arc<ForwardingTable> {
        self.fdb.clone()
    }

    pub fn stats(&self) -> Arc<SwitchStats> {
        self.stats.clone()
    }

    pub fn snapshot(&self) -> BridgeSnapshot {
        self.state.lock().snapshot()
    }

    /// Start the dispatch loop and the hello scheduler
    pub fn spawn(self) -> SwitchHandle {
        info!(
            bridge = %self.state.lock().own_id(),
            mac = %self.link.mac_address(),
            ports = self.link.port_count(),
            hello_ms = self.scheduler.hello_interval().as_millis() as u64,
            "Switch starting"
        );

        let scheduler = BpduScheduler::new(
            self.link.clone(),
            self.state.clone(),
            self.stats.clone(),
            self.scheduler,
        )
        .spawn();

        let dispatcher = Dispatcher::new(
            self.link.clone(),
            self.state.clone(),
            self.fdb.clone(),
            self.stats.clone(),
        );
        let dispatch = tokio::spawn(dispatcher.run());

        SwitchHandle {
            state: self.state,
            fdb: self.fdb,
            stats: self.stats,
            dispatch,
            scheduler,
        }
    }
}

/// Running switch
pub struct SwitchHandle {
    state: SharedState,
    fdb: Arc<ForwardingTable>,
    stats: Arc<SwitchStats>,
    dispatch: JoinHandle<Result<()>>,
    scheduler: JoinHandle<()>,
}

impl SwitchHandle {
    pub fn snapshot(&self) -> BridgeSnapshot {
        self.state.lock().snapshot()
    }

    pub fn fdb(&self) -> &ForwardingTable {
        &self.fdb
    }

    pub fn stats(&self) -> &SwitchStats {
        &self.stats
    }

    /// Stop both tasks
    pub fn abort(&self) {
        self.dispatch.abort();
        self.scheduler.abort();
    }

    /// Wait for the dispatch loop to end, then stop the scheduler
    pub async fn wait(self) -> Result<()> {
        let result = self.dispatch.await;
        self.scheduler.abort();
        match result {
            Ok(result) => result,
            Err(e) => Err(stpbridge_core::Error::link(format!("dispatch task failed: {}", e))),
        }
    }
}
