//! In-memory backend with scripted responses for tests.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{AdminAction, AdminOutcome, Backend};
use crate::data::{
    ConfigStore, ParameterConfig, Reading, SensorHistory, SensorId, SensorLocation, SensorStats,
    SystemStats,
};
use crate::error::DashboardError;

type Scripted<T> = (Duration, Result<T, DashboardError>);

#[derive(Debug)]
struct Script {
    config: Result<Vec<ParameterConfig>, DashboardError>,
    locations: Result<Vec<SensorLocation>, DashboardError>,
    latest: Result<Vec<Reading>, DashboardError>,
    latest_queue: VecDeque<Scripted<Vec<Reading>>>,
    live: Result<Reading, DashboardError>,
    live_queue: VecDeque<Scripted<Reading>>,
    history: HashMap<SensorId, Scripted<SensorHistory>>,
    stats: HashMap<SensorId, Result<SensorStats, DashboardError>>,
    system_stats: Result<SystemStats, DashboardError>,
    admin: Result<AdminOutcome, DashboardError>,
    admin_actions: Vec<AdminAction>,
}

/// A [`Backend`] whose answers are set up front by the test.
///
/// Queued responses are consumed in call order, each after its own delay,
/// which lets tests make earlier requests resolve after later ones.
#[derive(Debug)]
pub struct ScriptedBackend {
    script: Mutex<Script>,
    latest_calls: AtomicUsize,
    live_calls: AtomicUsize,
    history_calls: AtomicUsize,
    stats_calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        let builtin = ConfigStore::builtin();
        Self {
            script: Mutex::new(Script {
                config: Ok(builtin.parameters().to_vec()),
                locations: Ok(builtin.locations().to_vec()),
                latest: Ok(Vec::new()),
                latest_queue: VecDeque::new(),
                live: Err(DashboardError::DataUnavailable("no live reading".to_string())),
                live_queue: VecDeque::new(),
                history: HashMap::new(),
                stats: HashMap::new(),
                system_stats: Ok(SystemStats::default()),
                admin: Ok(AdminOutcome::default()),
                admin_actions: Vec::new(),
            }),
            latest_calls: AtomicUsize::new(0),
            live_calls: AtomicUsize::new(0),
            history_calls: AtomicUsize::new(0),
            stats_calls: AtomicUsize::new(0),
        }
    }

    fn script(&self) -> std::sync::MutexGuard<'_, Script> {
        self.script.lock().unwrap()
    }

    pub fn set_config(&self, config: Result<Vec<ParameterConfig>, DashboardError>) {
        self.script().config = config;
    }

    pub fn set_locations(&self, locations: Result<Vec<SensorLocation>, DashboardError>) {
        self.script().locations = locations;
    }

    pub fn locations_len(&self) -> usize {
        self.script().locations.as_ref().map_or(0, Vec::len)
    }

    /// Answer for every `latest` call once the queue is drained.
    pub fn set_latest(&self, latest: Result<Vec<Reading>, DashboardError>) {
        self.script().latest = latest;
    }

    /// Queue an answer for the next `latest` call, delivered after `delay`.
    pub fn push_latest(&self, delay: Duration, latest: Result<Vec<Reading>, DashboardError>) {
        self.script().latest_queue.push_back((delay, latest));
    }

    pub fn set_live(&self, live: Result<Reading, DashboardError>) {
        self.script().live = live;
    }

    pub fn push_live(&self, delay: Duration, live: Result<Reading, DashboardError>) {
        self.script().live_queue.push_back((delay, live));
    }

    pub fn set_history(&self, sensor_id: SensorId, history: Result<SensorHistory, DashboardError>) {
        self.set_history_delayed(sensor_id, Duration::ZERO, history);
    }

    pub fn set_history_delayed(
        &self,
        sensor_id: SensorId,
        delay: Duration,
        history: Result<SensorHistory, DashboardError>,
    ) {
        self.script().history.insert(sensor_id, (delay, history));
    }

    pub fn set_stats(&self, sensor_id: SensorId, stats: Result<SensorStats, DashboardError>) {
        self.script().stats.insert(sensor_id, stats);
    }

    pub fn set_system_stats(&self, stats: Result<SystemStats, DashboardError>) {
        self.script().system_stats = stats;
    }

    pub fn set_admin(&self, outcome: Result<AdminOutcome, DashboardError>) {
        self.script().admin = outcome;
    }

    pub fn admin_actions(&self) -> Vec<AdminAction> {
        self.script().admin_actions.clone()
    }

    pub fn latest_calls(&self) -> usize {
        self.latest_calls.load(Ordering::SeqCst)
    }

    pub fn live_calls(&self) -> usize {
        self.live_calls.load(Ordering::SeqCst)
    }

    pub fn history_calls(&self) -> usize {
        self.history_calls.load(Ordering::SeqCst)
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedBackend {
    fn default() -> Self {
        Self::new()
    }
}

async fn deliver<T>((delay, result): Scripted<T>) -> Result<T, DashboardError> {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    result
}

#[async_trait]
impl Backend for ScriptedBackend {
    fn description(&self) -> &str {
        "scripted"
    }

    async fn sensor_config(&self) -> Result<Vec<ParameterConfig>, DashboardError> {
        self.script().config.clone()
    }

    async fn sensor_locations(&self) -> Result<Vec<SensorLocation>, DashboardError> {
        self.script().locations.clone()
    }

    async fn latest(&self) -> Result<Vec<Reading>, DashboardError> {
        self.latest_calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut script = self.script();
            script
                .latest_queue
                .pop_front()
                .unwrap_or_else(|| (Duration::ZERO, script.latest.clone()))
        };
        deliver(next).await
    }

    async fn sensor_history(
        &self,
        sensor_id: SensorId,
        _hours: u32,
    ) -> Result<SensorHistory, DashboardError> {
        self.history_calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .script()
            .history
            .get(&sensor_id)
            .cloned()
            .unwrap_or((Duration::ZERO, Ok(SensorHistory::default())));
        deliver(next).await
    }

    async fn sensor_stats(&self, sensor_id: SensorId) -> Result<SensorStats, DashboardError> {
        self.stats_calls.fetch_add(1, Ordering::SeqCst);
        self.script()
            .stats
            .get(&sensor_id)
            .cloned()
            .unwrap_or_else(|| Ok(SensorStats::default()))
    }

    async fn live_latest(&self) -> Result<Reading, DashboardError> {
        self.live_calls.fetch_add(1, Ordering::SeqCst);
        let next = {
            let mut script = self.script();
            script
                .live_queue
                .pop_front()
                .unwrap_or_else(|| (Duration::ZERO, script.live.clone()))
        };
        deliver(next).await
    }

    async fn system_stats(&self) -> Result<SystemStats, DashboardError> {
        self.script().system_stats.clone()
    }

    async fn admin(&self, action: AdminAction) -> Result<AdminOutcome, DashboardError> {
        let mut script = self.script();
        script.admin_actions.push(action);
        script.admin.clone()
    }
}
