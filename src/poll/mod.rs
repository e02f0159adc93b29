//! Background polling of the backend.
//!
//! Every request runs as its own tokio task and reports back through an
//! mpsc channel that the UI loop drains each tick. Requests are tagged with
//! a [`RequestToken`] at the moment they are issued so the receiver can
//! drop responses that were overtaken by a newer request.
//!
//! Two timers exist:
//!
//! - the periodic timer (latest readings + system stats), started once;
//! - the live timer (live sensor feed), running only while the live sensor
//!   is selected. It is started and aborted explicitly.

mod token;

pub use token::{RequestToken, Resource, StaleGuard, TokenIssuer};

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::api::{AdminAction, AdminOutcome, Backend};
use crate::data::{Reading, SensorHistory, SensorId, SensorStats, SystemStats};
use crate::error::DashboardError;

/// Capacity of the event channel between request tasks and the UI loop.
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// A completed request, ready to be applied by the UI loop.
#[derive(Debug)]
pub enum PollEvent {
    Latest {
        token: RequestToken,
        result: Result<Vec<Reading>, DashboardError>,
    },
    Live {
        token: RequestToken,
        result: Result<Reading, DashboardError>,
    },
    History {
        token: RequestToken,
        sensor_id: SensorId,
        result: Result<SensorHistory, DashboardError>,
    },
    Stats {
        token: RequestToken,
        sensor_id: SensorId,
        result: Result<SensorStats, DashboardError>,
    },
    SystemStats {
        token: RequestToken,
        result: Result<SystemStats, DashboardError>,
    },
    Admin {
        action: AdminAction,
        result: Result<AdminOutcome, DashboardError>,
    },
}

/// Spawns request tasks. Cheap to clone into timer tasks.
#[derive(Debug, Clone)]
struct Fetcher {
    backend: Arc<dyn Backend>,
    issuer: Arc<TokenIssuer>,
    events: mpsc::Sender<PollEvent>,
    runtime: Handle,
    history_hours: u32,
}

impl Fetcher {
    fn spawn<F, Fut>(&self, request: F)
    where
        F: FnOnce(Arc<dyn Backend>, RequestToken) -> Fut,
        Fut: std::future::Future<Output = PollEvent> + Send + 'static,
    {
        let token = self.issuer.issue();
        let request = request(self.backend.clone(), token);
        let events = self.events.clone();
        self.runtime.spawn(async move {
            let event = request.await;
            // The receiver is gone only when the app is shutting down.
            let _ = events.send(event).await;
        });
    }

    fn latest(&self) {
        self.spawn(|backend, token| async move {
            debug!(token = token.value(), "Requesting latest readings");
            PollEvent::Latest {
                token,
                result: backend.latest().await,
            }
        });
    }

    fn live(&self) {
        self.spawn(|backend, token| async move {
            debug!(token = token.value(), "Requesting live reading");
            PollEvent::Live {
                token,
                result: backend.live_latest().await,
            }
        });
    }

    fn system_stats(&self) {
        self.spawn(|backend, token| async move {
            PollEvent::SystemStats {
                token,
                result: backend.system_stats().await,
            }
        });
    }

    fn history(&self, sensor_id: SensorId) {
        let hours = self.history_hours;
        self.spawn(move |backend, token| async move {
            debug!(token = token.value(), %sensor_id, hours, "Requesting history");
            PollEvent::History {
                token,
                sensor_id,
                result: backend.sensor_history(sensor_id, hours).await,
            }
        });
    }

    fn stats(&self, sensor_id: SensorId) {
        self.spawn(move |backend, token| async move {
            PollEvent::Stats {
                token,
                sensor_id,
                result: backend.sensor_stats(sensor_id).await,
            }
        });
    }

    fn admin(&self, action: AdminAction) {
        self.spawn(move |backend, _| async move {
            info!(%action, "Running admin action");
            PollEvent::Admin {
                action,
                result: backend.admin(action).await,
            }
        });
    }

    /// Run `tick` on every interval tick until the task is aborted.
    fn every(&self, period: Duration, tick: fn(&Fetcher)) -> JoinHandle<()> {
        let fetcher = self.clone();
        self.runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tick(&fetcher);
            }
        })
    }
}

/// Owns the timers and issues requests on behalf of the app.
#[derive(Debug)]
pub struct Poller {
    fetcher: Fetcher,
    periodic: Option<JoinHandle<()>>,
    live: Option<JoinHandle<()>>,
}

impl Poller {
    /// Create a poller and the receiving end of its event channel.
    pub fn new(
        backend: Arc<dyn Backend>,
        runtime: Handle,
        history_hours: u32,
    ) -> (Self, mpsc::Receiver<PollEvent>) {
        let (events, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let poller = Self {
            fetcher: Fetcher {
                backend,
                issuer: Arc::new(TokenIssuer::new()),
                events,
                runtime,
                history_hours,
            },
            periodic: None,
            live: None,
        };
        (poller, rx)
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.fetcher.backend
    }

    /// Start the latest-readings + system-stats timer. The first tick fires
    /// immediately. Calling this again restarts the timer.
    pub fn start_periodic(&mut self, period: Duration) {
        if let Some(handle) = self.periodic.take() {
            handle.abort();
        }
        info!(period = ?period, "Starting periodic poll");
        self.periodic = Some(self.fetcher.every(period, |f| {
            f.system_stats();
            f.latest();
        }));
    }

    /// Start polling the live sensor. No-op if already running.
    pub fn start_live(&mut self, period: Duration) {
        if self.live_running() {
            return;
        }
        info!(period = ?period, "Starting live sensor poll");
        self.live = Some(self.fetcher.every(period, Fetcher::live));
    }

    /// Stop polling the live sensor. No-op if not running.
    pub fn stop_live(&mut self) {
        if let Some(handle) = self.live.take() {
            info!("Stopping live sensor poll");
            handle.abort();
        }
    }

    pub fn live_running(&self) -> bool {
        self.live.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Issue one latest-readings request outside the timer.
    pub fn fetch_latest(&self) {
        self.fetcher.latest();
    }

    pub fn fetch_live(&self) {
        self.fetcher.live();
    }

    pub fn fetch_system_stats(&self) {
        self.fetcher.system_stats();
    }

    /// Issue the history and stats requests for a historical sensor.
    pub fn fetch_sensor_detail(&self, sensor_id: SensorId) {
        self.fetcher.history(sensor_id);
        self.fetcher.stats(sensor_id);
    }

    pub fn run_admin(&self, action: AdminAction) {
        self.fetcher.admin(action);
    }

    /// Abort all timers.
    pub fn shutdown(&mut self) {
        self.stop_live();
        if let Some(handle) = self.periodic.take() {
            handle.abort();
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.shutdown();
    }
}
