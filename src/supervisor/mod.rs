//! Connection supervisor.
//!
//! Owns exactly one chat worker at a time. A heartbeat timer replaces the
//! worker when it has died or lost its connection, and a daily timer
//! reconnects at a fixed local time. Restarts are serialized by the
//! lifecycle lock but not deduplicated: a trigger that queues behind an
//! in-flight restart performs its own full cycle afterwards.

pub mod schedule;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout, Instant};

use crate::config::SupervisorConfig;
use crate::error::Result;

pub use schedule::DailySchedule;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Live view into a running chat worker.
#[async_trait]
pub trait ConnectionProbe: Send + Sync {
    fn is_connected(&self) -> bool;

    /// Number of guilds the connection currently sees.
    fn guild_count(&self) -> usize;

    /// Ask the worker to close its connection and return.
    async fn disconnect(&self);
}

/// Wall-clock source for the daily restart and the status stamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The system's local time.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A launched chat worker.
pub struct Worker {
    pub task: JoinHandle<()>,
    pub probe: Arc<dyn ConnectionProbe>,
}

/// Launches fresh chat workers.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn launch(&self) -> Result<Worker>;
}

/// Lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Stopped,
    Starting,
    Running,
    Restarting,
    Stopping,
    Crashed,
}

/// Timing knobs.
#[derive(Debug, Clone)]
pub struct SupervisorOptions {
    pub heartbeat_interval: Duration,
    pub join_timeout: Duration,
    /// `None` disables the daily restart.
    pub daily_restart: Option<DailySchedule>,
}

impl SupervisorOptions {
    pub fn from_config(config: &SupervisorConfig) -> Result<Self> {
        Ok(Self {
            heartbeat_interval: Duration::from_secs(config.heartbeat_interval_secs),
            join_timeout: Duration::from_secs(config.join_timeout_secs),
            daily_restart: Some(DailySchedule::parse(&config.daily_restart)?),
        })
    }
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            heartbeat_interval: Duration::from_secs(30),
            join_timeout: Duration::from_secs(5),
            daily_restart: None,
        }
    }
}

/// Dashboard view of the supervisor.
#[derive(Debug, Clone, Serialize)]
pub struct StatusSnapshot {
    pub is_running: bool,
    pub state: Phase,
    pub uptime: String,
    pub last_restart: String,
    pub restart_count: u64,
    pub server_time: String,
    pub bot_guilds: usize,
}

struct Stats {
    phase: Phase,
    /// Whether the supervisor should keep a worker alive.
    running: bool,
    started: Option<Instant>,
    last_restart: Option<DateTime<Local>>,
    restart_count: u64,
    probe: Option<Arc<dyn ConnectionProbe>>,
}

#[derive(Default)]
struct Lifecycle {
    worker: Option<Worker>,
    timers: Vec<JoinHandle<()>>,
}

struct Inner {
    connector: Arc<dyn Connector>,
    clock: Arc<dyn Clock>,
    options: SupervisorOptions,
    lifecycle: Mutex<Lifecycle>,
    stats: RwLock<Stats>,
    shutdown: watch::Sender<bool>,
}

/// Handle to the connection supervisor. Cheap to clone.
#[derive(Clone)]
pub struct Supervisor {
    inner: Arc<Inner>,
}

impl Supervisor {
    pub fn new(connector: Arc<dyn Connector>, options: SupervisorOptions) -> Self {
        Self::with_clock(connector, options, Arc::new(SystemClock))
    }

    pub fn with_clock(
        connector: Arc<dyn Connector>,
        options: SupervisorOptions,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (shutdown, _) = watch::channel(true);
        Self {
            inner: Arc::new(Inner {
                connector,
                clock,
                options,
                lifecycle: Mutex::new(Lifecycle::default()),
                stats: RwLock::new(Stats {
                    phase: Phase::Stopped,
                    running: false,
                    started: None,
                    last_restart: None,
                    restart_count: 0,
                    probe: None,
                }),
                shutdown,
            }),
        }
    }

    /// Launch the worker and arm both timers. No-op when already running.
    pub async fn start(&self) -> Result<()> {
        let mut life = self.inner.lifecycle.lock().await;
        if self.inner.stats.read().await.running {
            tracing::debug!("Supervisor already running");
            return Ok(());
        }

        self.set_phase(Phase::Starting).await;
        let worker = match self.inner.connector.launch().await {
            Ok(worker) => worker,
            Err(e) => {
                self.set_phase(Phase::Stopped).await;
                return Err(e);
            }
        };
        self.install(&mut life, worker).await;
        {
            let mut stats = self.inner.stats.write().await;
            stats.running = true;
            stats.started = Some(Instant::now());
        }

        self.inner.shutdown.send_replace(false);
        let heartbeat = self.inner.shutdown.subscribe();
        let daily = self.inner.shutdown.subscribe();
        life.timers = vec![
            tokio::spawn(self.clone().heartbeat_loop(heartbeat)),
            tokio::spawn(self.clone().daily_loop(daily)),
        ];

        tracing::info!(
            "Supervisor started (heartbeat every {:?})",
            self.inner.options.heartbeat_interval
        );
        Ok(())
    }

    /// Replace the worker. Logged no-op when the supervisor is stopped.
    /// Uptime keeps counting from `start`.
    pub async fn restart(&self) -> Result<()> {
        let mut life = self.inner.lifecycle.lock().await;
        if !self.inner.stats.read().await.running {
            tracing::info!("Restart requested while stopped, ignoring");
            return Ok(());
        }
        self.restart_locked(&mut life).await
    }

    /// Stop the worker and both timers.
    pub async fn stop(&self) {
        let mut life = self.inner.lifecycle.lock().await;
        {
            let mut stats = self.inner.stats.write().await;
            if !stats.running && life.worker.is_none() {
                return;
            }
            stats.running = false;
            stats.phase = Phase::Stopping;
        }

        self.inner.shutdown.send_replace(true);
        for timer in life.timers.drain(..) {
            timer.abort();
        }
        if let Some(worker) = life.worker.take() {
            self.retire(worker).await;
        }

        let mut stats = self.inner.stats.write().await;
        stats.phase = Phase::Stopped;
        stats.started = None;
        stats.probe = None;
        tracing::info!("Supervisor stopped");
    }

    /// Running and the worker reports a live connection.
    pub async fn is_running(&self) -> bool {
        let stats = self.inner.stats.read().await;
        stats.running
            && stats
                .probe
                .as_ref()
                .map(|p| p.is_connected())
                .unwrap_or(false)
    }

    pub async fn phase(&self) -> Phase {
        self.inner.stats.read().await.phase
    }

    pub async fn uptime(&self) -> String {
        match self.inner.stats.read().await.started {
            Some(started) => format_uptime(started.elapsed()),
            None => "Not started".to_string(),
        }
    }

    pub async fn last_restart(&self) -> Option<DateTime<Local>> {
        self.inner.stats.read().await.last_restart
    }

    pub async fn restart_count(&self) -> u64 {
        self.inner.stats.read().await.restart_count
    }

    pub async fn guild_count(&self) -> usize {
        self.inner
            .stats
            .read()
            .await
            .probe
            .as_ref()
            .map(|p| p.guild_count())
            .unwrap_or(0)
    }

    pub async fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            is_running: self.is_running().await,
            state: self.phase().await,
            uptime: self.uptime().await,
            last_restart: self
                .last_restart()
                .await
                .map(|t| t.format(TIME_FORMAT).to_string())
                .unwrap_or_else(|| "Never restarted".to_string()),
            restart_count: self.restart_count().await,
            server_time: self.inner.clock.now().format(TIME_FORMAT).to_string(),
            bot_guilds: self.guild_count().await,
        }
    }

    async fn set_phase(&self, phase: Phase) {
        self.inner.stats.write().await.phase = phase;
    }

    async fn install(&self, life: &mut Lifecycle, worker: Worker) {
        let mut stats = self.inner.stats.write().await;
        stats.probe = Some(worker.probe.clone());
        stats.phase = Phase::Running;
        life.worker = Some(worker);
    }

    async fn restart_locked(&self, life: &mut Lifecycle) -> Result<()> {
        let count = {
            let mut stats = self.inner.stats.write().await;
            stats.phase = Phase::Restarting;
            stats.restart_count += 1;
            let now = self.inner.clock.now();
            stats.last_restart = Some(match stats.last_restart {
                Some(prev) if prev > now => prev,
                _ => now,
            });
            stats.restart_count
        };
        tracing::info!("Restarting chat connection (restart #{})", count);

        if let Some(worker) = life.worker.take() {
            self.retire(worker).await;
        }

        self.set_phase(Phase::Starting).await;
        match self.inner.connector.launch().await {
            Ok(worker) => {
                self.install(life, worker).await;
                tracing::info!("Chat connection restarted");
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to relaunch chat connection: {}", e);
                let mut stats = self.inner.stats.write().await;
                stats.phase = Phase::Crashed;
                stats.probe = None;
                Err(e)
            }
        }
    }

    /// Disconnect and join a worker, abandoning it after the join timeout.
    async fn retire(&self, mut worker: Worker) {
        worker.probe.disconnect().await;
        match timeout(self.inner.options.join_timeout, &mut worker.task).await {
            Ok(Ok(())) => tracing::debug!("Chat worker stopped"),
            Ok(Err(e)) => tracing::warn!("Chat worker ended abnormally: {}", e),
            Err(_) => {
                tracing::warn!(
                    "Chat worker did not stop within {:?}, abandoning it",
                    self.inner.options.join_timeout
                );
                worker.task.abort();
            }
        }
    }

    async fn check_health(&self) {
        let mut life = self.inner.lifecycle.lock().await;
        if !self.inner.stats.read().await.running {
            return;
        }

        let (alive, connected) = match &life.worker {
            Some(worker) => (!worker.task.is_finished(), worker.probe.is_connected()),
            None => (false, false),
        };
        if alive && connected {
            tracing::trace!("Heartbeat ok");
            return;
        }

        tracing::warn!(
            "Heartbeat failed (alive: {}, connected: {}), restarting",
            alive,
            connected
        );
        self.set_phase(Phase::Crashed).await;
        if let Err(e) = self.restart_locked(&mut life).await {
            tracing::error!("Heartbeat restart failed: {}", e);
        }
    }

    async fn heartbeat_loop(self, mut shutdown: watch::Receiver<bool>) {
        let interval = self.inner.options.heartbeat_interval;
        loop {
            tokio::select! {
                _ = sleep(interval) => {}
                _ = shutdown.changed() => {}
            }
            if *shutdown.borrow() {
                break;
            }
            self.check_health().await;
        }
        tracing::debug!("Heartbeat timer stopped");
    }

    async fn daily_loop(self, mut shutdown: watch::Receiver<bool>) {
        let Some(schedule) = self.inner.options.daily_restart.clone() else {
            return;
        };
        loop {
            let wait = schedule.duration_until_next(&self.inner.clock.now());
            tracing::debug!(
                "Next scheduled restart at {} (in {})",
                schedule,
                format_uptime(wait)
            );
            tokio::select! {
                _ = sleep(wait) => {}
                _ = shutdown.changed() => {}
            }
            if *shutdown.borrow() {
                break;
            }
            tracing::info!("Scheduled daily restart");
            if let Err(e) = self.restart().await {
                tracing::error!("Scheduled restart failed: {}", e);
            }
        }
        tracing::debug!("Daily restart timer stopped");
    }
}

/// Format a duration as `Xd Xh Xm Xs`.
pub fn format_uptime(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;
    let seconds = secs % 60;
    format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
}
