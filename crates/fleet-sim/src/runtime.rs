//! `FleetRuntime`, the single writer, and `FleetHandle`, its cloneable
//! front door.
//!
//! # Threading model
//!
//! ```text
//!  interactive thread(s)                    simulation thread
//!  ─────────────────────                    ─────────────────
//!  FleetHandle::assign ──▶ mpsc queue ──▶  drain commands
//!        ▲                                  tick(now)
//!        └──── per-command reply ◀──────── publish Arc<FleetSnapshot>
//!  FleetHandle::snapshot ◀── RwLock<Arc<FleetSnapshot>> ◀──┘
//! ```
//!
//! The orchestrator never leaves the simulation thread, so no live reference
//! crosses the driver boundary.  Readers clone an `Arc` under a read lock
//! that is held only for the clone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::{Arc, PoisonError, RwLock};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use fleet_core::{AgentId, SimClock, SimTime, VertexId};
use fleet_graph::NavGraph;

use crate::command::Pending;
use crate::{FleetCommand, FleetError, FleetObserver, FleetOrchestrator, FleetResult, FleetSnapshot, TickReport};

type SharedSnapshot = Arc<RwLock<Arc<FleetSnapshot>>>;

/// Default bound on how long a handle waits for a command's reply.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(1);

// ── FleetRuntime ──────────────────────────────────────────────────────────────

/// Owns a [`FleetOrchestrator`] and ticks it at `config.tick_hz` on
/// whichever thread calls [`run`](Self::run).
pub struct FleetRuntime<G: NavGraph> {
    fleet:    FleetOrchestrator<G>,
    commands: Receiver<FleetCommand>,
    snapshot: SharedSnapshot,
    stop:     Arc<AtomicBool>,
    clock:    SimClock,
}

impl<G: NavGraph> FleetRuntime<G> {
    /// Wrap `fleet` and return the runtime plus a handle to it.  The clock
    /// starts now.
    pub fn new(fleet: FleetOrchestrator<G>) -> (Self, FleetHandle) {
        let (tx, rx) = mpsc::channel();
        let snapshot = Arc::new(RwLock::new(Arc::new(fleet.snapshot())));
        let stop = Arc::new(AtomicBool::new(false));

        let handle = FleetHandle {
            commands:      tx,
            snapshot:      Arc::clone(&snapshot),
            stop:          Arc::clone(&stop),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        };
        let runtime = Self { fleet, commands: rx, snapshot, stop, clock: SimClock::start() };
        (runtime, handle)
    }

    /// Replace the clock, e.g. to share one origin with other components.
    pub fn with_clock(mut self, clock: SimClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn fleet(&self) -> &FleetOrchestrator<G> {
        &self.fleet
    }

    /// One iteration: apply queued commands, tick, publish the snapshot.
    pub fn step<O: FleetObserver>(&mut self, observer: &mut O) -> TickReport {
        let now = self.clock.now();
        self.drain_commands(now);
        let report = self.fleet.step(now, observer);
        self.publish();
        report
    }

    /// Tick until the stop flag is raised or every handle is dropped, then
    /// call `on_sim_end` and hand the orchestrator back.
    pub fn run<O: FleetObserver>(mut self, observer: &mut O) -> FleetOrchestrator<G> {
        let period = self.fleet.config().tick_period();
        info!(tick_hz = self.fleet.config().tick_hz, agents = self.fleet.agents().len(), "runtime started");

        while !self.stop.load(Ordering::Acquire) {
            let started = Instant::now();
            self.step(observer);
            let elapsed = started.elapsed();
            if elapsed < period {
                thread::sleep(period - elapsed);
            }
        }

        observer.on_sim_end(self.fleet.tick_count());
        info!(ticks = self.fleet.tick_count(), "runtime stopped");
        self.fleet
    }

    /// Run on a dedicated thread.  Joining yields the orchestrator and the
    /// observer.
    pub fn spawn<O>(self, mut observer: O) -> JoinHandle<(FleetOrchestrator<G>, O)>
    where
        G: 'static,
        O: FleetObserver + Send + 'static,
    {
        thread::spawn(move || {
            let fleet = self.run(&mut observer);
            (fleet, observer)
        })
    }

    fn drain_commands(&mut self, now: SimTime) {
        loop {
            match self.commands.try_recv() {
                Ok(cmd) => {
                    debug!(command = cmd.name(), "applying");
                    cmd.apply(&mut self.fleet, now);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    // No handle left: nobody can command or stop us.
                    self.stop.store(true, Ordering::Release);
                    break;
                }
            }
        }
    }

    fn publish(&self) {
        let fresh = Arc::new(self.fleet.snapshot());
        let mut slot = self.snapshot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = fresh;
    }
}

// ── FleetHandle ───────────────────────────────────────────────────────────────

/// Cloneable, `Send` front door to a running [`FleetRuntime`].
///
/// Commands block the caller until the runtime has applied them (at most one
/// tick period under normal load) and never longer than the reply timeout.
#[derive(Clone)]
pub struct FleetHandle {
    commands:      Sender<FleetCommand>,
    snapshot:      SharedSnapshot,
    stop:          Arc<AtomicBool>,
    reply_timeout: Duration,
}

impl FleetHandle {
    pub fn with_reply_timeout(mut self, timeout: Duration) -> Self {
        self.reply_timeout = timeout;
        self
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    /// Most recently published snapshot.  Never blocks on the tick.
    pub fn snapshot(&self) -> Arc<FleetSnapshot> {
        let slot = self.snapshot.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*slot)
    }

    // ── Commands ──────────────────────────────────────────────────────────

    pub fn spawn(&self, vertex: VertexId) -> FleetResult<AgentId> {
        self.send_spawn(vertex)?.wait(self.reply_timeout)
    }

    pub fn assign(&self, agent: AgentId, target: VertexId) -> FleetResult<()> {
        self.send_assign(agent, target)?.wait(self.reply_timeout)
    }

    pub fn cancel(&self, agent: AgentId) -> FleetResult<()> {
        self.send(|reply| FleetCommand::Cancel { agent, reply })?.wait(self.reply_timeout)
    }

    pub fn waiting(&self, vertex: VertexId) -> FleetResult<Vec<AgentId>> {
        self.send(|reply| FleetCommand::Waiting { vertex, reply })?.wait(self.reply_timeout)
    }

    pub fn agents_at(&self, vertex: VertexId) -> FleetResult<Vec<AgentId>> {
        self.send(|reply| FleetCommand::AgentsAt { vertex, reply })?.wait(self.reply_timeout)
    }

    /// Queue a spawn without waiting for the answer.
    pub fn send_spawn(&self, vertex: VertexId) -> FleetResult<Pending<AgentId>> {
        self.send(|reply| FleetCommand::Spawn { vertex, reply })
    }

    /// Queue an assignment without waiting for the answer.
    pub fn send_assign(&self, agent: AgentId, target: VertexId) -> FleetResult<Pending<()>> {
        self.send(|reply| FleetCommand::Assign { agent, target, reply })
    }

    fn send<T>(&self, make: impl FnOnce(Sender<FleetResult<T>>) -> FleetCommand) -> FleetResult<Pending<T>> {
        if self.is_stopped() {
            return Err(FleetError::RuntimeStopped);
        }
        let (tx, rx) = mpsc::channel();
        self.commands.send(make(tx)).map_err(|_| FleetError::RuntimeStopped)?;
        Ok(Pending::new(rx))
    }

    // ── Lifecycle ─────────────────────────────────────────────────────────

    /// Ask the runtime to stop after the current tick.
    pub fn stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}
