//! Integration tests for fleet-sim.

use std::time::{Duration, Instant};

use fleet_core::{AgentId, AgentStatus, FleetConfig, FleetRng, Point, SimTime, VertexId};
use fleet_graph::{NavNetwork, NavNetworkBuilder, Vertex};

use crate::{
    FleetBuilder, FleetError, FleetObserver, FleetOrchestrator, FleetRuntime, FleetSnapshot,
    NoopObserver, TickReport,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

const A: AgentId = AgentId(1);
const B: AgentId = AgentId(2);

fn v(id: u32) -> VertexId {
    VertexId(id)
}

/// Fast robots so that a whole scenario fits well inside one lease.
fn test_config() -> FleetConfig {
    FleetConfig {
        agent_speed:             2.0,
        max_step:                0.1,
        lease_duration:          5.0,
        retry_interval:          1.0,
        snapshot_interval_ticks: 0,
        ..FleetConfig::default()
    }
}

/// Vertices `first..=last` on the x axis, joined by two-way lanes, plus an
/// unreachable vertex 99.
fn line_network(first: u32, last: u32) -> NavNetwork {
    let mut b = NavNetworkBuilder::new();
    for i in first..=last {
        b.insert_vertex(v(i), Vertex::at(Point::new(i as f64, 0.0))).unwrap();
    }
    for i in first..last {
        b.add_lane(v(i), v(i + 1));
    }
    b.insert_vertex(v(99), Vertex::at(Point::new(50.0, 50.0))).unwrap();
    b.build().unwrap()
}

/// Line 1–2–3 with A on 1 and B on 2.
fn line_fleet(config: FleetConfig) -> FleetOrchestrator<NavNetwork> {
    FleetBuilder::new(line_network(1, 3))
        .config(config)
        .spawn_at(v(1))
        .spawn_at(v(2))
        .build()
        .unwrap()
}

/// Drives `fleet` in fixed steps of 0.1 and remembers the time.
struct Driver {
    now: SimTime,
}

impl Driver {
    fn new() -> Self {
        Self { now: SimTime::ZERO }
    }

    fn tick(&mut self, fleet: &mut FleetOrchestrator<NavNetwork>) -> TickReport {
        self.now = self.now + 0.1;
        fleet.tick(self.now)
    }
}

fn status(fleet: &FleetOrchestrator<NavNetwork>, id: AgentId) -> AgentStatus {
    fleet.agent(id).unwrap().status()
}

/// Agent-level invariants that must hold between ticks.
fn assert_agent_invariants(fleet: &FleetOrchestrator<NavNetwork>) {
    for a in fleet.agents() {
        assert_eq!(
            a.status() == AgentStatus::Moving,
            !a.path().is_empty(),
            "{}: path non-empty iff moving",
            a.id()
        );
        if a.is_moving() {
            assert!(a.path_cursor() < a.path().len());
        }
        assert_eq!(
            a.status().has_target(),
            a.target_vertex().is_some(),
            "{}: target set iff moving/blocked/waiting",
            a.id()
        );
    }
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder_tests {
    use super::*;

    #[test]
    fn spawns_in_call_order() {
        let fleet = line_fleet(test_config());
        assert_eq!(fleet.agents().len(), 2);
        assert_eq!(fleet.agent(A).unwrap().current_vertex(), v(1));
        assert_eq!(fleet.agent(B).unwrap().current_vertex(), v(2));
        assert_eq!(fleet.agent(B).unwrap().position(), Point::new(2.0, 0.0));
    }

    #[test]
    fn invalid_config_rejected() {
        let bad = FleetConfig { lease_duration: 0.0, ..FleetConfig::default() };
        let result = FleetBuilder::new(line_network(1, 3)).config(bad).build();
        assert!(matches!(result, Err(FleetError::Config(_))));
    }

    #[test]
    fn unknown_spawn_vertex_rejected() {
        let result = FleetBuilder::new(line_network(1, 3)).spawn_at(v(7)).build();
        assert!(matches!(result, Err(FleetError::UnknownVertex(x)) if x == v(7)));
    }
}

// ── Spawn / assign ────────────────────────────────────────────────────────────

#[cfg(test)]
mod assign_tests {
    use super::*;

    #[test]
    fn spawn_ids_count_up_from_one() {
        let mut fleet = FleetBuilder::new(line_network(1, 3)).build().unwrap();
        assert_eq!(fleet.spawn(v(1)).unwrap(), AgentId(1));
        assert_eq!(fleet.spawn(v(3)).unwrap(), AgentId(2));
        assert_eq!(status(&fleet, AgentId(2)), AgentStatus::Idle);
    }

    #[test]
    fn spawn_on_unknown_vertex_fails() {
        let mut fleet = FleetBuilder::new(line_network(1, 3)).build().unwrap();
        assert!(matches!(fleet.spawn(v(42)), Err(FleetError::UnknownVertex(_))));
        assert!(fleet.agents().is_empty());
    }

    #[test]
    fn granted_assignment_starts_moving_along_shortest_path() {
        let mut fleet = line_fleet(test_config());
        fleet.assign(A, v(3), SimTime::ZERO).unwrap();
        let a = fleet.agent(A).unwrap();
        assert_eq!(a.status(), AgentStatus::Moving);
        assert_eq!(a.path(), &[v(1), v(2), v(3)]);
        assert_eq!(a.target_vertex(), Some(v(3)));
        assert_eq!(fleet.traffic().vertex_holder(v(2), SimTime::ZERO), Some(A));
    }

    #[test]
    fn unknown_agent_and_vertex() {
        let mut fleet = line_fleet(test_config());
        assert!(matches!(
            fleet.assign(AgentId(9), v(1), SimTime::ZERO),
            Err(FleetError::UnknownAgent(x)) if x == AgentId(9)
        ));
        assert!(matches!(
            fleet.assign(A, v(42), SimTime::ZERO),
            Err(FleetError::UnknownVertex(_))
        ));
        assert_eq!(status(&fleet, A), AgentStatus::Idle);
    }

    #[test]
    fn unreachable_target_fails_without_state_change() {
        let mut fleet = line_fleet(test_config());
        let err = fleet.assign(A, v(99), SimTime::ZERO).unwrap_err();
        assert!(matches!(err, FleetError::NoPath { from, to } if from == v(1) && to == v(99)));
        let a = fleet.agent(A).unwrap();
        assert_eq!(a.status(), AgentStatus::Idle);
        assert_eq!(a.target_vertex(), None);
        assert_eq!(fleet.traffic().live_lease_count(SimTime::ZERO), 0);
    }

    #[test]
    fn moving_agent_is_not_assignable() {
        let mut fleet = line_fleet(test_config());
        fleet.assign(A, v(3), SimTime::ZERO).unwrap();
        let err = fleet.assign(A, v(2), SimTime::ZERO).unwrap_err();
        assert!(matches!(
            err,
            FleetError::NotAssignable { agent, status: AgentStatus::Moving } if agent == A
        ));
        assert_eq!(fleet.agent(A).unwrap().target_vertex(), Some(v(3)));
    }

    #[test]
    fn assign_to_own_vertex_completes_next_tick() {
        let mut fleet = line_fleet(test_config());
        let mut d = Driver::new();
        fleet.assign(A, v(1), SimTime::ZERO).unwrap();
        let report = d.tick(&mut fleet);
        assert_eq!(report.completed, 1);
        assert_eq!(status(&fleet, A), AgentStatus::TaskComplete);
    }

    #[test]
    fn completed_agent_accepts_new_task() {
        let mut fleet = line_fleet(test_config());
        let mut d = Driver::new();
        fleet.assign(A, v(1), SimTime::ZERO).unwrap();
        d.tick(&mut fleet);
        assert_eq!(status(&fleet, A), AgentStatus::TaskComplete);
        fleet.assign(B, v(3), d.now).unwrap();
        for _ in 0..30 {
            d.tick(&mut fleet);
        }
        fleet.assign(A, v(2), d.now).unwrap();
        assert_eq!(status(&fleet, A), AgentStatus::Moving);
    }
}

// ── Traffic scenarios ─────────────────────────────────────────────────────────

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn contested_vertex_blocks_second_agent() {
        let mut fleet = line_fleet(test_config());
        let mut d = Driver::new();
        d.tick(&mut fleet);

        fleet.assign(A, v(3), d.now).unwrap();
        assert_eq!(fleet.agent(A).unwrap().path(), &[v(1), v(2), v(3)]);

        // A is now mid-edge 1 → 2.
        d.tick(&mut fleet);
        let a = fleet.agent(A).unwrap();
        assert_eq!(a.current_vertex(), v(1));
        assert!(a.edge_progress() > 0.0 && a.edge_progress() < 1.0);

        let err = fleet.assign(B, v(1), d.now).unwrap_err();
        assert!(matches!(err, FleetError::Blocked { agent, holder } if agent == B && holder == A));

        let b = fleet.agent(B).unwrap();
        assert_eq!(b.status(), AgentStatus::Blocked);
        assert_eq!(b.blocked_by(), Some(A));
        assert_eq!(b.target_vertex(), Some(v(1)));
        assert_eq!(fleet.waiting(v(2)), vec![B]);
    }

    #[test]
    fn blocked_agent_granted_when_holder_releases() {
        // Periodic retry effectively off: only the release path can unblock B.
        let config = FleetConfig { retry_interval: 1_000.0, ..test_config() };
        let mut fleet = line_fleet(config);
        let mut d = Driver::new();
        d.tick(&mut fleet);

        fleet.assign(A, v(3), d.now).unwrap();
        d.tick(&mut fleet);
        assert!(fleet.assign(B, v(1), d.now).is_err());

        let mut a_was_on_2 = false;
        let mut granted_report = None;
        for _ in 0..100 {
            a_was_on_2 |= fleet.agent(A).unwrap().current_vertex() == v(2);
            let report = d.tick(&mut fleet);
            assert_agent_invariants(&fleet);
            if status(&fleet, B) == AgentStatus::Moving {
                granted_report = Some(report);
                break;
            }
        }

        let report = granted_report.expect("B was never granted");
        assert!(a_was_on_2, "B granted before A reached vertex 2");
        assert_eq!(fleet.agent(A).unwrap().current_vertex(), v(3));
        assert_eq!(report.crossed, 1);
        assert_eq!(report.regranted, 1);
        let b = fleet.agent(B).unwrap();
        assert_eq!(b.blocked_by(), None);
        assert_eq!(b.path(), &[v(2), v(1)]);
    }

    #[test]
    fn blocked_agent_retried_periodically() {
        let mut fleet = line_fleet(test_config());
        let mut d = Driver::new();
        d.tick(&mut fleet);
        fleet.assign(A, v(3), d.now).unwrap();
        d.tick(&mut fleet);
        assert!(fleet.assign(B, v(1), d.now).is_err());

        // First periodic retry happens on the very next tick.
        let report = d.tick(&mut fleet);
        assert_eq!(report.retries, 1);
        assert_eq!(report.regranted, 0);
        let first_retry = fleet.agent(B).unwrap().last_retry_time().unwrap();

        // And not again until retry_interval has elapsed.
        let report = d.tick(&mut fleet);
        assert_eq!(report.retries, 0);
        assert_eq!(fleet.agent(B).unwrap().last_retry_time(), Some(first_retry));
    }

    #[test]
    fn both_agents_finish() {
        let mut fleet = line_fleet(test_config());
        let mut d = Driver::new();
        d.tick(&mut fleet);
        fleet.assign(A, v(3), d.now).unwrap();
        d.tick(&mut fleet);
        let _ = fleet.assign(B, v(1), d.now);

        for _ in 0..200 {
            d.tick(&mut fleet);
        }
        assert_eq!(status(&fleet, A), AgentStatus::TaskComplete);
        assert_eq!(status(&fleet, B), AgentStatus::TaskComplete);
        assert_eq!(fleet.agent(A).unwrap().position(), Point::new(3.0, 0.0));
        assert_eq!(fleet.agent(B).unwrap().position(), Point::new(1.0, 0.0));
    }

    #[test]
    fn movement_terminates_in_bounded_ticks() {
        // speed × max_step = 0.2 → 5 ticks per edge, +1 completing tick.
        for last in 2u32..7 {
            let mut fleet = FleetBuilder::new(line_network(1, last))
                .config(test_config())
                .spawn_at(v(1))
                .build()
                .unwrap();
            let mut d = Driver::new();
            d.tick(&mut fleet);
            fleet.assign(A, v(last), d.now).unwrap();

            let edges = (last - 1) as usize;
            let mut ticks = 0;
            while status(&fleet, A) == AgentStatus::Moving {
                d.tick(&mut fleet);
                ticks += 1;
                assert!(ticks <= 6 * edges + 2, "did not finish {edges} edges in time");
            }
            let a = fleet.agent(A).unwrap();
            assert_eq!(a.status(), AgentStatus::TaskComplete);
            assert_eq!(a.position(), Point::new(last as f64, 0.0));
            assert_eq!(a.current_vertex(), v(last));
        }
    }
}

// ── Cancel ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod cancel_tests {
    use super::*;

    #[test]
    fn cancel_moving_goes_idle() {
        let mut fleet = line_fleet(test_config());
        fleet.assign(A, v(3), SimTime::ZERO).unwrap();
        fleet.cancel(A, SimTime::ZERO).unwrap();
        let a = fleet.agent(A).unwrap();
        assert_eq!(a.status(), AgentStatus::Idle);
        assert_eq!(a.target_vertex(), None);
        assert!(a.path().is_empty());
        assert_eq!(fleet.traffic().vertex_holder(v(1), SimTime::ZERO), None);
    }

    #[test]
    fn cancel_retries_waiters_of_released_vertex() {
        // Line 0–1–2: A holds 1 and 1→2, B's path 0→1→2 is denied at 1.
        let mut fleet = FleetBuilder::new(line_network(0, 2))
            .config(test_config())
            .spawn_at(v(1))
            .spawn_at(v(0))
            .build()
            .unwrap();
        fleet.assign(A, v(2), SimTime::ZERO).unwrap();
        assert!(matches!(fleet.assign(B, v(2), SimTime::ZERO), Err(FleetError::Blocked { .. })));
        assert_eq!(fleet.waiting(v(1)), vec![B]);

        fleet.cancel(A, SimTime(0.5)).unwrap();
        let b = fleet.agent(B).unwrap();
        assert_eq!(b.status(), AgentStatus::Moving);
        assert_eq!(b.last_retry_time(), Some(SimTime(0.5)));
        assert!(fleet.waiting(v(1)).is_empty());
    }

    #[test]
    fn cancel_blocked_is_rejected() {
        let mut fleet = line_fleet(test_config());
        fleet.assign(A, v(3), SimTime::ZERO).unwrap();
        assert!(fleet.assign(B, v(1), SimTime::ZERO).is_err());

        let err = fleet.cancel(B, SimTime::ZERO).unwrap_err();
        assert!(matches!(
            err,
            FleetError::NotCancellable { status: AgentStatus::Blocked, .. }
        ));
        assert_eq!(status(&fleet, B), AgentStatus::Blocked);
        assert_eq!(fleet.agent(B).unwrap().target_vertex(), Some(v(1)));
    }

    #[test]
    fn cancel_idle_or_unknown_is_rejected() {
        let mut fleet = line_fleet(test_config());
        assert!(matches!(
            fleet.cancel(A, SimTime::ZERO),
            Err(FleetError::NotCancellable { status: AgentStatus::Idle, .. })
        ));
        assert!(matches!(
            fleet.cancel(AgentId(5), SimTime::ZERO),
            Err(FleetError::UnknownAgent(_))
        ));
    }
}

// ── Tick mechanics ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tick_tests {
    use super::*;

    #[test]
    fn first_tick_moves_nothing() {
        let mut fleet = line_fleet(test_config());
        fleet.assign(A, v(3), SimTime::ZERO).unwrap();
        let report = fleet.tick(SimTime(5.0));
        assert_eq!(report.delta, 0.0);
        assert_eq!(report.tick, 1);
        assert_eq!(fleet.agent(A).unwrap().edge_progress(), 0.0);
    }

    #[test]
    fn delta_is_clamped() {
        let mut fleet = line_fleet(test_config());
        fleet.tick(SimTime(0.0));
        assert_eq!(fleet.tick(SimTime(10.0)).delta, 0.1);
        assert_eq!(fleet.tick(SimTime(9.0)).delta, 0.0);
        assert_eq!(fleet.tick(SimTime(9.05)).delta, 9.05 - 9.0);
    }

    #[test]
    fn report_counts() {
        let mut fleet = line_fleet(test_config());
        let mut d = Driver::new();
        d.tick(&mut fleet);
        fleet.assign(A, v(3), d.now).unwrap();
        let report = d.tick(&mut fleet);
        assert_eq!(report.advanced, 1);
        assert_eq!(report.moving, 1);
        assert_eq!(report.blocked, 0);
        assert_eq!(report.crossed + report.completed, 0);
    }

    #[test]
    fn random_workload_keeps_invariants() {
        let mut b = NavNetworkBuilder::new();
        let mut grid = Vec::new();
        for y in 0..4 {
            for x in 0..4 {
                grid.push(b.add_vertex(Point::new(x as f64, y as f64)));
            }
        }
        for y in 0..4 {
            for x in 0..4 {
                let i = y * 4 + x;
                if x < 3 {
                    b.add_lane(grid[i], grid[i + 1]);
                }
                if y < 3 {
                    b.add_lane(grid[i], grid[i + 4]);
                }
            }
        }
        let mut fleet = FleetBuilder::new(b.build().unwrap())
            .config(FleetConfig { agent_speed: 1.0, ..test_config() })
            .build()
            .unwrap();
        let mut rng = FleetRng::new(7);
        for i in 0..6 {
            fleet.spawn(grid[i * 2]).unwrap();
        }

        let mut d = Driver::new();
        let mut completed = 0;
        for _ in 0..2_000 {
            let report = d.tick(&mut fleet);
            completed += report.completed;
            assert_agent_invariants(&fleet);

            let ids: Vec<AgentId> = fleet.agents().iter().map(|a| a.id()).collect();
            for id in ids {
                let agent = fleet.agent(id).unwrap();
                if agent.status().is_assignable() && rng.gen_bool(0.05) {
                    if let Some(target) = rng.choose_other(&grid, agent.current_vertex()) {
                        let _ = fleet.assign(id, target, d.now);
                    }
                } else if agent.is_moving() && rng.gen_bool(0.002) {
                    fleet.cancel(id, d.now).unwrap();
                }
            }
        }
        assert!(completed > 0);
    }
}

// ── Queries & observer ────────────────────────────────────────────────────────

#[cfg(test)]
mod observer_tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        starts:    u64,
        ends:      u64,
        snapshots: Vec<FleetSnapshot>,
        finished:  Option<u64>,
    }

    impl FleetObserver for Counter {
        fn on_tick_start(&mut self, _tick: u64, _now: SimTime) {
            self.starts += 1;
        }
        fn on_tick_end(&mut self, _report: &TickReport) {
            self.ends += 1;
        }
        fn on_snapshot(&mut self, snapshot: &FleetSnapshot) {
            self.snapshots.push(snapshot.clone());
        }
        fn on_sim_end(&mut self, final_tick: u64) {
            self.finished = Some(final_tick);
        }
    }

    #[test]
    fn hooks_fire_at_expected_cadence() {
        let config = FleetConfig { snapshot_interval_ticks: 5, ..test_config() };
        let mut fleet = line_fleet(config);
        let mut obs = Counter::default();
        fleet.run_fixed(20, 0.1, &mut obs);
        assert_eq!(obs.starts, 20);
        assert_eq!(obs.ends, 20);
        assert_eq!(obs.snapshots.len(), 4);
        assert_eq!(obs.snapshots[0].tick, 5);
        assert_eq!(obs.finished, Some(20));
    }

    #[test]
    fn snapshot_is_an_owned_copy() {
        let mut fleet = line_fleet(test_config());
        fleet.assign(A, v(3), SimTime::ZERO).unwrap();
        let snap = fleet.snapshot();
        fleet.cancel(A, SimTime::ZERO).unwrap();

        assert_eq!(snap.len(), 2);
        assert_eq!(snap.agent(A).unwrap().status, AgentStatus::Moving);
        assert_eq!(snap.agent(A).unwrap().target_vertex, Some(v(3)));
        assert_eq!(snap.count(AgentStatus::Idle), 1);
        assert!(snap.agent(AgentId(3)).is_none());
        assert_eq!(fleet.snapshot().agent(A).unwrap().status, AgentStatus::Idle);
    }

    #[test]
    fn agents_at_vertex() {
        let mut fleet = line_fleet(test_config());
        fleet.spawn(v(2)).unwrap();
        assert_eq!(fleet.agents_at(v(2)), vec![B, AgentId(3)]);
        assert_eq!(fleet.snapshot().agents_at(v(1)), vec![A]);
        assert!(fleet.agents_at(v(3)).is_empty());
    }

    #[test]
    fn noop_observer_compiles_into_run() {
        let mut fleet = line_fleet(test_config());
        fleet.run_fixed(3, 0.1, &mut NoopObserver);
        assert_eq!(fleet.tick_count(), 3);
    }
}

// ── Runtime ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod runtime_tests {
    use super::*;

    const SHORT: Duration = Duration::from_millis(50);

    #[test]
    fn queued_commands_apply_on_step() {
        let fleet = FleetBuilder::new(line_network(1, 3)).config(test_config()).build().unwrap();
        let (mut runtime, handle) = FleetRuntime::new(fleet);

        let pending = handle.send_spawn(v(1)).unwrap();
        assert!(pending.try_take().is_none());
        assert!(handle.snapshot().is_empty());

        runtime.step(&mut NoopObserver);
        assert_eq!(pending.wait(SHORT).unwrap(), A);
        assert_eq!(handle.snapshot().len(), 1);
        assert_eq!(runtime.fleet().tick_count(), 1);
    }

    #[test]
    fn errors_travel_back() {
        let fleet = line_fleet(test_config());
        let (mut runtime, handle) = FleetRuntime::new(fleet);
        let pending = handle.send_assign(A, v(99)).unwrap();
        runtime.step(&mut NoopObserver);
        assert!(matches!(pending.wait(SHORT), Err(FleetError::NoPath { .. })));
    }

    #[test]
    fn unanswered_command_times_out() {
        let fleet = line_fleet(test_config());
        let (_runtime, handle) = FleetRuntime::new(fleet);
        let pending = handle.send_spawn(v(1)).unwrap();
        assert!(matches!(pending.wait(SHORT), Err(FleetError::ReplyTimeout(_))));
    }

    #[test]
    fn threaded_runtime_moves_agents() {
        let config = FleetConfig { tick_hz: 100, ..test_config() };
        let fleet = FleetBuilder::new(line_network(1, 3)).config(config).build().unwrap();
        let (runtime, handle) = FleetRuntime::new(fleet);
        let join = runtime.spawn(NoopObserver);

        let id = handle.spawn(v(1)).unwrap();
        handle.assign(id, v(3)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let snap = handle.snapshot();
            if snap.agent(id).is_some_and(|a| a.status == AgentStatus::TaskComplete) {
                break;
            }
            assert!(Instant::now() < deadline, "agent never finished");
            std::thread::sleep(Duration::from_millis(10));
        }

        handle.stop();
        let (fleet, _) = join.join().unwrap();
        assert!(fleet.tick_count() > 0);
        assert_eq!(fleet.agent(id).unwrap().current_vertex(), v(3));
        assert!(matches!(handle.spawn(v(1)), Err(FleetError::RuntimeStopped)));
    }

    #[test]
    fn dropping_every_handle_stops_runtime() {
        let fleet = line_fleet(FleetConfig { tick_hz: 100, ..test_config() });
        let (runtime, handle) = FleetRuntime::new(fleet);
        let join = runtime.spawn(NoopObserver);
        let clone = handle.clone();
        drop(handle);
        drop(clone);
        let (fleet, _) = join.join().unwrap();
        assert_eq!(fleet.agents().len(), 2);
    }
}
