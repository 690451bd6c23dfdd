//! warehouse: headless demo of the fleet traffic workspace.
//!
//! A 6 × 4 warehouse grid.  The fleet runs on its own thread at `tick_hz`
//! while this thread plays the operator: it brings robots online at the
//! docks, sends idle ones to random shelves, now and then cancels a task,
//! and polls the published snapshot.
//!
//! ```text
//! cargo run -p warehouse                    # built-in settings
//! cargo run -p warehouse -- fleet.json      # FleetConfig as JSON
//! RUST_LOG=debug cargo run -p warehouse
//! ```

mod network;

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use fleet_core::{AgentStatus, FleetConfig, FleetRng, VertexId};
use fleet_graph::NavGraph;
use fleet_output::{CsvWriter, FleetOutputObserver};
use fleet_sim::{FleetBuilder, FleetError, FleetRuntime};

use network::build_network;

// ── Constants ─────────────────────────────────────────────────────────────────

const ROBOT_COUNT:     usize    = 8;
const DRIVE_FOR:       Duration = Duration::from_secs(12);
const POLL_EVERY:      Duration = Duration::from_millis(250);
const ASSIGN_CHANCE:   f64      = 0.6;
const CANCEL_CHANCE:   f64      = 0.02;
const OUTPUT_DIR:      &str     = "output/warehouse";

// ── Setup ─────────────────────────────────────────────────────────────────────

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,fleet_sim=debug"));
    tracing_subscriber::fmt().compact().with_env_filter(filter).init();
}

/// Settings from the JSON file named on the command line, or demo defaults.
/// Fields missing from the file take the library defaults.
fn load_config() -> Result<FleetConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(FleetConfig {
            agent_speed:             0.8,
            tick_hz:                 20,
            snapshot_interval_ticks: 20,
            ..FleetConfig::default()
        });
    };
    let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let config: FleetConfig = serde_json::from_str(&text).with_context(|| format!("parsing {path}"))?;
    info!(%path, "loaded config");
    Ok(config)
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    init_tracing();
    let config = load_config()?;
    config.validate()?;

    println!("=== warehouse: fleet traffic demo ===");
    println!(
        "Robots: {ROBOT_COUNT}  |  tick_hz: {}  |  speed: {} edge/s  |  lease: {} s",
        config.tick_hz, config.agent_speed, config.lease_duration
    );

    // 1. Floor plan.
    let (network, docks, sites) = build_network()?;
    println!("Network: {} vertices, {} lanes", network.vertex_count(), network.edge_count());

    // 2. Fleet, runtime, output.
    let mut rng = FleetRng::new(config.seed);
    let fleet = FleetBuilder::new(network).config(config).build()?;
    let writer = CsvWriter::new(Path::new(OUTPUT_DIR))?;
    let (runtime, handle) = FleetRuntime::new(fleet);
    let sim_thread = runtime.spawn(FleetOutputObserver::new(writer));

    // 3. Operator loop.
    let started = Instant::now();
    let mut assigned = 0usize;
    let mut blocked_on_assign = 0usize;
    let mut cancelled = 0usize;

    while started.elapsed() < DRIVE_FOR {
        let snapshot = handle.snapshot();

        if snapshot.len() < ROBOT_COUNT {
            let dock = docks[snapshot.len() % docks.len()];
            if handle.agents_at(dock)?.is_empty() {
                let id = handle.spawn(dock)?;
                info!(agent = %id, vertex = %dock, "robot online");
            }
        }

        for agent in snapshot.iter() {
            match agent.status {
                s if s.is_assignable() && rng.gen_bool(ASSIGN_CHANCE) => {
                    let Some(target) = rng.choose_other(&sites, agent.current_vertex) else {
                        continue;
                    };
                    match handle.assign(agent.id, target) {
                        Ok(()) => assigned += 1,
                        Err(FleetError::Blocked { holder, .. }) => {
                            blocked_on_assign += 1;
                            info!(agent = %agent.id, %holder, "waiting for clearance");
                        }
                        // The snapshot may be one tick stale.
                        Err(FleetError::NotAssignable { .. }) => {}
                        Err(e) => warn!(agent = %agent.id, error = %e, "assign failed"),
                    }
                }
                AgentStatus::Moving if rng.gen_bool(CANCEL_CHANCE) => {
                    if handle.cancel(agent.id).is_ok() {
                        cancelled += 1;
                    }
                }
                _ => {}
            }
        }

        info!(
            tick = snapshot.tick,
            moving = snapshot.count(AgentStatus::Moving),
            blocked = snapshot.count(AgentStatus::Blocked),
            done = snapshot.count(AgentStatus::TaskComplete),
            "poll"
        );
        thread::sleep(POLL_EVERY);
    }

    // 4. Shut down.
    handle.stop();
    let (fleet, mut observer) = sim_thread
        .join()
        .map_err(|_| anyhow::anyhow!("simulation thread panicked"))?;
    if let Some(e) = observer.take_error() {
        eprintln!("output error: {e}");
    }

    // 5. Summary.
    println!();
    println!("Ran {} ticks in {:.1} s", fleet.tick_count(), started.elapsed().as_secs_f64());
    println!("  assignments granted : {assigned}");
    println!("  assignments blocked : {blocked_on_assign}");
    println!("  tasks cancelled     : {cancelled}");
    println!("  output              : {OUTPUT_DIR}/agent_snapshots.csv, tick_summaries.csv");
    println!();

    println!("{:<10} {:<14} {:<12} {:<12} {:<10}", "Robot", "Status", "At", "Target", "Blocked by");
    println!("{}", "-".repeat(62));
    let name = |v: VertexId| {
        fleet
            .graph()
            .vertex(v)
            .and_then(|vx| vx.name())
            .map_or_else(|| v.to_string(), str::to_owned)
    };
    for a in fleet.snapshot().iter() {
        println!(
            "{:<10} {:<14} {:<12} {:<12} {:<10}",
            a.id.to_string(),
            a.status.as_str(),
            name(a.current_vertex),
            a.target_vertex.map_or_else(|| "-".to_owned(), &name),
            a.blocked_by.map_or_else(|| "-".to_owned(), |h| h.to_string()),
        );
    }

    Ok(())
}
