//! `FleetOutputObserver<W>` bridges `FleetObserver` to an `OutputWriter`.

use fleet_sim::{FleetObserver, FleetSnapshot, TickReport};

use crate::row::{AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`FleetObserver`] that writes every tick summary and every periodic
/// snapshot to `W`.
///
/// Observer hooks return nothing, so writer errors are stored.  Check
/// [`take_error`](Self::take_error) once the run is over.
pub struct FleetOutputObserver<W: OutputWriter> {
    writer:     W,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> FleetOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, last_error: None }
    }

    /// The first write error, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> FleetObserver for FleetOutputObserver<W> {
    fn on_tick_end(&mut self, report: &TickReport) {
        let result = self.writer.write_tick_summary(&TickSummaryRow::from(report));
        self.store_err(result);
    }

    fn on_snapshot(&mut self, snapshot: &FleetSnapshot) {
        let sim_time = snapshot.now.map_or(0.0, |t| t.0);
        let rows: Vec<AgentSnapshotRow> = snapshot
            .iter()
            .map(|a| AgentSnapshotRow::new(snapshot.tick, sim_time, a))
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _final_tick: u64) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
