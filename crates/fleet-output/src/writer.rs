//! The `OutputWriter` trait.

use crate::{AgentSnapshotRow, OutputResult, TickSummaryRow};

/// A sink for fleet output rows.
///
/// The observer never fails a tick: errors are kept and surfaced through
/// [`FleetOutputObserver::take_error`][crate::FleetOutputObserver::take_error].
pub trait OutputWriter {
    /// Write every row of one snapshot.
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    /// Flush and close.  Calling it twice is harmless.
    fn finish(&mut self) -> OutputResult<()>;
}
