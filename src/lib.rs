//! Line sorting in Rust
//!
//! The core turns a sequence of lines plus a [`SortConfig`] into an ordered
//! sequence: keys are extracted per line ([`key`]), compared under one of
//! several typed modes ([`compare`]), and the collection is sorted, shuffled
//! and optionally deduplicated ([`order`]). The [`input`] and [`output`]
//! modules are the plumbing the `sort` binary wraps around it.

#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]

pub mod error;
pub mod config;

// Ordering core
pub mod key;
pub mod compare;
pub mod order;

// I/O plumbing
pub mod input;
pub mod output;

// Re-export commonly used types
pub use error::{SortError, SortResult};
pub use config::{Delimiter, KeyMode, SortConfig, SortConfigBuilder};
pub use order::{order, order_with_rng, LineSorter};

use input::{collect_lines, Cancellation, InputSource, SourceFailure};
use output::{write_lines, Destination};

/// Exit codes matching GNU sort
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;
pub const SORT_FAILURE: i32 = 2;

/// What a complete run did
#[derive(Debug, Default)]
pub struct RunReport {
    pub lines_read: usize,
    pub lines_written: usize,
    pub failures: Vec<SourceFailure>,
}

impl RunReport {
    /// Unreadable sources make the run fail even though output was produced.
    pub fn exit_code(&self) -> i32 {
        if self.failures.is_empty() {
            EXIT_SUCCESS
        } else {
            SORT_FAILURE
        }
    }
}

/// Read `sources`, order the lines under `config` and write them to
/// `destination`. The destination is opened only after sorting, so it may
/// name one of the inputs.
pub fn run(
    config: &SortConfig,
    sources: &[InputSource],
    destination: &Destination,
    cancel: &dyn Cancellation,
) -> SortResult<RunReport> {
    let sorter = LineSorter::new(config.clone())?;

    let collected = collect_lines(sources, cancel)?;
    let lines_read = collected.lines.len();

    let sorted = sorter.sort(collected.lines);
    let lines_written = sorted.len();

    let writer = destination.open()?;
    write_lines(writer, &sorted, cancel)?;

    Ok(RunReport {
        lines_read,
        lines_written,
        failures: collected.failures,
    })
}
