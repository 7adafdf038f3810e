//! Result ingestion for completed LAMMPS molecular-dynamics runs.
//!
//! After a run finishes, [`task::run_ingest`] locates the run's output
//! directory, delegates parsing to a drone, optionally merges a field from
//! the ambient workflow spec into the parsed document, and persists the
//! document to `task.json` or to a database client. The architecture
//! enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (locator resolution, document
//!   merge, env-check indirection). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (config/spec loads, the drone
//!   subprocess, sinks). Backends sit behind traits to enable test doubles.
//!
//! [`task`] coordinates core logic with I/O to implement the task contract.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod task;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
