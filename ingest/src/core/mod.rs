//! Deterministic, pure logic for result ingestion.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod document;
pub mod env_chk;
pub mod locator;
