//! Side-effecting operations: file loads, the drone subprocess, sinks.

pub mod config;
pub mod db_config;
pub mod drone;
pub mod fw_spec;
pub mod process;
pub mod sink;
