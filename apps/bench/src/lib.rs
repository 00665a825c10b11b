//! Latency benchmark for the two-phase interview analysis pipeline.

pub mod client;
pub mod fixtures;
pub mod pipeline;
pub mod report;
pub mod stats;
