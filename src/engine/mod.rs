//! The sampling engine: runs rounds and turns raw counters into rates.

pub mod aggregator;
pub mod coordinator;
pub mod governor;
