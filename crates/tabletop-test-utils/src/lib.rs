//! Shared test fixtures for the tabletop crates.
//!
//! Provides a scripted in-memory [`Simulator`](tabletop_sim::Simulator)
//! implementation that every crate's test suite can drive.

pub mod mock;

pub use mock::MockSimulator;
