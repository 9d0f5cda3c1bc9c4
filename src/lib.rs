//! Sensor graph library
//!
//! Reconciles simulated and real home-automation sensor readings into
//! ready-to-plot series. Exposes modules for integration testing and
//! binary reuse.

pub mod domain;
pub mod infra;
pub mod io;
pub mod services;
