//! Services - classification and reconciliation
//!
//! This module contains the core business logic services:
//! - `classifier` - Resolves a sensor's category from tags, registries and state
//! - `reconciler` - Builds simulated and real series on a shared reference day

pub mod classifier;
pub mod reconciler;

// Re-export commonly used types
pub use classifier::SensorTypeClassifier;
pub use reconciler::DualSeriesReconciler;
