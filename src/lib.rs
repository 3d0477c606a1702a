//! Skill half-life dashboard core: dataset loading, filtering, aggregation
//! and chart descriptors, plus the UI state the egui front-end drives.

pub mod color;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod export;
pub mod state;
