//! Core types and definitions for floodview.
//!
//! This crate defines the vocabulary shared across all other crates:
//! geographic positions, terrain samples, render decisions, viewer commands,
//! frame snapshots, constants, and the error taxonomy.
//! It has no dependency on any provider or renderer.

pub mod commands;
pub mod constants;
pub mod error;
pub mod state;
pub mod types;
pub mod units;

pub use error::{FloodError, FloodResult};
pub use types::{CameraView, GeoPosition, RenderDecision, TerrainSample};

#[cfg(test)]
mod tests;
