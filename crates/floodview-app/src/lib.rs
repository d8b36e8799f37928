//! floodview headless viewer.
//!
//! This crate wires the terrain provider and the flood renderer together
//! behind a render loop thread driven by viewer commands.

pub mod control;
pub mod render_loop;
pub mod state;

pub use floodview_core as core;
