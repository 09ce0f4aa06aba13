//! # Rendering Module
//!
//! Thin macroquad shell that draws the core's per-frame snapshot.

pub mod display;

pub use display::*;
