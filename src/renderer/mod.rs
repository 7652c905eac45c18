//! Rendering
//!
//! The simulation is turned into `DrawCommand`s, which the WebGPU pipeline
//! rasterizes as flat-colored rectangles.

pub mod commands;
pub mod pipeline;
pub mod shapes;
pub mod vertex;

pub use commands::{DrawCommand, build_frame};
pub use pipeline::{RenderError, RenderState};
