//! Scene loading and event input for the contour command-line renderer.

pub mod events;
pub mod scene;

pub use scene::{GridSource, OutputConfig, Scene};
