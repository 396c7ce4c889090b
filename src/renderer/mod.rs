//! WebGPU rendering module
//!
//! Circles are drawn as signed distance fields in the fragment shader.

pub mod circle_pipeline;
pub mod scene;

pub use circle_pipeline::CircleRenderState;
pub use scene::FrameScene;
