//! Platform implementations of the ports
//!
//! - `headless`: manual frame stepping and recording outputs, for native runs and tests
//! - `web`: requestAnimationFrame scheduling and DOM text (wasm32 only)

pub mod headless;

#[cfg(target_arch = "wasm32")]
pub mod web;
