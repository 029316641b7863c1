//! # Rendering Module
//!
//! Text renderings of generated levels for terminals and logs.

pub mod ascii;

pub use ascii::*;
