//! # Utilities Module
//!
//! Small numeric helpers shared by the generation stages.

pub mod math;

pub use math::*;
