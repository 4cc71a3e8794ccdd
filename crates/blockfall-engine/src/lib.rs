//! Falling-block puzzle engine.
//!
//! [`core`] holds the grid, the piece catalog and the placement rules;
//! [`engine`] builds the game on top of them. Rendering, input capture and
//! persistence are left to the host.

pub use self::{core::*, engine::*};

pub mod core;
pub mod engine;

#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("piece placement rejected")]
pub struct PlacementError;
