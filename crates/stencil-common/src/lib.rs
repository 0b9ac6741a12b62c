//! Shared types used by every stage of the Stencil pipeline.

pub mod error;
pub mod path;
pub mod span;
pub mod token;
