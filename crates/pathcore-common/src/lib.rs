//! Common utilities and data structures used by the pathcore navigation crates

mod geometry;
mod math;

pub use geometry::*;
pub use math::*;

/// Represents a 2D position or velocity
pub type Vec2 = glam::Vec2;

/// Error types for the library
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("unknown agent id {0}")]
    UnknownAgent(usize),

    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),
}

/// Result type for pathcore operations
pub type Result<T> = std::result::Result<T, Error>;
