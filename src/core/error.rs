//! Error types for scene construction

use thiserror::Error;

/// Main error type for the crate.
///
/// Tree operations on a constructed scene never fail: removal of an absent
/// object is a no-op, oversized objects trigger root growth, and degenerate
/// bounding boxes are skipped rather than rejected. Errors only arise from
/// invalid configuration at construction time.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid world bounds: {0}")]
    InvalidWorldBounds(String),

    #[error("max depth must be at least 1, got {0}")]
    InvalidDepth(u8),

    #[error("looseness must be a non-negative finite factor, got {0}")]
    InvalidLooseness(f32),
}
