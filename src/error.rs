//! Error types surfaced by the draw pipeline.
//!
//! Most failure modes are recovered where they occur: a drawable whose
//! asset did not resolve degrades to a 1x1 placeholder, an invalid target
//! width skips one frame's rebuild, an empty animation table makes the
//! tick a no-op. Only structural mesh overflow escalates to the caller,
//! because a truncated mesh would break the batch/submesh correspondence.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DrawError {
    /// The flattened mesh would reach or exceed the 16-bit index ceiling.
    /// No arrays are published for the failing compile.
    #[error("document needs {count} vertices, above the {limit}-vertex mesh ceiling")]
    VertexOverflow { count: usize, limit: usize },
}
