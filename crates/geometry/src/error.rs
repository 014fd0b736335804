//! Error types for parameter normalization, generation and mesh handling.

use shared::ComponentCategory;
use thiserror::Error;

/// Malformed component parameters.
///
/// Never fatal on its own: the normalizer recovers by substituting defaults.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The raw mapping could not be deserialized into the schema
    #[error("Malformed parameters: {message}")]
    Malformed { message: String },

    /// A field holds a value outside its allowed range
    #[error("Invalid {field}: {value} ({expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// A text field is empty
    #[error("Field {field} must not be empty")]
    Empty { field: &'static str },
}

impl ValidationError {
    pub fn out_of_range(field: &'static str, value: f64, expected: &'static str) -> Self {
        Self::OutOfRange {
            field,
            value,
            expected,
        }
    }
}

/// A generator cannot build a mesh for the given parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerationError {
    /// An effective dimension is zero, negative or not finite
    #[error("Cannot generate {category}: {field} = {value} must be finite and positive")]
    InvalidDimension {
        category: ComponentCategory,
        field: &'static str,
        value: f64,
    },

    /// The produced surface was rejected by the mesh constructor
    #[error("Cannot generate {category}: {source}")]
    Mesh {
        category: ComponentCategory,
        #[source]
        source: MeshError,
    },

    /// No generator is registered for the category
    #[error("No generator registered for {0}")]
    Unregistered(ComponentCategory),
}

/// Structural problems with mesh data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// A face references a vertex that does not exist
    #[error("Face {face} references vertex {index} (vertex count {vertex_count})")]
    IndexOutOfRange {
        face: usize,
        index: u32,
        vertex_count: usize,
    },

    /// A flat array length is not a multiple of 3
    #[error("{array} length {len} is not a multiple of 3")]
    BadStride { array: &'static str, len: usize },

    /// Combined vertex count does not fit 32-bit face indices
    #[error("{count} vertices exceed the 32-bit index range")]
    TooManyVertices { count: usize },

    /// Normals array does not match the vertex array
    #[error("Normal count {normals} does not match vertex count {vertices}")]
    NormalCountMismatch { normals: usize, vertices: usize },

    /// Not enough independent points for a solid
    #[error("Degenerate geometry: {message}")]
    Degenerate { message: String },

    /// The transport form failed validation
    #[error("Invalid geometry: {}", problems.join("; "))]
    Invalid { problems: Vec<String> },
}

impl MeshError {
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::Degenerate {
            message: message.into(),
        }
    }
}
