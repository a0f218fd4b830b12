//! Array dimensions of registers, register files, fields, and blocks.

use serde::{Deserialize, Serialize};

/// One array dimension.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Dimension {
    /// Number of elements (expression).
    pub value: String,
    /// Name of the index variable (Std22).
    pub index_var: String,
}

impl Dimension {
    pub fn new(value: impl Into<String>) -> Self {
        Dimension {
            value: value.into(),
            index_var: String::new(),
        }
    }
}

/// Replication of an item as a (possibly multidimensional) array.
///
/// Std14 documents carry only the `dim` list; Std22 adds a stride, written
/// as `stride` for registers and blocks and `bitStride` for fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryArray {
    /// Dimensions, outermost first.
    pub dimensions: Vec<Dimension>,
    /// Distance between consecutive elements (expression).
    pub stride: String,
}

impl MemoryArray {
    /// Array with the given dimension expressions and no stride.
    pub fn with_dimensions<I, S>(dimensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MemoryArray {
            dimensions: dimensions.into_iter().map(Dimension::new).collect(),
            stride: String::new(),
        }
    }
}
