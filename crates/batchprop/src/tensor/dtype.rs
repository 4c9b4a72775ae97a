//! Enumerates the scalar element types carried by batch samples.

use serde::{Deserialize, Serialize};

/// Logical dtype identifier shared between host and device batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DType {
    /// Unsigned 8-bit byte; also the element type of every extracted property.
    U8,
    /// 32-bit signed integer, primarily for index and label buffers.
    I32,
    /// 32-bit floating point following IEEE-754 semantics.
    F32,
}

impl DType {
    /// Returns the number of bytes required per scalar element.
    pub fn size_in_bytes(self) -> usize {
        match self {
            DType::U8 => 1,
            DType::I32 | DType::F32 => 4,
        }
    }

    /// Produces a stable tag used when serializing or crossing FFI boundaries.
    pub fn tag(self) -> u32 {
        match self {
            DType::U8 => 0,
            DType::I32 => 1,
            DType::F32 => 2,
        }
    }

    /// Reconstructs a `DType` from its serialized tag representation.
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(DType::U8),
            1 => Some(DType::I32),
            2 => Some(DType::F32),
            _ => None,
        }
    }
}
