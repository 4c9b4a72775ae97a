//! Core value types shared by batch containers and property readers.
//!
//! The tensor module defines portable shapes, dtypes, layout descriptors, and
//! the per-sample metadata record the property readers derive their outputs
//! from.

pub mod dtype;
pub mod layout;
pub mod meta;
pub mod shape;

pub use dtype::DType;
pub use layout::TensorLayout;
pub use meta::SampleMeta;
pub use shape::{BatchShape, Shape};
