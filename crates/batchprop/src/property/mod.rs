//! Deriving per-sample metadata properties as new output batches.
//!
//! A property reader answers three questions about a batch: the shape of the
//! derived output, its element type, and how to fill pre-allocated storage
//! with the derived bytes. Shape and type are answered before any output
//! memory exists; the fill runs strictly afterwards against matching storage.

mod common;
mod layout;
mod source_info;

pub use layout::Layout;
pub use source_info::SourceInfo;

use std::str::FromStr;

use anyhow::Result;
use thiserror::Error;

use crate::backend::DeviceBackend;
use crate::tensor::{BatchShape, DType};
use crate::workspace::{DeviceWorkspace, HostWorkspace, PropertyWorkspace};

/// A per-sample property derived from batch metadata.
///
/// Readers are stateless: `shape` and `output_dtype` are pure functions of
/// the input batch, and `output_dtype` does not depend on batch content at
/// all. `fill_output` writes, for every sample, exactly the bytes whose count
/// `shape` reported — on the host as in-line copies, on a device as work
/// enqueued on the workspace stream without waiting for completion.
pub trait Property<W: PropertyWorkspace> {
    /// Shape of the derived output, one entry per input sample.
    ///
    /// Computed from metadata alone; never allocates output storage, never
    /// mutates the input. Fails only when the batch violates the reader's
    /// preconditions.
    fn shape(&self, input: &W::Batch) -> Result<BatchShape>;

    /// Element type of the derived output.
    fn output_dtype(&self, input: &W::Batch) -> DType;

    /// Writes each sample's derived bytes into the pre-allocated output.
    fn fill_output(&self, ws: &mut W) -> Result<()>;
}

/// Reader key that was not recognised.
#[derive(Debug, Error)]
#[error("unknown property key `{0}`; expected `source_info` or `layout`")]
pub struct UnknownPropertyKey(String);

/// Closed set of reader keys understood by the extraction stage.
///
/// Which key a pipeline stage asks for is decided upstream; this type only
/// maps the decision onto a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropertyKind {
    SourceInfo,
    Layout,
}

impl PropertyKind {
    /// Boxed reader operating on host batches.
    pub fn host_reader(self) -> Box<dyn Property<HostWorkspace>> {
        match self {
            PropertyKind::SourceInfo => Box::new(SourceInfo),
            PropertyKind::Layout => Box::new(Layout),
        }
    }

    /// Boxed reader operating on device batches of backend `B`.
    pub fn device_reader<B: DeviceBackend>(self) -> Box<dyn Property<DeviceWorkspace<B>>> {
        match self {
            PropertyKind::SourceInfo => Box::new(SourceInfo),
            PropertyKind::Layout => Box::new(Layout),
        }
    }
}

impl FromStr for PropertyKind {
    type Err = UnknownPropertyKey;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        match key {
            "source_info" => Ok(PropertyKind::SourceInfo),
            "layout" => Ok(PropertyKind::Layout),
            other => Err(UnknownPropertyKey(other.to_string())),
        }
    }
}
