//! The two batch container representations and their shared lookup surface.
//!
//! Host batches own one buffer per sample; device batches pack every sample
//! into a single backend allocation. Property readers depend only on
//! [`SampleBatch`], which both representations answer identically.

mod device;
mod host;

pub use device::DeviceBatch;
pub use host::{HostBatch, HostSample};

use crate::tensor::SampleMeta;

/// Capability surface shared by the two batch representations.
///
/// Readers rely on the sample count and the per-sample metadata lookup and on
/// nothing else, which keeps them agnostic to where payloads actually live.
pub trait SampleBatch {
    /// Number of samples in the batch.
    fn num_samples(&self) -> usize;

    /// Metadata of sample `idx`.
    ///
    /// Panics when `idx` is out of range; callers iterate `0..num_samples()`.
    fn meta(&self, idx: usize) -> &SampleMeta;
}
