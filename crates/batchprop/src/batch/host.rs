//! Host-resident batch of individually owned sample buffers.

use anyhow::{bail, Result};

use super::SampleBatch;
use crate::tensor::{BatchShape, DType, SampleMeta, Shape};

/// One host sample: an owned byte buffer plus its shape, dtype, and metadata.
#[derive(Debug, Clone)]
pub struct HostSample {
    shape: Shape,
    dtype: DType,
    data: Vec<u8>,
    meta: SampleMeta,
}

impl HostSample {
    /// Constructs a sample from raw bytes, validating the length against the
    /// shape and dtype.
    pub fn from_bytes(shape: Shape, dtype: DType, data: Vec<u8>) -> Result<Self> {
        let expected = shape.num_elements() * dtype.size_in_bytes();
        if data.len() != expected {
            bail!(
                "sample data length ({}) does not match shape {:?} with dtype {:?} ({} bytes)",
                data.len(),
                shape.dims(),
                dtype,
                expected
            );
        }
        Ok(HostSample {
            shape,
            dtype,
            data,
            meta: SampleMeta::default(),
        })
    }

    /// Returns a zero-initialised sample of the requested shape and dtype.
    pub fn zeroed(shape: Shape, dtype: DType) -> Self {
        let len = shape.num_elements() * dtype.size_in_bytes();
        HostSample {
            shape,
            dtype,
            data: vec![0; len],
            meta: SampleMeta::default(),
        }
    }

    /// Attaches metadata, consuming and returning the sample.
    pub fn with_meta(mut self, meta: SampleMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Provides access to the sample shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Returns the scalar dtype of the sample payload.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Borrows the raw sample payload.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutably borrows the raw sample payload.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Borrows the sample metadata.
    pub fn meta(&self) -> &SampleMeta {
        &self.meta
    }

    /// Mutably borrows the sample metadata (batch producers only).
    pub fn meta_mut(&mut self) -> &mut SampleMeta {
        &mut self.meta
    }
}

/// Host-side batch: N samples, each owning its buffer independently.
#[derive(Debug, Clone, Default)]
pub struct HostBatch {
    samples: Vec<HostSample>,
}

impl HostBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        HostBatch::default()
    }

    /// Wraps existing samples into a batch.
    pub fn from_samples(samples: Vec<HostSample>) -> Self {
        HostBatch { samples }
    }

    /// Allocates a zero-filled batch matching a previously computed
    /// descriptor.
    ///
    /// This is the output-allocation step of the shape-then-fill protocol:
    /// the descriptor comes from a reader's `shape`, the dtype from its
    /// `output_dtype`.
    pub fn zeroed(shape: &BatchShape, dtype: DType) -> Self {
        let samples = (0..shape.num_samples())
            .map(|idx| HostSample::zeroed(Shape::new(shape.extent(idx).to_vec()), dtype))
            .collect();
        HostBatch { samples }
    }

    /// Appends a sample to the batch.
    pub fn push(&mut self, sample: HostSample) {
        self.samples.push(sample);
    }

    /// Borrows sample `idx`.
    pub fn sample(&self, idx: usize) -> &HostSample {
        &self.samples[idx]
    }

    /// Mutably borrows sample `idx`.
    pub fn sample_mut(&mut self, idx: usize) -> &mut HostSample {
        &mut self.samples[idx]
    }

    /// Iterates over the samples in order.
    pub fn samples(&self) -> impl Iterator<Item = &HostSample> {
        self.samples.iter()
    }
}

impl SampleBatch for HostBatch {
    fn num_samples(&self) -> usize {
        self.samples.len()
    }

    fn meta(&self, idx: usize) -> &SampleMeta {
        self.samples[idx].meta()
    }
}
