//! Device-resident batch sharing one contiguous allocation.

use std::fmt;
use std::sync::Arc;

use anyhow::{bail, ensure, Result};
use log::debug;

use super::{HostBatch, HostSample, SampleBatch};
use crate::backend::DeviceBackend;
use crate::tensor::{BatchShape, DType, SampleMeta, Shape};

/// Device-side batch: N samples packed back-to-back into a single backend
/// allocation, with per-sample byte offsets kept on the host.
///
/// Metadata lives host-side so lookups never touch device memory.
pub struct DeviceBatch<B: DeviceBackend> {
    backend: Arc<B>,
    storage: B::Allocation,
    offsets: Vec<usize>,
    shape: BatchShape,
    dtype: DType,
    meta: Vec<SampleMeta>,
}

impl<B: DeviceBackend> Clone for DeviceBatch<B> {
    fn clone(&self) -> Self {
        DeviceBatch {
            backend: Arc::clone(&self.backend),
            storage: self.storage.clone(),
            offsets: self.offsets.clone(),
            shape: self.shape.clone(),
            dtype: self.dtype,
            meta: self.meta.clone(),
        }
    }
}

impl<B: DeviceBackend> DeviceBatch<B> {
    /// Allocates a zero-filled batch matching a previously computed
    /// descriptor.
    ///
    /// The output-allocation step of the shape-then-fill protocol on the
    /// device path.
    pub fn zeroed(backend: Arc<B>, shape: BatchShape, dtype: DType) -> Result<Self> {
        let offsets = byte_offsets(&shape, dtype);
        let total = offsets[offsets.len() - 1];
        let storage = backend.alloc_zeroed(total)?;
        let meta = vec![SampleMeta::default(); shape.num_samples()];
        Ok(DeviceBatch {
            backend,
            storage,
            offsets,
            shape,
            dtype,
            meta,
        })
    }

    /// Uploads a host batch into one contiguous device allocation.
    ///
    /// Sample payloads are enqueued on `stream` without waiting; metadata is
    /// copied eagerly. All samples must share one dtype and rank.
    pub fn from_host(backend: Arc<B>, host: &HostBatch, stream: &B::Stream) -> Result<Self> {
        let shape = BatchShape::from_samples(host.samples().map(|s| s.shape().dims()))?;
        let mut dtype = DType::U8;
        for (idx, sample) in host.samples().enumerate() {
            if idx == 0 {
                dtype = sample.dtype();
            } else if sample.dtype() != dtype {
                bail!(
                    "sample {} has dtype {:?} but the batch has dtype {:?}",
                    idx,
                    sample.dtype(),
                    dtype
                );
            }
        }

        let mut batch = Self::zeroed(backend, shape, dtype)?;
        for (idx, sample) in host.samples().enumerate() {
            batch.enqueue_sample_write(stream, idx, sample.data())?;
            batch.meta[idx] = sample.meta().clone();
        }
        debug!(
            "uploaded {} samples ({} bytes) to {}",
            batch.num_samples(),
            batch.total_byte_size(),
            batch.backend.backend_name()
        );
        Ok(batch)
    }

    /// Reads the batch back to the host, synchronizing `stream` first.
    ///
    /// Debug and test path, mirroring the upload direction.
    pub fn to_host(&self, stream: &B::Stream) -> Result<HostBatch> {
        self.backend.synchronize(stream)?;
        let mut out = HostBatch::new();
        for idx in 0..self.num_samples() {
            let bytes =
                self.backend
                    .read_back(&self.storage, self.offsets[idx], self.sample_byte_len(idx))?;
            let shape = Shape::new(self.shape.extent(idx).to_vec());
            let sample =
                HostSample::from_bytes(shape, self.dtype, bytes)?.with_meta(self.meta[idx].clone());
            out.push(sample);
        }
        Ok(out)
    }

    /// Returns the backend instance that owns the batch storage.
    pub fn backend(&self) -> Arc<B> {
        Arc::clone(&self.backend)
    }

    /// Exposes the per-sample extents of the batch.
    pub fn shape(&self) -> &BatchShape {
        &self.shape
    }

    /// Returns the scalar dtype shared by every sample.
    pub fn dtype(&self) -> DType {
        self.dtype
    }

    /// Borrows the underlying contiguous allocation.
    pub fn storage(&self) -> &B::Allocation {
        &self.storage
    }

    /// Byte offset of sample `idx` within the shared allocation.
    pub fn sample_offset(&self, idx: usize) -> usize {
        self.offsets[idx]
    }

    /// Byte length of sample `idx`'s slot in the shared allocation.
    pub fn sample_byte_len(&self, idx: usize) -> usize {
        self.offsets[idx + 1] - self.offsets[idx]
    }

    /// Total byte size of the shared allocation.
    pub fn total_byte_size(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// Enqueues `bytes` into sample `idx`'s slot on `stream` without waiting.
    ///
    /// The payload must fill the slot exactly; partial sample writes are not
    /// part of the contract.
    pub fn enqueue_sample_write(
        &mut self,
        stream: &B::Stream,
        idx: usize,
        bytes: &[u8],
    ) -> Result<()> {
        ensure!(
            bytes.len() == self.sample_byte_len(idx),
            "sample {} slot holds {} bytes, write provides {}",
            idx,
            self.sample_byte_len(idx),
            bytes.len()
        );
        self.backend
            .enqueue_write(stream, &self.storage, self.offsets[idx], bytes)?;
        Ok(())
    }

    /// Enqueues one contiguous write covering every sample slot on `stream`
    /// without waiting.
    pub fn enqueue_batch_write(&mut self, stream: &B::Stream, bytes: &[u8]) -> Result<()> {
        ensure!(
            bytes.len() == self.total_byte_size(),
            "batch storage holds {} bytes, write provides {}",
            self.total_byte_size(),
            bytes.len()
        );
        self.backend.enqueue_write(stream, &self.storage, 0, bytes)?;
        Ok(())
    }

    /// Mutably borrows sample `idx`'s metadata (batch producers only).
    pub fn meta_mut(&mut self, idx: usize) -> &mut SampleMeta {
        &mut self.meta[idx]
    }
}

impl<B: DeviceBackend> SampleBatch for DeviceBatch<B> {
    fn num_samples(&self) -> usize {
        self.shape.num_samples()
    }

    fn meta(&self, idx: usize) -> &SampleMeta {
        &self.meta[idx]
    }
}

impl<B: DeviceBackend> fmt::Debug for DeviceBatch<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DeviceBatch")
            .field("backend", &self.backend.backend_name())
            .field("num_samples", &self.num_samples())
            .field("dtype", &self.dtype)
            .finish()
    }
}

/// Prefix-sum byte offsets for packing a batch contiguously; one extra entry
/// carries the total size.
fn byte_offsets(shape: &BatchShape, dtype: DType) -> Vec<usize> {
    let mut offsets = Vec::with_capacity(shape.num_samples() + 1);
    let mut acc = 0;
    offsets.push(0);
    for idx in 0..shape.num_samples() {
        acc += shape.num_elements(idx) * dtype.size_in_bytes();
        offsets.push(acc);
    }
    offsets
}
