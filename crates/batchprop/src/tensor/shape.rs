//! Shape bookkeeping for single samples and whole batches.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Stores the logical dimensions of one sample's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    dims: Vec<usize>,
}

impl Shape {
    /// Constructs a new shape from the provided dimensions.
    ///
    /// Panics if `dims` is empty, ensuring every sample has at least one axis.
    pub fn new<D: Into<Vec<usize>>>(dims: D) -> Self {
        let dims = dims.into();
        assert!(!dims.is_empty(), "shape must have at least one dimension");
        Shape { dims }
    }

    /// Borrow the raw dimension slice for downstream calculations.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// Returns the rank (number of axes) of the shape.
    pub fn rank(&self) -> usize {
        self.dims.len()
    }

    /// Computes the total number of elements implied by the shape.
    pub fn num_elements(&self) -> usize {
        self.dims.iter().product()
    }
}

/// Ordered per-sample extents for a whole batch.
///
/// Every sample shares the same rank while the extents themselves may differ
/// per sample (a "jagged" batch). Extents are stored flat so the descriptor
/// stays a single allocation regardless of batch size. This is the value a
/// property reader computes before any output storage exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchShape {
    sample_dim: usize,
    extents: Vec<usize>,
}

impl BatchShape {
    /// Creates a descriptor for `num_samples` samples of rank `sample_dim`,
    /// with every extent initialised to zero.
    ///
    /// Panics if `sample_dim` is zero; every sample has at least one axis.
    pub fn new(num_samples: usize, sample_dim: usize) -> Self {
        assert!(sample_dim > 0, "batch shape must have at least one axis per sample");
        BatchShape {
            sample_dim,
            extents: vec![0; num_samples * sample_dim],
        }
    }

    /// Creates a descriptor where every sample shares the same extent.
    pub fn uniform(num_samples: usize, extent: &[usize]) -> Self {
        let mut shape = BatchShape::new(num_samples, extent.len());
        for idx in 0..num_samples {
            shape.set_extent(idx, extent);
        }
        shape
    }

    /// Builds a descriptor from per-sample extents, requiring a uniform rank.
    pub fn from_samples<'a, I>(samples: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a [usize]>,
    {
        let mut sample_dim = None;
        let mut extents = Vec::new();
        for (idx, extent) in samples.into_iter().enumerate() {
            match sample_dim {
                None => sample_dim = Some(extent.len()),
                Some(dim) if dim != extent.len() => {
                    bail!(
                        "sample {} has rank {} but the batch has rank {}",
                        idx,
                        extent.len(),
                        dim
                    );
                }
                Some(_) => {}
            }
            extents.extend_from_slice(extent);
        }
        let sample_dim = sample_dim.unwrap_or(1);
        if sample_dim == 0 {
            bail!("batch samples must have at least one axis");
        }
        Ok(BatchShape { sample_dim, extents })
    }

    /// Number of samples described by the descriptor.
    pub fn num_samples(&self) -> usize {
        self.extents.len() / self.sample_dim
    }

    /// Rank shared by every sample in the batch.
    pub fn sample_dim(&self) -> usize {
        self.sample_dim
    }

    /// Borrows the extent of sample `idx`.
    pub fn extent(&self, idx: usize) -> &[usize] {
        let start = idx * self.sample_dim;
        &self.extents[start..start + self.sample_dim]
    }

    /// Overwrites the extent of sample `idx`.
    ///
    /// Panics if `extent` does not match the descriptor's rank.
    pub fn set_extent(&mut self, idx: usize, extent: &[usize]) {
        assert_eq!(
            extent.len(),
            self.sample_dim,
            "extent rank {} does not match batch rank {}",
            extent.len(),
            self.sample_dim
        );
        let start = idx * self.sample_dim;
        self.extents[start..start + self.sample_dim].copy_from_slice(extent);
    }

    /// Number of elements in sample `idx`.
    pub fn num_elements(&self, idx: usize) -> usize {
        self.extent(idx).iter().product()
    }

    /// Total number of elements across all samples.
    pub fn total_elements(&self) -> usize {
        (0..self.num_samples()).map(|idx| self.num_elements(idx)).sum()
    }
}
