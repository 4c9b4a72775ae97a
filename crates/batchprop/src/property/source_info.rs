//! Provenance reader: the origin string recorded for each sample.

use anyhow::Result;

use super::{common, Property};
use crate::backend::DeviceBackend;
use crate::batch::{DeviceBatch, HostBatch, SampleBatch};
use crate::tensor::{BatchShape, DType};
use crate::workspace::{DeviceWorkspace, HostWorkspace};

/// Emits each sample's provenance string as a 1-D byte sample.
///
/// Provenance lengths differ per sample, so the output is jagged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceInfo;

fn source_info_shape(input: &impl SampleBatch) -> BatchShape {
    let mut shape = BatchShape::new(input.num_samples(), 1);
    for idx in 0..input.num_samples() {
        shape.set_extent(idx, &[input.meta(idx).source_info().len()]);
    }
    shape
}

impl Property<HostWorkspace> for SourceInfo {
    fn shape(&self, input: &HostBatch) -> Result<BatchShape> {
        Ok(source_info_shape(input))
    }

    fn output_dtype(&self, _input: &HostBatch) -> DType {
        DType::U8
    }

    fn fill_output(&self, ws: &mut HostWorkspace) -> Result<()> {
        common::fill_host(ws, "provenance", |meta| meta.source_info().as_bytes())
    }
}

impl<B: DeviceBackend> Property<DeviceWorkspace<B>> for SourceInfo {
    fn shape(&self, input: &DeviceBatch<B>) -> Result<BatchShape> {
        Ok(source_info_shape(input))
    }

    fn output_dtype(&self, _input: &DeviceBatch<B>) -> DType {
        DType::U8
    }

    fn fill_output(&self, ws: &mut DeviceWorkspace<B>) -> Result<()> {
        common::fill_device(ws, "provenance", |meta| meta.source_info().as_bytes())
    }
}
