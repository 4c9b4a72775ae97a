//! Layout reader: the axis-label descriptor recorded for each sample.

use anyhow::{ensure, Result};

use super::{common, Property};
use crate::backend::DeviceBackend;
use crate::batch::{DeviceBatch, HostBatch, SampleBatch};
use crate::tensor::{BatchShape, DType};
use crate::workspace::{DeviceWorkspace, HostWorkspace};

/// Emits each sample's dimension-layout labels as a 1-D byte sample.
///
/// Samples within one batch share their dimensionality, so the output extent
/// of sample 0 covers the whole batch. Batches that break that assumption are
/// caught during the fill, where each sample's actual label count is checked
/// against the reserved extent.
#[derive(Debug, Clone, Copy, Default)]
pub struct Layout;

fn layout_shape(input: &impl SampleBatch) -> Result<BatchShape> {
    ensure!(
        input.num_samples() > 0,
        "layout property requires a non-empty batch"
    );
    let ndim = input.meta(0).layout().ndim();
    Ok(BatchShape::uniform(input.num_samples(), &[ndim]))
}

impl Property<HostWorkspace> for Layout {
    fn shape(&self, input: &HostBatch) -> Result<BatchShape> {
        layout_shape(input)
    }

    fn output_dtype(&self, _input: &HostBatch) -> DType {
        DType::U8
    }

    fn fill_output(&self, ws: &mut HostWorkspace) -> Result<()> {
        common::fill_host(ws, "layout", |meta| meta.layout().as_bytes())
    }
}

impl<B: DeviceBackend> Property<DeviceWorkspace<B>> for Layout {
    fn shape(&self, input: &DeviceBatch<B>) -> Result<BatchShape> {
        layout_shape(input)
    }

    fn output_dtype(&self, _input: &DeviceBatch<B>) -> DType {
        DType::U8
    }

    fn fill_output(&self, ws: &mut DeviceWorkspace<B>) -> Result<()> {
        common::fill_device(ws, "layout", |meta| meta.layout().as_bytes())
    }
}
