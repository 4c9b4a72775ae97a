//! Execution contexts handed to property readers for the fill phase.

use std::sync::Arc;

use anyhow::{ensure, Result};

use crate::backend::DeviceBackend;
use crate::batch::{DeviceBatch, HostBatch, SampleBatch};

/// Bundles the batches one fill operates on; implemented per execution space.
///
/// The workspace owns the pre-allocated output across the shape-then-fill
/// protocol; the input stays shared and read-only.
pub trait PropertyWorkspace {
    type Batch: SampleBatch;

    /// The input batch the property is derived from.
    fn input(&self) -> &Self::Batch;
}

/// Synchronous host execution context.
pub struct HostWorkspace {
    input: Arc<HostBatch>,
    output: HostBatch,
}

impl HostWorkspace {
    /// Pairs a shared input batch with pre-allocated output storage.
    pub fn new(input: Arc<HostBatch>, output: HostBatch) -> Self {
        HostWorkspace { input, output }
    }

    /// Shared handle to the input batch; cheap to clone, always read-only.
    pub fn input_handle(&self) -> Arc<HostBatch> {
        Arc::clone(&self.input)
    }

    /// Borrows the output batch.
    pub fn output(&self) -> &HostBatch {
        &self.output
    }

    /// Mutably borrows the output batch for the fill.
    pub fn output_mut(&mut self) -> &mut HostBatch {
        &mut self.output
    }

    /// Hands the filled output onward once the fill has returned.
    pub fn into_output(self) -> HostBatch {
        self.output
    }
}

impl PropertyWorkspace for HostWorkspace {
    type Batch = HostBatch;

    fn input(&self) -> &HostBatch {
        &self.input
    }
}

/// Stream-ordered device execution context.
///
/// Fills enqueue their copies on the workspace stream and return without
/// waiting; consumers of the output must synchronize that stream first.
pub struct DeviceWorkspace<B: DeviceBackend> {
    input: Arc<DeviceBatch<B>>,
    output: DeviceBatch<B>,
    stream: B::Stream,
}

impl<B: DeviceBackend> DeviceWorkspace<B> {
    /// Pairs device batches with the stream the fill will run on.
    ///
    /// Fails when the input and output come from different backend
    /// instances; the stream is assumed to be created by that same backend.
    pub fn new(
        input: Arc<DeviceBatch<B>>,
        output: DeviceBatch<B>,
        stream: B::Stream,
    ) -> Result<Self> {
        let input_backend = input.backend();
        let output_backend = output.backend();
        ensure!(
            Arc::ptr_eq(&input_backend, &output_backend),
            "workspace batches come from different {} backend instances",
            input_backend.backend_name()
        );
        Ok(DeviceWorkspace {
            input,
            output,
            stream,
        })
    }

    /// Shared handle to the input batch; cheap to clone, always read-only.
    pub fn input_handle(&self) -> Arc<DeviceBatch<B>> {
        Arc::clone(&self.input)
    }

    /// The stream all fill work is enqueued on.
    pub fn stream(&self) -> &B::Stream {
        &self.stream
    }

    /// Borrows the output batch.
    pub fn output(&self) -> &DeviceBatch<B> {
        &self.output
    }

    /// Mutably borrows the output batch for the fill.
    pub fn output_mut(&mut self) -> &mut DeviceBatch<B> {
        &mut self.output
    }

    /// Returns the filled output; completion ordering on the stream stays
    /// with the caller.
    pub fn into_output(self) -> DeviceBatch<B> {
        self.output
    }
}

impl<B: DeviceBackend> PropertyWorkspace for DeviceWorkspace<B> {
    type Batch = DeviceBatch<B>;

    fn input(&self) -> &DeviceBatch<B> {
        &self.input
    }
}
