//! Shared fill-phase plumbing for the concrete property readers.

use anyhow::{ensure, Result};
use log::trace;

use crate::backend::DeviceBackend;
use crate::batch::SampleBatch;
use crate::tensor::SampleMeta;
use crate::workspace::{DeviceWorkspace, HostWorkspace};

/// Copies each sample's property bytes into the host output, one synchronous
/// per-sample copy at a time.
///
/// The output must have been allocated from the reader's own descriptor; a
/// byte-budget mismatch fails the whole fill rather than truncating.
pub(crate) fn fill_host(
    ws: &mut HostWorkspace,
    what: &str,
    bytes_of: impl Fn(&SampleMeta) -> &[u8],
) -> Result<()> {
    let input = ws.input_handle();
    let output = ws.output_mut();
    ensure!(
        output.num_samples() == input.num_samples(),
        "output batch has {} samples, input has {}",
        output.num_samples(),
        input.num_samples()
    );
    for idx in 0..input.num_samples() {
        let bytes = bytes_of(input.meta(idx));
        let sample = output.sample_mut(idx);
        ensure!(
            sample.data().len() == bytes.len(),
            "output sample {} holds {} bytes but its {} needs {}",
            idx,
            sample.data().len(),
            what,
            bytes.len()
        );
        sample.data_mut().copy_from_slice(bytes);
    }
    Ok(())
}

/// Assembles every sample's property bytes into one staging buffer and
/// enqueues a single contiguous copy on the workspace stream.
///
/// Returns as soon as the copy is enqueued; completion ordering belongs to
/// the workspace owner.
pub(crate) fn fill_device<B: DeviceBackend>(
    ws: &mut DeviceWorkspace<B>,
    what: &str,
    bytes_of: impl Fn(&SampleMeta) -> &[u8],
) -> Result<()> {
    let input = ws.input_handle();
    let stream = ws.stream().clone();
    let output = ws.output_mut();
    ensure!(
        output.num_samples() == input.num_samples(),
        "output batch has {} samples, input has {}",
        output.num_samples(),
        input.num_samples()
    );
    let mut staging = Vec::with_capacity(output.total_byte_size());
    for idx in 0..input.num_samples() {
        let bytes = bytes_of(input.meta(idx));
        ensure!(
            output.sample_byte_len(idx) == bytes.len(),
            "output sample {} reserves {} bytes but its {} needs {}",
            idx,
            output.sample_byte_len(idx),
            what,
            bytes.len()
        );
        staging.extend_from_slice(bytes);
    }
    trace!(
        "enqueueing {} {} bytes for {} samples",
        staging.len(),
        what,
        input.num_samples()
    );
    output.enqueue_batch_write(&stream, &staging)
}
