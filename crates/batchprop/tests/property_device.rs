use std::sync::Arc;

use anyhow::Result;
use batchprop::property::{Layout, Property, SourceInfo};
use batchprop::{
    BatchShape, DType, DeviceBackend, DeviceBatch, DeviceWorkspace, HostBatch, HostSample,
    SampleBatch, SampleMeta, Shape, TensorLayout,
};
use batchprop_backend_ref_device::{RefDeviceBackend, RefStream};

// Disambiguates the `Property` impl: `SourceInfo`/`Layout` implement
// `Property<W>` for every workspace type, and the compiler cannot infer `W`
// from the batch argument alone (it will not reverse `W::Batch` to `W`).
type Ws = DeviceWorkspace<RefDeviceBackend>;

fn sample_with_meta(source_info: &str, layout: &str) -> HostSample {
    let meta = SampleMeta::new(source_info, TensorLayout::new(layout));
    HostSample::zeroed(Shape::new(vec![4]), DType::U8).with_meta(meta)
}

fn upload(backend: &Arc<RefDeviceBackend>) -> Result<(DeviceBatch<RefDeviceBackend>, RefStream)> {
    let host = HostBatch::from_samples(vec![
        sample_with_meta("a.jpg", "HWC"),
        sample_with_meta("dataset/img_002.png", "HWC"),
    ]);
    let stream = backend.create_stream()?;
    let batch = DeviceBatch::from_host(Arc::clone(backend), &host, &stream)?;
    Ok((batch, stream))
}

#[test]
fn device_shape_matches_host_shape() -> Result<()> {
    let backend = Arc::new(RefDeviceBackend::new());
    let (batch, _stream) = upload(&backend)?;
    let shape = Property::<Ws>::shape(&SourceInfo, &batch)?;
    assert_eq!(shape.extent(0), &[5]);
    assert_eq!(shape.extent(1), &[19]);
    Ok(())
}

#[test]
fn device_fill_round_trips_source_info() -> Result<()> {
    let backend = Arc::new(RefDeviceBackend::new());
    let (batch, stream) = upload(&backend)?;
    let batch = Arc::new(batch);

    let shape = Property::<Ws>::shape(&SourceInfo, batch.as_ref())?;
    let dtype = Property::<Ws>::output_dtype(&SourceInfo, batch.as_ref());
    let output = DeviceBatch::zeroed(Arc::clone(&backend), shape, dtype)?;

    let mut ws = DeviceWorkspace::new(Arc::clone(&batch), output, stream.clone())?;
    SourceInfo.fill_output(&mut ws)?;

    let readback = ws.into_output().to_host(&stream)?;
    assert_eq!(readback.sample(0).data(), b"a.jpg");
    assert_eq!(readback.sample(1).data(), b"dataset/img_002.png");
    Ok(())
}

#[test]
fn device_fill_round_trips_layout() -> Result<()> {
    let backend = Arc::new(RefDeviceBackend::new());
    let (batch, stream) = upload(&backend)?;
    let batch = Arc::new(batch);

    let shape = Property::<Ws>::shape(&Layout, batch.as_ref())?;
    assert_eq!(shape, BatchShape::uniform(2, &[3]));
    let output = DeviceBatch::zeroed(Arc::clone(&backend), shape, DType::U8)?;

    let mut ws = DeviceWorkspace::new(Arc::clone(&batch), output, stream.clone())?;
    Layout.fill_output(&mut ws)?;

    let readback = ws.into_output().to_host(&stream)?;
    for idx in 0..readback.num_samples() {
        assert_eq!(readback.sample(idx).data(), b"HWC");
    }
    Ok(())
}

#[test]
fn workspace_rejects_batches_from_different_backends() -> Result<()> {
    let backend_a = Arc::new(RefDeviceBackend::new());
    let backend_b = Arc::new(RefDeviceBackend::new());
    let (input, stream) = upload(&backend_a)?;

    let shape = Property::<Ws>::shape(&SourceInfo, &input)?;
    let output = DeviceBatch::zeroed(Arc::clone(&backend_b), shape, DType::U8)?;

    assert!(DeviceWorkspace::new(Arc::new(input), output, stream).is_err());
    Ok(())
}

#[test]
fn zero_length_property_on_device() -> Result<()> {
    let backend = Arc::new(RefDeviceBackend::new());
    let host = HostBatch::from_samples(vec![sample_with_meta("", "C")]);
    let stream = backend.create_stream()?;
    let batch = Arc::new(DeviceBatch::from_host(Arc::clone(&backend), &host, &stream)?);

    let shape = Property::<Ws>::shape(&SourceInfo, batch.as_ref())?;
    assert_eq!(shape.extent(0), &[0]);
    let output = DeviceBatch::zeroed(Arc::clone(&backend), shape, DType::U8)?;

    let mut ws = DeviceWorkspace::new(Arc::clone(&batch), output, stream.clone())?;
    SourceInfo.fill_output(&mut ws)?;

    let readback = ws.into_output().to_host(&stream)?;
    assert!(readback.sample(0).data().is_empty());
    Ok(())
}

#[test]
fn device_metadata_survives_upload_and_readback() -> Result<()> {
    let backend = Arc::new(RefDeviceBackend::new());
    let (batch, stream) = upload(&backend)?;
    assert_eq!(batch.meta(0).source_info(), "a.jpg");
    assert_eq!(batch.meta(1).layout().as_str(), "HWC");

    let readback = batch.to_host(&stream)?;
    assert_eq!(readback.meta(0).source_info(), "a.jpg");
    assert_eq!(readback.meta(1).source_info(), "dataset/img_002.png");
    Ok(())
}
