use std::str::FromStr;
use std::sync::Arc;

use anyhow::Result;
use batchprop::property::{Property, PropertyKind};
use batchprop::{
    BatchShape, DType, DeviceBackend, DeviceBatch, HostBatch, HostSample, HostWorkspace,
    SampleBatch, SampleMeta, Shape, TensorLayout,
};
use batchprop_backend_ref_device::RefDeviceBackend;

#[test]
fn host_sample_validates_byte_length() {
    let ok = HostSample::from_bytes(Shape::new(vec![2, 3]), DType::U8, vec![0; 6]);
    assert!(ok.is_ok());

    let too_short = HostSample::from_bytes(Shape::new(vec![2, 3]), DType::F32, vec![0; 6]);
    assert!(too_short.is_err());
}

#[test]
fn batch_shape_uniform_and_jagged() {
    let uniform = BatchShape::uniform(3, &[3]);
    assert_eq!(uniform.num_samples(), 3);
    assert_eq!(uniform.sample_dim(), 1);
    assert_eq!(uniform.total_elements(), 9);

    let mut jagged = BatchShape::new(2, 1);
    jagged.set_extent(0, &[5]);
    jagged.set_extent(1, &[19]);
    assert_eq!(jagged.num_elements(0), 5);
    assert_eq!(jagged.num_elements(1), 19);
    assert_eq!(jagged.total_elements(), 24);
}

#[test]
fn batch_shape_rejects_mixed_ranks() {
    let extents: Vec<&[usize]> = vec![&[2, 2], &[4]];
    assert!(BatchShape::from_samples(extents).is_err());
}

#[test]
fn zeroed_host_batch_matches_descriptor() {
    let mut shape = BatchShape::new(2, 1);
    shape.set_extent(0, &[5]);
    shape.set_extent(1, &[0]);
    let batch = HostBatch::zeroed(&shape, DType::U8);
    assert_eq!(batch.num_samples(), 2);
    assert_eq!(batch.sample(0).data().len(), 5);
    assert!(batch.sample(1).data().is_empty());
}

#[test]
fn device_batch_packs_samples_contiguously() -> Result<()> {
    let backend = Arc::new(RefDeviceBackend::new());
    let mut shape = BatchShape::new(3, 1);
    shape.set_extent(0, &[4]);
    shape.set_extent(1, &[0]);
    shape.set_extent(2, &[2]);
    let batch = DeviceBatch::zeroed(Arc::clone(&backend), shape, DType::U8)?;

    assert_eq!(batch.sample_offset(0), 0);
    assert_eq!(batch.sample_offset(1), 4);
    assert_eq!(batch.sample_offset(2), 4);
    assert_eq!(batch.sample_byte_len(1), 0);
    assert_eq!(batch.total_byte_size(), 6);
    Ok(())
}

#[test]
fn device_upload_readback_round_trip() -> Result<()> {
    let backend = Arc::new(RefDeviceBackend::new());
    let stream = backend.create_stream()?;

    let mut host = HostBatch::new();
    let sample = HostSample::from_bytes(Shape::new(vec![3]), DType::U8, vec![7, 8, 9])?
        .with_meta(SampleMeta::new("x.bin", TensorLayout::new("W")));
    host.push(sample);

    let device = DeviceBatch::from_host(Arc::clone(&backend), &host, &stream)?;
    let readback = device.to_host(&stream)?;

    assert_eq!(readback.num_samples(), 1);
    assert_eq!(readback.sample(0).data(), &[7, 8, 9]);
    assert_eq!(readback.meta(0), host.meta(0));
    Ok(())
}

#[test]
fn device_batch_rejects_mixed_dtypes() -> Result<()> {
    let backend = Arc::new(RefDeviceBackend::new());
    let stream = backend.create_stream()?;

    let mut host = HostBatch::new();
    host.push(HostSample::zeroed(Shape::new(vec![2]), DType::U8));
    host.push(HostSample::zeroed(Shape::new(vec![2]), DType::F32));

    assert!(DeviceBatch::from_host(backend, &host, &stream).is_err());
    Ok(())
}

#[test]
fn property_kind_parses_known_keys() {
    assert_eq!(
        PropertyKind::from_str("source_info").unwrap(),
        PropertyKind::SourceInfo
    );
    assert_eq!(PropertyKind::from_str("layout").unwrap(), PropertyKind::Layout);
    assert!(PropertyKind::from_str("checksum").is_err());
}

#[test]
fn boxed_reader_runs_the_two_phase_protocol() -> Result<()> {
    let reader = PropertyKind::SourceInfo.host_reader();

    let meta = SampleMeta::new("a.jpg", TensorLayout::new("HWC"));
    let batch = Arc::new(HostBatch::from_samples(vec![
        HostSample::zeroed(Shape::new(vec![1]), DType::U8).with_meta(meta),
    ]));

    let shape = reader.shape(batch.as_ref())?;
    let output = HostBatch::zeroed(&shape, reader.output_dtype(batch.as_ref()));
    let mut ws = HostWorkspace::new(Arc::clone(&batch), output);
    reader.fill_output(&mut ws)?;

    assert_eq!(ws.output().sample(0).data(), b"a.jpg");
    Ok(())
}
