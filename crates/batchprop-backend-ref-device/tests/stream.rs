use anyhow::Result;
use batchprop::backend::{BackendError, DeviceBackend};
use batchprop_backend_ref_device::RefDeviceBackend;

#[test]
fn writes_land_after_synchronize() -> Result<()> {
    let backend = RefDeviceBackend::new();
    let alloc = backend.alloc_zeroed(8)?;
    let stream = backend.create_stream()?;

    backend.enqueue_write(&stream, &alloc, 2, &[1, 2, 3])?;
    backend.synchronize(&stream)?;

    let bytes = backend.read_back(&alloc, 0, 8)?;
    assert_eq!(bytes, vec![0, 0, 1, 2, 3, 0, 0, 0]);
    Ok(())
}

#[test]
fn writes_on_one_stream_apply_in_order() -> Result<()> {
    let backend = RefDeviceBackend::new();
    let alloc = backend.alloc_zeroed(4)?;
    let stream = backend.create_stream()?;

    backend.enqueue_write(&stream, &alloc, 0, &[1, 1, 1, 1])?;
    backend.enqueue_write(&stream, &alloc, 1, &[9, 9])?;
    backend.synchronize(&stream)?;

    assert_eq!(backend.read_back(&alloc, 0, 4)?, vec![1, 9, 9, 1]);
    Ok(())
}

#[test]
fn out_of_range_write_is_rejected_before_enqueue() -> Result<()> {
    let backend = RefDeviceBackend::new();
    let alloc = backend.alloc_zeroed(4)?;
    let stream = backend.create_stream()?;

    let err = backend.enqueue_write(&stream, &alloc, 2, &[0; 4]).unwrap_err();
    assert!(matches!(err, BackendError::OutOfRange { .. }));

    // The rejected write never lands, even after a fence.
    backend.synchronize(&stream)?;
    assert_eq!(backend.read_back(&alloc, 0, 4)?, vec![0; 4]);
    Ok(())
}

#[test]
fn out_of_range_read_back_is_rejected() -> Result<()> {
    let backend = RefDeviceBackend::new();
    let alloc = backend.alloc_zeroed(4)?;
    assert!(matches!(
        backend.read_back(&alloc, 4, 1),
        Err(BackendError::OutOfRange { .. })
    ));
    Ok(())
}

#[test]
fn zero_length_writes_are_valid() -> Result<()> {
    let backend = RefDeviceBackend::new();
    let alloc = backend.alloc_zeroed(0)?;
    let stream = backend.create_stream()?;

    backend.enqueue_write(&stream, &alloc, 0, &[])?;
    backend.synchronize(&stream)?;
    assert!(backend.read_back(&alloc, 0, 0)?.is_empty());
    Ok(())
}

#[test]
fn streams_are_independent_queues() -> Result<()> {
    let backend = RefDeviceBackend::new();
    let alloc = backend.alloc_zeroed(2)?;
    let stream_a = backend.create_stream()?;
    let stream_b = backend.create_stream()?;

    backend.enqueue_write(&stream_a, &alloc, 0, &[5])?;
    backend.enqueue_write(&stream_b, &alloc, 1, &[6])?;
    backend.synchronize(&stream_a)?;
    backend.synchronize(&stream_b)?;

    assert_eq!(backend.read_back(&alloc, 0, 2)?, vec![5, 6]);
    Ok(())
}
