//! Reference device backend: host memory behind a stream-ordered copy queue.
//!
//! Allocations live in ordinary host memory, but every write travels through
//! a worker thread draining a per-stream queue, so enqueue and synchronize
//! behave like a real asynchronous device. Setting `BATCHPROP_STREAM_SYNC`
//! applies writes inline instead, which makes single-stepping deterministic.

use std::env;
use std::sync::mpsc::{channel, Sender};
use std::sync::{Arc, Mutex, OnceLock};
use std::thread::{self, JoinHandle};

use batchprop::backend::{BackendError, BackendResult, DeviceBackend};
use log::{debug, trace};

static STREAM_SYNC: OnceLock<bool> = OnceLock::new();

fn parse_bool(value: &str) -> bool {
    let normalized = value.trim().to_ascii_lowercase();
    matches!(normalized.as_str(), "1" | "true" | "yes" | "on")
}

fn stream_sync_enabled() -> bool {
    *STREAM_SYNC.get_or_init(|| match env::var("BATCHPROP_STREAM_SYNC") {
        Ok(value) if !value.trim().is_empty() => parse_bool(&value),
        _ => false,
    })
}

/// Contiguous byte allocation; clones alias the same storage.
#[derive(Clone)]
pub struct RefAllocation {
    bytes: Arc<Mutex<Box<[u8]>>>,
}

impl RefAllocation {
    fn zeroed(len: usize) -> Self {
        RefAllocation {
            bytes: Arc::new(Mutex::new(vec![0u8; len].into_boxed_slice())),
        }
    }

    fn len(&self) -> usize {
        self.bytes.lock().unwrap().len()
    }

    fn write(&self, offset: usize, data: &[u8]) {
        let mut bytes = self.bytes.lock().unwrap();
        bytes[offset..offset + data.len()].copy_from_slice(data);
    }
}

enum StreamOp {
    Write {
        dst: RefAllocation,
        offset: usize,
        bytes: Vec<u8>,
    },
    Fence(Sender<()>),
}

struct StreamInner {
    tx: Mutex<Option<Sender<StreamOp>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for StreamInner {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain and exit before we join.
        if let Some(tx) = self.tx.lock().unwrap().take() {
            drop(tx);
        }
        if let Some(worker) = self.worker.lock().unwrap().take() {
            let _ = worker.join();
        }
    }
}

/// Handle to a stream-ordered work queue; clones share the queue.
#[derive(Clone)]
pub struct RefStream {
    inner: Arc<StreamInner>,
}

impl RefStream {
    fn spawn() -> Self {
        let (tx, rx) = channel::<StreamOp>();
        let worker = thread::spawn(move || {
            let mut applied = 0usize;
            while let Ok(op) = rx.recv() {
                match op {
                    StreamOp::Write { dst, offset, bytes } => {
                        dst.write(offset, &bytes);
                        applied += 1;
                    }
                    StreamOp::Fence(ack) => {
                        trace!("stream fence reached after {applied} writes");
                        let _ = ack.send(());
                    }
                }
            }
        });
        RefStream {
            inner: Arc::new(StreamInner {
                tx: Mutex::new(Some(tx)),
                worker: Mutex::new(Some(worker)),
            }),
        }
    }

    fn submit(&self, op: StreamOp) -> BackendResult<()> {
        let guard = self.inner.tx.lock().unwrap();
        let tx = guard
            .as_ref()
            .ok_or_else(|| BackendError::execution("stream is shut down"))?;
        tx.send(op)
            .map_err(|_| BackendError::execution("stream worker exited"))
    }

    fn fence(&self) -> BackendResult<()> {
        let (ack_tx, ack_rx) = channel();
        self.submit(StreamOp::Fence(ack_tx))?;
        ack_rx
            .recv()
            .map_err(|_| BackendError::execution("stream worker dropped the fence"))
    }
}

/// Stream-ordered reference backend over plain host memory.
pub struct RefDeviceBackend;

impl RefDeviceBackend {
    pub fn new() -> Self {
        RefDeviceBackend
    }
}

impl Default for RefDeviceBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceBackend for RefDeviceBackend {
    type Allocation = RefAllocation;
    type Stream = RefStream;

    fn backend_name(&self) -> &str {
        "ref-device"
    }

    fn alloc_zeroed(&self, len: usize) -> BackendResult<Self::Allocation> {
        debug!("allocating {len} bytes");
        Ok(RefAllocation::zeroed(len))
    }

    fn create_stream(&self) -> BackendResult<Self::Stream> {
        Ok(RefStream::spawn())
    }

    fn enqueue_write(
        &self,
        stream: &Self::Stream,
        dst: &Self::Allocation,
        offset: usize,
        bytes: &[u8],
    ) -> BackendResult<()> {
        let size = dst.len();
        if offset.checked_add(bytes.len()).map_or(true, |end| end > size) {
            return Err(BackendError::OutOfRange {
                offset,
                len: bytes.len(),
                size,
            });
        }
        if stream_sync_enabled() {
            dst.write(offset, bytes);
            return Ok(());
        }
        trace!("enqueueing write of {} bytes at offset {offset}", bytes.len());
        stream.submit(StreamOp::Write {
            dst: dst.clone(),
            offset,
            bytes: bytes.to_vec(),
        })
    }

    fn synchronize(&self, stream: &Self::Stream) -> BackendResult<()> {
        if stream_sync_enabled() {
            return Ok(());
        }
        stream.fence()
    }

    fn read_back(
        &self,
        src: &Self::Allocation,
        offset: usize,
        len: usize,
    ) -> BackendResult<Vec<u8>> {
        let bytes = src.bytes.lock().unwrap();
        if offset.checked_add(len).map_or(true, |end| end > bytes.len()) {
            return Err(BackendError::OutOfRange {
                offset,
                len,
                size: bytes.len(),
            });
        }
        Ok(bytes[offset..offset + len].to_vec())
    }
}
