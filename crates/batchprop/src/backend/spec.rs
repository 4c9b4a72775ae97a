//! Device backend contract for stream-ordered batch storage.

use thiserror::Error;

/// Allocation or copy failure surfaced by a device backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("allocation of {len} bytes failed: {message}")]
    Allocation { len: usize, message: String },
    #[error("copy of {len} bytes at offset {offset} exceeds allocation of {size} bytes")]
    OutOfRange { offset: usize, len: usize, size: usize },
    #[error("backend execution failure: {message}")]
    Execution { message: String },
}

impl BackendError {
    pub fn execution(message: impl Into<String>) -> Self {
        BackendError::Execution {
            message: message.into(),
        }
    }
}

/// Convenience alias for results returned by backend routines.
pub type BackendResult<T> = Result<T, BackendError>;

/// Backend owning device memory and the streams that order copies into it.
///
/// `enqueue_write` must not block for completion; enqueued work becomes
/// observable only after `synchronize` returns on the same stream. Sequencing
/// consumers after that point is the caller's responsibility.
pub trait DeviceBackend: Send + Sync {
    /// Contiguous device allocation; clones alias the same storage.
    type Allocation: Clone + Send + Sync + 'static;

    /// Ordered asynchronous work queue; clones alias the same queue.
    type Stream: Clone + Send + Sync + 'static;

    /// Returns a human-readable backend identifier (e.g. `"ref-device"`).
    fn backend_name(&self) -> &str;

    /// Creates a zero-initialised contiguous allocation of `len` bytes.
    fn alloc_zeroed(&self, len: usize) -> BackendResult<Self::Allocation>;

    /// Creates a stream on which copies into this backend's allocations can
    /// be enqueued.
    fn create_stream(&self) -> BackendResult<Self::Stream>;

    /// Enqueues a copy of `bytes` into `dst` starting at `offset` and returns
    /// without waiting for the copy to land.
    fn enqueue_write(
        &self,
        stream: &Self::Stream,
        dst: &Self::Allocation,
        offset: usize,
        bytes: &[u8],
    ) -> BackendResult<()>;

    /// Blocks until every operation previously enqueued on `stream` has
    /// completed.
    fn synchronize(&self, stream: &Self::Stream) -> BackendResult<()>;

    /// Copies `len` bytes starting at `offset` back into host memory.
    ///
    /// Readback is not stream-ordered; callers synchronize the relevant
    /// stream first. Debug and test use only.
    fn read_back(
        &self,
        src: &Self::Allocation,
        offset: usize,
        len: usize,
    ) -> BackendResult<Vec<u8>>;
}
