pub mod backend;
pub mod batch;
pub mod property;
pub mod tensor;
pub mod workspace;

pub use backend::DeviceBackend;
pub use batch::{DeviceBatch, HostBatch, HostSample, SampleBatch};
pub use property::{Property, PropertyKind};
pub use tensor::{BatchShape, DType, SampleMeta, Shape, TensorLayout};
pub use workspace::{DeviceWorkspace, HostWorkspace, PropertyWorkspace};
