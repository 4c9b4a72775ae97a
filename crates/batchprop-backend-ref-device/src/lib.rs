pub mod device;

pub use device::{RefAllocation, RefDeviceBackend, RefStream};
