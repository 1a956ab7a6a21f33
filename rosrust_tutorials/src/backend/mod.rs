pub use self::memory::{MemoryGraph, MemoryLogger, MemoryNode, MemoryRegistration};
pub use self::ros::{RosLogger, RosNode};

mod memory;
mod ros;
