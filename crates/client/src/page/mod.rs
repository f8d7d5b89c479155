mod memory;

pub use memory::{Element, MemoryPage};
