mod log;
mod memory;

pub use log::TracingSink;
pub use memory::MemorySink;
