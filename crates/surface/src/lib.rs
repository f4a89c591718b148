pub mod config;
pub mod geojson;
pub mod memory;
pub mod types;

pub use memory::{MemoryHost, MemorySurface};
pub use types::*;
