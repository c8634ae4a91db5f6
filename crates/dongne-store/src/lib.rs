//! Storage layer: the single baseline snapshot new-deal detection compares against.

mod baseline;
mod error;
mod file;
mod memory;

pub use baseline::{BaselineRepository, BaselineSnapshot, refresh_due};
pub use error::StoreError;
pub use file::{BASELINE_FILE, JsonFileBaseline};
pub use memory::MemoryBaseline;
