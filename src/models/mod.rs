// Re-export model modules
pub mod currencies;
mod snapshot;

pub use currencies::*;
pub use snapshot::*;
