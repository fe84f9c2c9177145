pub mod driver;
pub mod extract;
pub mod judge;
pub mod respond;

pub use driver::{run_batch, BatchStats, Job};
