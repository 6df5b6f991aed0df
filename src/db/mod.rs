pub mod checkpoints;
pub mod initialize;
pub mod log;
pub mod migrate;
pub mod pool;
pub mod presence;
pub mod reservations;
pub mod rows;
pub mod stats;
pub mod trips;
pub mod upsert;

pub use upsert::UpsertOutcome;
