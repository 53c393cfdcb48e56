//! Runtime adapters: the tick driver and the Tokio spawner.

pub mod driver;
pub mod tokio_spawner;

pub use driver::{drive, pause, Pacing};
pub use tokio_spawner::TokioSpawner;
