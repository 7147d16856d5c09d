pub mod pool;
pub mod query;
pub mod state;
pub mod types;

pub use pool::{RoundSummary, WorkerPool};
pub use query::{QueryWorker, TargetReport};
pub use state::{CounterKey, CounterStateStore, RateResult};
pub use types::{Sample, SampleValue};
