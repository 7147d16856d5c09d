pub mod batch;
pub mod queue;
pub mod sink;

pub use batch::{BatchWriter, MAX_ITEMS, PAUSE};
pub use queue::ResultQueue;
pub use sink::{FileSink, InMemorySink, LogSink, MetricSink};
