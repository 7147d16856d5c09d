use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::collector::Sample;
use crate::status::PollerStatus;

/// Ограниченная очередь сэмплов от воркеров к `BatchWriter`.
///
/// Запись никогда не блокирует: при переполнении сэмпл отбрасывается.
#[derive(Clone)]
pub struct ResultQueue {
    sender: mpsc::Sender<Sample>,
    status: Arc<PollerStatus>,
}

impl ResultQueue {
    pub fn bounded(capacity: usize, status: Arc<PollerStatus>) -> (Self, mpsc::Receiver<Sample>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self { sender, status }, receiver)
    }

    /// Кладёт сэмпл в очередь; `false`, если он отброшен
    pub fn push(&self, sample: Sample) -> bool {
        match self.sender.try_send(sample) {
            Ok(()) => {
                self.status.record_sample_emitted();
                true
            }
            Err(TrySendError::Full(sample)) => {
                self.status.record_sample_dropped();
                tracing::warn!(host = %sample.host, metric = %sample.metric, "Очередь результатов переполнена, сэмпл отброшен");
                false
            }
            Err(TrySendError::Closed(sample)) => {
                self.status.record_sample_dropped();
                tracing::warn!(host = %sample.host, metric = %sample.metric, "Очередь результатов закрыта, сэмпл отброшен");
                false
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.sender.max_capacity()
    }
}
