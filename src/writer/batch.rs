use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::Duration;

use super::sink::MetricSink;
use crate::collector::Sample;
use crate::status::PollerStatus;

/// Максимальный размер пакета по умолчанию
pub const MAX_ITEMS: usize = 10;

/// Пауза, когда очередь пуста
pub const PAUSE: Duration = Duration::from_secs(1);

enum Drain {
    Batch(Vec<Sample>),
    Empty,
    Closed,
}

/// Разбирает очередь результатов на пакеты и отдаёт их в sink.
///
/// Работает независимо от тиков планировщика. Ошибка отправки теряет пакет,
/// повторов нет. Завершается, когда все отправители закрыты и очередь пуста.
pub struct BatchWriter {
    receiver: mpsc::Receiver<Sample>,
    sink: Arc<dyn MetricSink>,
    status: Arc<PollerStatus>,
    max_items: usize,
    pause: Duration,
}

impl BatchWriter {
    pub fn new(
        receiver: mpsc::Receiver<Sample>,
        sink: Arc<dyn MetricSink>,
        status: Arc<PollerStatus>,
    ) -> Self {
        Self {
            receiver,
            sink,
            status,
            max_items: MAX_ITEMS,
            pause: PAUSE,
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items.max(1);
        self
    }

    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    pub async fn run(mut self) {
        tracing::info!(max_items = self.max_items, "Запуск отправки результатов");

        loop {
            match self.drain() {
                Drain::Batch(batch) => self.forward(&batch).await,
                Drain::Empty => {
                    tracing::trace!("Очередь результатов пуста, ждём");
                    tokio::time::sleep(self.pause).await;
                }
                Drain::Closed => break,
            }
        }

        tracing::info!("Очередь результатов закрыта, отправка остановлена");
    }

    /// Забирает до `max_items` сэмплов, не дожидаясь новых
    fn drain(&mut self) -> Drain {
        let mut batch = Vec::with_capacity(self.max_items);
        while batch.len() < self.max_items {
            match self.receiver.try_recv() {
                Ok(sample) => batch.push(sample),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) if batch.is_empty() => return Drain::Closed,
                Err(TryRecvError::Disconnected) => break,
            }
        }

        if batch.is_empty() {
            Drain::Empty
        } else {
            Drain::Batch(batch)
        }
    }

    async fn forward(&self, batch: &[Sample]) {
        tracing::debug!(count = batch.len(), "Отправка пакета");
        match self.sink.send(batch).await {
            Ok(()) => self.status.record_batch(true),
            Err(e) => {
                self.status.record_batch(false);
                tracing::error!(count = batch.len(), error = %format!("{:#}", e), "Не удалось отправить пакет, пакет отброшен");
            }
        }
    }
}
