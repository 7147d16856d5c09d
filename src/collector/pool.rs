use tokio::task::{JoinError, JoinSet};

use super::query::{QueryWorker, TargetReport};
use crate::config::TargetSpec;

/// Итог одного раунда опроса
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub targets: usize,
    /// Сэмплы, принятые очередью
    pub samples: usize,
    /// Устройства, с которых не удалось прочитать ни одного значения
    pub failed_targets: usize,
}

struct WorkerDone {
    host: String,
    metrics: usize,
    report: TargetReport,
}

/// Запускает по воркеру на устройство, не более `max_procs` одновременно
pub struct WorkerPool {
    worker: QueryWorker,
    max_procs: usize,
}

impl WorkerPool {
    pub fn new(worker: QueryWorker, max_procs: usize) -> Self {
        Self {
            worker,
            max_procs: max_procs.max(1),
        }
    }

    pub fn max_procs(&self) -> usize {
        self.max_procs
    }

    pub fn set_max_procs(&mut self, max_procs: usize) {
        self.max_procs = max_procs.max(1);
    }

    pub fn worker(&self) -> &QueryWorker {
        &self.worker
    }

    pub fn worker_mut(&mut self) -> &mut QueryWorker {
        &mut self.worker
    }

    /// Опрашивает каждое устройство ровно один раз и возвращается только
    /// после завершения всех воркеров раунда.
    pub async fn run_round(&self, targets: &[TargetSpec], period: u64) -> RoundSummary {
        let mut summary = RoundSummary {
            targets: targets.len(),
            ..Default::default()
        };
        let mut running = JoinSet::new();

        for target in targets {
            // Слот освобождается только после того, как завершённый воркер собран
            while running.len() >= self.max_procs {
                if let Some(done) = running.join_next().await {
                    Self::reap(done, &mut summary);
                }
            }

            let worker = self.worker.clone();
            let target = target.clone();
            tracing::debug!(host = %target.hostname, active = running.len(), "Запуск воркера");
            running.spawn(async move {
                let report = worker.run(&target, period).await;
                WorkerDone {
                    host: target.hostname,
                    metrics: target.metrics.len(),
                    report,
                }
            });
        }

        while let Some(done) = running.join_next().await {
            Self::reap(done, &mut summary);
        }

        summary
    }

    fn reap(done: Result<WorkerDone, JoinError>, summary: &mut RoundSummary) {
        match done {
            Ok(done) => {
                tracing::debug!(
                    host = %done.host,
                    read = done.report.read,
                    samples = done.report.emitted,
                    "Воркер завершён"
                );
                summary.samples += done.report.emitted;
                if done.report.read == 0 && done.metrics > 0 {
                    summary.failed_targets += 1;
                }
            }
            Err(e) => {
                summary.failed_targets += 1;
                tracing::error!(error = %e, "Воркер завершился аварийно");
            }
        }
    }
}
