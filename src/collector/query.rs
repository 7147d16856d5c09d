use std::sync::Arc;
use tokio::time::{Duration, timeout};

use super::state::{CounterKey, CounterStateStore, RateResult};
use super::types::{Sample, SampleValue};
use crate::config::{MetricKind, MetricSpec, TargetSpec};
use crate::snmp::MetricSource;
use crate::writer::ResultQueue;

/// Итог опроса одного устройства
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TargetReport {
    /// Метрики, значение которых удалось прочитать
    pub read: usize,
    /// Сэмплы, принятые очередью
    pub emitted: usize,
}

/// Опрашивает все метрики одного устройства и кладёт сэмплы в очередь
#[derive(Clone)]
pub struct QueryWorker {
    source: Arc<dyn MetricSource>,
    state: Arc<CounterStateStore>,
    queue: ResultQueue,
    query_timeout: Duration,
}

impl QueryWorker {
    pub fn new(
        source: Arc<dyn MetricSource>,
        state: Arc<CounterStateStore>,
        queue: ResultQueue,
        query_timeout: Duration,
    ) -> Self {
        Self {
            source,
            state,
            queue,
            query_timeout,
        }
    }

    pub fn set_query_timeout(&mut self, query_timeout: Duration) {
        self.query_timeout = query_timeout;
    }

    pub fn state(&self) -> &Arc<CounterStateStore> {
        &self.state
    }

    /// Опрашивает метрики устройства по порядку. Ошибка одной метрики
    /// пропускает только её.
    pub async fn run(&self, target: &TargetSpec, period: u64) -> TargetReport {
        tracing::debug!(host = %target.hostname, metrics = target.metrics.len(), "Опрос устройства");

        let mut report = TargetReport::default();
        for metric in &target.metrics {
            let Some(sample) = self.query_metric(target, metric, period).await else {
                continue;
            };
            report.read += 1;
            if self.queue.push(sample) {
                report.emitted += 1;
            }
        }

        if report.read == 0 && !target.metrics.is_empty() {
            tracing::warn!(host = %target.hostname, "Устройство не вернуло ни одного значения");
        }
        report
    }

    async fn query_metric(
        &self,
        target: &TargetSpec,
        metric: &MetricSpec,
        period: u64,
    ) -> Option<Sample> {
        let host = target.hostname.as_str();
        let oid = metric.oid.as_str();
        let mib = metric.mib.as_deref();

        tracing::debug!(host, oid, mib, "Запрос OID");

        let request = self.source.get(
            target.address(),
            target.port,
            oid,
            mib,
            &target.community,
        );
        let raw = match timeout(self.query_timeout, request).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                tracing::warn!(host, oid, mib, error = %format!("{:#}", e), "SNMP запрос не удался, метрика пропущена");
                return None;
            }
            Err(_) => {
                tracing::warn!(host, oid, mib, timeout = ?self.query_timeout, "Таймаут SNMP запроса, метрика пропущена");
                return None;
            }
        };

        tracing::debug!(host, oid, metric = metric.name(), raw, "Получено значение");

        let kind = metric.kind();
        let value = match kind {
            MetricKind::Gauge => SampleValue::Raw(raw),
            MetricKind::Counter => {
                let key = CounterKey::new(host, oid);
                match self.state.observe(key.clone(), raw, period) {
                    RateResult::Rate(rate) => {
                        tracing::debug!(%key, rate, "Скорость счётчика");
                        SampleValue::Rate(rate)
                    }
                    RateResult::NoPriorValue => {
                        tracing::debug!(%key, "Первое наблюдение счётчика, скорости ещё нет");
                        SampleValue::NoPriorValue
                    }
                }
            }
        };

        Some(Sample {
            host: host.to_string(),
            metric: metric.name().to_string(),
            kind,
            timestamp: chrono::Utc::now().timestamp(),
            value,
            tags: metric.tags.clone(),
        })
    }
}
