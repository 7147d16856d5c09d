use anyhow::{Context, Result};
use serde::Serialize;

use crate::collector::{Sample, SampleValue};
use crate::config::MetricKind;

/// Сводка по пакету для логов
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub gauges: usize,
    pub counters: usize,
    /// Счётчики без скорости (первое наблюдение)
    pub pending_counters: usize,
    pub hosts: usize,
}

/// JSON пакета целиком
#[derive(Debug, Clone, Serialize)]
pub struct BatchJson<'a> {
    pub summary: BatchSummary,
    pub samples: &'a [Sample],
}

/// Форматирование сэмплов для sink'ов
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn summarize(samples: &[Sample]) -> BatchSummary {
        let mut hosts: Vec<&str> = samples.iter().map(|s| s.host.as_str()).collect();
        hosts.sort_unstable();
        hosts.dedup();

        let mut summary = BatchSummary {
            total: samples.len(),
            hosts: hosts.len(),
            ..Default::default()
        };
        for sample in samples {
            match sample.kind {
                MetricKind::Gauge => summary.gauges += 1,
                MetricKind::Counter => summary.counters += 1,
            }
            if sample.value == SampleValue::NoPriorValue {
                summary.pending_counters += 1;
            }
        }
        summary
    }

    /// Пакет одной JSON строкой
    pub fn to_json_string(samples: &[Sample]) -> Result<String> {
        let batch = BatchJson {
            summary: Self::summarize(samples),
            samples,
        };
        serde_json::to_string(&batch).context("Ошибка JSON сериализации пакета")
    }

    /// Одна строка JSON-lines на сэмпл
    pub fn to_json_line(sample: &Sample) -> Result<String> {
        serde_json::to_string(sample).context("Ошибка JSON сериализации сэмпла")
    }
}
