use serde::Serialize;

use crate::config::MetricKind;

/// Значение сэмпла
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SampleValue {
    /// Значение gauge как есть
    Raw(i64),
    /// Скорость счётчика за период
    Rate(f64),
    /// Первое наблюдение счётчика: скорости ещё нет
    NoPriorValue,
}

/// Результат опроса одной метрики, уходящий в очередь
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub host: String,
    pub metric: String,
    #[serde(rename = "type")]
    pub kind: MetricKind,
    /// Секунды с начала эпохи
    pub timestamp: i64,
    pub value: SampleValue,
    pub tags: Vec<String>,
}
