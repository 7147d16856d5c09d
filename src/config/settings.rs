use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Куда отправлять накопленные пакеты сэмплов
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Только логировать пакеты
    Log,
    /// Дописывать пакеты в JSON-lines файл
    File,
}

/// Глобальные настройки опроса (секция `global`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSettings {
    /// Период опроса в секундах
    #[serde(default = "default_period")]
    pub period: u64,
    /// Максимум одновременно опрашиваемых устройств
    #[serde(default = "default_max_procs")]
    pub max_procs: usize,
    /// Ключ API бэкенда, передаётся в sink как есть
    pub datadog_api_key: String,
    /// Таймаут одного SNMP запроса (секунды)
    #[serde(default = "default_query_timeout")]
    pub query_timeout: u64,
    /// Максимальный размер пакета для отправки
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Ёмкость очереди результатов
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_sink")]
    pub sink: SinkKind,
    #[serde(default = "default_sink_path")]
    pub sink_path: PathBuf,
    /// Адрес HTTP эндпоинта состояния, например "0.0.0.0:9161"
    #[serde(default)]
    pub listen: Option<String>,
}

fn default_period() -> u64 {
    60
}

fn default_max_procs() -> usize {
    2
}

fn default_query_timeout() -> u64 {
    10
}

fn default_batch_size() -> usize {
    10
}

fn default_queue_capacity() -> usize {
    10_000
}

fn default_sink() -> SinkKind {
    SinkKind::Log
}

fn default_sink_path() -> PathBuf {
    PathBuf::from("./samples.jsonl")
}

impl GlobalSettings {
    /// Настройки по умолчанию с заданным ключом бэкенда
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            period: default_period(),
            max_procs: default_max_procs(),
            datadog_api_key: api_key.into(),
            query_timeout: default_query_timeout(),
            batch_size: default_batch_size(),
            queue_capacity: default_queue_capacity(),
            sink: default_sink(),
            sink_path: default_sink_path(),
            listen: None,
        }
    }

    pub fn period_duration(&self) -> Duration {
        Duration::from_secs(self.period)
    }

    pub fn query_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.query_timeout)
    }
}
