use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_SNMP_PORT: u16 = 161;

/// Тип метрики: счётчик пересчитывается в скорость, gauge отдаётся как есть
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Counter => f.write_str("counter"),
            MetricKind::Gauge => f.write_str("gauge"),
        }
    }
}

/// Описание одной метрики устройства
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricSpec {
    /// Числовой OID или имя объекта MIB (с необязательным индексом `.N`)
    pub oid: String,
    #[serde(default)]
    pub mib: Option<String>,
    #[serde(default)]
    pub metricname: Option<String>,
    #[serde(default)]
    pub counter: bool,
    pub tags: Vec<String>,
}

impl MetricSpec {
    pub fn kind(&self) -> MetricKind {
        if self.counter {
            MetricKind::Counter
        } else {
            MetricKind::Gauge
        }
    }

    /// Имя метрики; если не задано, используется OID
    pub fn name(&self) -> &str {
        self.metricname.as_deref().unwrap_or(&self.oid)
    }
}

/// Опрашиваемое устройство и его метрики
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetSpec {
    pub hostname: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    pub community: String,
    #[serde(default)]
    pub metrics: Vec<MetricSpec>,
}

fn default_port() -> u16 {
    DEFAULT_SNMP_PORT
}

impl TargetSpec {
    /// Куда слать запросы: address, а если его нет - hostname
    pub fn address(&self) -> &str {
        self.address.as_deref().unwrap_or(&self.hostname)
    }
}
