use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

pub mod settings;
pub mod target;
pub mod watcher;

pub use settings::{GlobalSettings, SinkKind};
pub use target::{MetricKind, MetricSpec, TargetSpec};
pub use watcher::ConfigWatcher;

/// Путь к конфигурации, если он не передан через --config
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Главная конфигурация приложения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub global: GlobalSettings,
    /// Опрашиваемые устройства в порядке запуска
    #[serde(default)]
    pub metrics: Vec<TargetSpec>,
}

impl AppConfig {
    /// Загружает конфигурацию из JSON или YAML файла (по расширению)
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "Чтение файла конфигурации");
        let content = std::fs::read_to_string(path)
            .context(format!("Не удалось прочитать файл: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            Self::from_yaml(&content)?
        } else {
            Self::from_json(&content)?
        };

        tracing::info!(path = %path.display(), targets = config.metrics.len(), "Конфигурация загружена");
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let config: AppConfig =
            serde_json::from_str(content).context("Не удалось распарсить JSON")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yml::from_str(content).context("Не удалось распарсить YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Проверяет значения, которые serde проверить не может
    pub fn validate(&self) -> Result<()> {
        if self.global.period == 0 {
            anyhow::bail!("global.period должен быть больше нуля");
        }
        if self.global.max_procs == 0 {
            anyhow::bail!("global.max_procs должен быть больше нуля");
        }
        if self.global.query_timeout == 0 {
            anyhow::bail!("global.query_timeout должен быть больше нуля");
        }
        if self.global.batch_size == 0 {
            anyhow::bail!("global.batch_size должен быть больше нуля");
        }
        if self.global.queue_capacity == 0 {
            anyhow::bail!("global.queue_capacity должен быть больше нуля");
        }

        let mut seen = HashSet::new();
        for target in &self.metrics {
            if target.hostname.trim().is_empty() {
                anyhow::bail!("У устройства пустой hostname");
            }
            if let Some(metric) = target.metrics.iter().find(|m| m.oid.trim().is_empty()) {
                anyhow::bail!(
                    "У метрики '{}' устройства '{}' пустой OID",
                    metric.name(),
                    target.hostname
                );
            }
            // Дубликат не фатален: счётчики одного ключа сериализуются в хранилище
            if !seen.insert(target.hostname.as_str()) {
                tracing::warn!(host = %target.hostname, "Устройство описано в конфигурации повторно");
            }
        }

        Ok(())
    }

    /// Краткая сводка для логов при старте
    pub fn summary(&self) -> String {
        let metric_count: usize = self.metrics.iter().map(|t| t.metrics.len()).sum();
        format!(
            "period={}s max_procs={} targets={} metrics={}",
            self.global.period,
            self.global.max_procs,
            self.metrics.len(),
            metric_count
        )
    }
}
