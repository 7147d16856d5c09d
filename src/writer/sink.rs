use anyhow::{Context, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::collector::Sample;
use crate::config::{GlobalSettings, SinkKind};
use crate::formatter::JsonFormatter;

/// Получатель пакетов сэмплов. Доставка не гарантируется.
#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn send(&self, batch: &[Sample]) -> Result<()>;
}

/// Создаёт sink по настройкам `global`
pub fn from_settings(settings: &GlobalSettings) -> Arc<dyn MetricSink> {
    match settings.sink {
        SinkKind::Log => Arc::new(LogSink::new(&settings.datadog_api_key)),
        SinkKind::File => {
            let sink = FileSink::new(&settings.sink_path);
            tracing::info!(path = %sink.path().display(), "Пакеты пишутся в файл");
            Arc::new(sink)
        }
    }
}

/// Только пишет пакеты в лог
pub struct LogSink {
    api_key_hint: String,
}

impl LogSink {
    pub fn new(api_key: &str) -> Self {
        Self {
            api_key_hint: mask_credential(api_key),
        }
    }
}

#[async_trait]
impl MetricSink for LogSink {
    async fn send(&self, batch: &[Sample]) -> Result<()> {
        let json = JsonFormatter::to_json_string(batch)?;
        tracing::info!(
            count = batch.len(),
            api_key = %self.api_key_hint,
            batch = %json,
            "Получен пакет результатов"
        );
        Ok(())
    }
}

/// Дописывает сэмплы в JSON-lines файл
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MetricSink for FileSink {
    async fn send(&self, batch: &[Sample]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .context(format!("Не удалось создать каталог: {}", parent.display()))?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .context(format!("Не удалось открыть файл: {}", self.path.display()))?;

        for sample in batch {
            let line = JsonFormatter::to_json_line(sample)?;
            writeln!(file, "{}", line)
                .context(format!("Не удалось записать в файл: {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Хранит пакеты в памяти; для тестов и отладки
#[derive(Default)]
pub struct InMemorySink {
    batches: Mutex<Vec<Vec<Sample>>>,
    failing: Mutex<bool>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Пока включено, каждый `send` завершается ошибкой
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock() = failing;
    }

    pub fn take_batches(&self) -> Vec<Vec<Sample>> {
        std::mem::take(&mut *self.batches.lock())
    }
}

#[async_trait]
impl MetricSink for InMemorySink {
    async fn send(&self, batch: &[Sample]) -> Result<()> {
        if *self.failing.lock() {
            anyhow::bail!("sink недоступен");
        }
        self.batches.lock().push(batch.to_vec());
        Ok(())
    }
}

fn mask_credential(secret: &str) -> String {
    let count = secret.chars().count();
    if count <= 4 {
        return "****".to_string();
    }
    let tail: String = secret.chars().skip(count - 4).collect();
    format!("****{}", tail)
}
