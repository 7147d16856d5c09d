use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::AppConfig;

/// Держит активную конфигурацию и перечитывает файл, когда растёт его mtime.
///
/// Новая конфигурация подменяется целиком между тиками; ошибка перечитывания
/// оставляет в силе предыдущую.
pub struct ConfigWatcher {
    path: Option<PathBuf>,
    version: Option<SystemTime>,
    current: Arc<AppConfig>,
}

impl ConfigWatcher {
    /// Конфигурация без файла: никогда не перечитывается
    pub fn fixed(config: AppConfig) -> Self {
        Self {
            path: None,
            version: None,
            current: Arc::new(config),
        }
    }

    /// Первое чтение при старте; ошибка здесь фатальна для процесса
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let version = Self::modified(&path)?;
        let config = AppConfig::load(&path)?;

        Ok(Self {
            path: Some(path),
            version: Some(version),
            current: Arc::new(config),
        })
    }

    pub fn current(&self) -> Arc<AppConfig> {
        self.current.clone()
    }

    /// Проверяет mtime файла и при необходимости перечитывает конфигурацию.
    /// Возвращает конфигурацию, действующую для следующего тика.
    pub fn refresh(&mut self) -> Arc<AppConfig> {
        let Some(path) = self.path.clone() else {
            return self.current();
        };

        let modified = match Self::modified(&path) {
            Ok(modified) => modified,
            Err(e) => {
                tracing::warn!(error = %format!("{:#}", e), "Не удалось проверить файл конфигурации");
                return self.current();
            }
        };

        let changed = self.version.is_none_or(|known| modified > known);
        if !changed {
            return self.current();
        }

        tracing::info!(
            path = %path.display(),
            old = ?self.version,
            new = ?modified,
            "Время изменения конфигурации выросло, перечитываем"
        );
        // Версию запоминаем и при ошибке, чтобы не разбирать тот же битый файл каждый тик
        self.version = Some(modified);

        match AppConfig::load(&path) {
            Ok(config) => {
                self.current = Arc::new(config);
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %format!("{:#}", e),
                    "Перечитать конфигурацию не удалось, остаётся предыдущая"
                );
            }
        }

        self.current()
    }

    fn modified(path: &Path) -> Result<SystemTime> {
        std::fs::metadata(path)
            .and_then(|meta| meta.modified())
            .context(format!("Не удалось получить mtime: {}", path.display()))
    }
}
