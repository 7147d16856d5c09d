use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::watch;
use tokio::time::{Duration, Instant};

use crate::collector::WorkerPool;
use crate::config::{AppConfig, ConfigWatcher};
use crate::status::{PollerStatus, SchedulerState};

/// Канал остановки: `true` останавливает планировщик между тиками
pub fn stop_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Задержка до следующей границы периода, отсчитанной от начала эпохи.
///
/// Всегда в пределах `(0, period]`: на самой границе ждём полный период.
pub fn next_delay(since_epoch: Duration, period: Duration) -> Duration {
    let period_ms = period.as_millis().max(1);
    let into_period = since_epoch.as_millis() % period_ms;
    Duration::from_millis((period_ms - into_period) as u64)
}

/// Защита от шага системных часов назад: если до следующего старта по
/// монотонным часам остаётся меньше половины периода, ждём ещё один период.
///
/// `since_tick_start` - сколько прошло с начала текущего тика.
pub fn guard_delay(delay: Duration, since_tick_start: Duration, period: Duration) -> Duration {
    if since_tick_start + delay < period / 2 {
        delay + period
    } else {
        delay
    }
}

fn since_epoch() -> Duration {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
}

/// Тиковый цикл: перечитать конфигурацию, опросить все устройства, поспать
/// до следующей границы периода.
pub struct Scheduler {
    watcher: ConfigWatcher,
    active: Arc<AppConfig>,
    pool: WorkerPool,
    status: Arc<PollerStatus>,
    stop: watch::Receiver<bool>,
}

impl Scheduler {
    pub fn new(
        watcher: ConfigWatcher,
        mut pool: WorkerPool,
        status: Arc<PollerStatus>,
        stop: watch::Receiver<bool>,
    ) -> Self {
        let active = watcher.current();
        Self::apply(&mut pool, &active);
        status.set_scheduler_state(SchedulerState::Idle);
        Self {
            watcher,
            active,
            pool,
            status,
            stop,
        }
    }

    pub fn pool(&self) -> &WorkerPool {
        &self.pool
    }

    fn stop_requested(&self) -> bool {
        *self.stop.borrow()
    }

    fn apply(pool: &mut WorkerPool, config: &AppConfig) {
        pool.set_max_procs(config.global.max_procs);
        pool.worker_mut()
            .set_query_timeout(config.global.query_timeout_duration());
    }

    /// Один тик без сна. Возвращает задержку до следующего тика.
    pub async fn run_tick(&mut self) -> Duration {
        let tick_start = since_epoch();
        let started = Instant::now();
        tracing::info!(timestamp = tick_start.as_secs(), "Начало раунда");

        let config = self.watcher.refresh();
        if !Arc::ptr_eq(&config, &self.active) {
            Self::apply(&mut self.pool, &config);
            tracing::info!(
                summary = %config.summary(),
                max_procs = self.pool.max_procs(),
                "Применена новая конфигурация"
            );
            self.active = config;
        }

        // Раунд доигрывается с той конфигурацией, с которой начался
        let config = self.active.clone();
        let period = config.global.period;

        self.status.set_scheduler_state(SchedulerState::RunningRound);
        let summary = self.pool.run_round(&config.metrics, period).await;
        self.status.set_scheduler_state(SchedulerState::Idle);

        let elapsed = started.elapsed();
        let tracked = self.pool.worker().state().len();
        self.status.record_round(
            tick_start.as_secs() as i64,
            elapsed,
            summary.targets,
            summary.failed_targets,
            tracked,
        );

        let period = config.global.period_duration();
        let delay = guard_delay(next_delay(since_epoch(), period), started.elapsed(), period);
        tracing::info!(
            targets = summary.targets,
            samples = summary.samples,
            failed = summary.failed_targets,
            elapsed_ms = elapsed.as_millis() as u64,
            pause_ms = delay.as_millis() as u64,
            "Раунд завершён"
        );
        tracing::debug!(tracked_counters = tracked, "Состояние счётчиков");

        delay
    }

    /// Крутит тики, пока не придёт сигнал остановки. Идущий раунд всегда
    /// доводится до конца.
    pub async fn run(mut self) {
        tracing::info!(summary = %self.active.summary(), "Запуск планировщика");

        while !self.stop_requested() {
            let delay = self.run_tick().await;
            if self.stop_requested() {
                break;
            }

            self.status.set_scheduler_state(SchedulerState::Sleeping);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = wait_for_stop(&mut self.stop) => {}
            }
            self.status.set_scheduler_state(SchedulerState::Idle);
        }

        self.status.set_scheduler_state(SchedulerState::Stopped);
        tracing::info!("Планировщик остановлен");
    }
}

async fn wait_for_stop(stop: &mut watch::Receiver<bool>) {
    if stop.wait_for(|stopped| *stopped).await.is_err() {
        // Отправитель закрыт: остановки больше не будет
        std::future::pending::<()>().await;
    }
}
