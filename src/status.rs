use serde::Serialize;
use std::sync::atomic::{AtomicI64, AtomicU8, AtomicU64, Ordering};
use std::time::Duration;

/// Состояние цикла опроса
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerState {
    #[default]
    Idle,
    RunningRound,
    Sleeping,
    Stopped,
}

impl SchedulerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => SchedulerState::RunningRound,
            2 => SchedulerState::Sleeping,
            3 => SchedulerState::Stopped,
            _ => SchedulerState::Idle,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            SchedulerState::Idle => 0,
            SchedulerState::RunningRound => 1,
            SchedulerState::Sleeping => 2,
            SchedulerState::Stopped => 3,
        }
    }
}

/// Счётчики работы поллера для логов и эндпоинта `/health`
#[derive(Debug, Default)]
pub struct PollerStatus {
    scheduler_state: AtomicU8,
    rounds_completed: AtomicU64,
    last_round_started: AtomicI64,
    last_round_duration_ms: AtomicU64,
    last_round_targets: AtomicU64,
    last_round_failed_targets: AtomicU64,
    samples_emitted: AtomicU64,
    samples_dropped: AtomicU64,
    batches_sent: AtomicU64,
    batches_failed: AtomicU64,
    tracked_counters: AtomicU64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub scheduler_state: SchedulerState,
    pub rounds_completed: u64,
    /// Секунды с начала эпохи; 0 - раундов ещё не было
    pub last_round_started: i64,
    pub last_round_duration_ms: u64,
    pub last_round_targets: u64,
    pub last_round_failed_targets: u64,
    pub samples_emitted: u64,
    pub samples_dropped: u64,
    pub batches_sent: u64,
    pub batches_failed: u64,
    pub tracked_counters: u64,
}

impl PollerStatus {
    pub fn set_scheduler_state(&self, state: SchedulerState) {
        self.scheduler_state.store(state.as_u8(), Ordering::Relaxed);
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        SchedulerState::from_u8(self.scheduler_state.load(Ordering::Relaxed))
    }

    pub fn record_round(
        &self,
        started: i64,
        duration: Duration,
        targets: usize,
        failed_targets: usize,
        tracked_counters: usize,
    ) {
        self.rounds_completed.fetch_add(1, Ordering::Relaxed);
        self.last_round_started.store(started, Ordering::Relaxed);
        self.last_round_duration_ms
            .store(duration.as_millis() as u64, Ordering::Relaxed);
        self.last_round_targets.store(targets as u64, Ordering::Relaxed);
        self.last_round_failed_targets
            .store(failed_targets as u64, Ordering::Relaxed);
        self.tracked_counters
            .store(tracked_counters as u64, Ordering::Relaxed);
    }

    pub fn record_sample_emitted(&self) {
        self.samples_emitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sample_dropped(&self) {
        self.samples_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_batch(&self, ok: bool) {
        if ok {
            self.batches_sent.fetch_add(1, Ordering::Relaxed);
        } else {
            self.batches_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            scheduler_state: self.scheduler_state(),
            rounds_completed: self.rounds_completed.load(Ordering::Relaxed),
            last_round_started: self.last_round_started.load(Ordering::Relaxed),
            last_round_duration_ms: self.last_round_duration_ms.load(Ordering::Relaxed),
            last_round_targets: self.last_round_targets.load(Ordering::Relaxed),
            last_round_failed_targets: self.last_round_failed_targets.load(Ordering::Relaxed),
            samples_emitted: self.samples_emitted.load(Ordering::Relaxed),
            samples_dropped: self.samples_dropped.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            batches_failed: self.batches_failed.load(Ordering::Relaxed),
            tracked_counters: self.tracked_counters.load(Ordering::Relaxed),
        }
    }
}
