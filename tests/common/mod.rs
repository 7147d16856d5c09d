use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use klassen_poller::collector::{CounterStateStore, QueryWorker, Sample, WorkerPool};
use klassen_poller::config::{AppConfig, GlobalSettings, MetricSpec, TargetSpec};
use klassen_poller::snmp::MetricSource;
use klassen_poller::status::PollerStatus;
use klassen_poller::writer::{BatchWriter, InMemorySink, ResultQueue};

/// Фальшивое устройство: значения по (hostname, oid) выдаются по очереди,
/// последнее значение повторяется
#[derive(Default)]
pub struct FakeDevices {
    values: Mutex<HashMap<(String, String), Vec<i64>>>,
    pub delay: Duration,
    pub active: AtomicUsize,
    pub peak: AtomicUsize,
    pub completed: AtomicUsize,
}

impl FakeDevices {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Default::default()
        }
    }

    pub fn set(&self, host: &str, oid: &str, values: Vec<i64>) {
        self.values
            .lock()
            .insert((host.to_string(), oid.to_string()), values);
    }
}

#[async_trait]
impl MetricSource for FakeDevices {
    async fn get(
        &self,
        address: &str,
        _port: u16,
        oid: &str,
        _mib: Option<&str>,
        _community: &str,
    ) -> Result<i64> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.completed.fetch_add(1, Ordering::SeqCst);

        let mut values = self.values.lock();
        let queue = values
            .get_mut(&(address.to_string(), oid.to_string()))
            .ok_or_else(|| anyhow::anyhow!("Request timed out"))?;
        match queue.len() {
            0 => anyhow::bail!("Request timed out"),
            1 => Ok(queue[0]),
            _ => Ok(queue.remove(0)),
        }
    }
}

pub fn metric(oid: &str, counter: bool, tags: &[&str]) -> MetricSpec {
    MetricSpec {
        oid: oid.to_string(),
        mib: None,
        metricname: None,
        counter,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

pub fn target(hostname: &str, metrics: Vec<MetricSpec>) -> TargetSpec {
    TargetSpec {
        hostname: hostname.to_string(),
        address: None,
        port: 161,
        community: "public".to_string(),
        metrics,
    }
}

pub fn config(period: u64, max_procs: usize, targets: Vec<TargetSpec>) -> AppConfig {
    let mut global = GlobalSettings::with_api_key("test-key");
    global.period = period;
    global.max_procs = max_procs;
    AppConfig {
        global,
        metrics: targets,
    }
}

/// Пул и writer, собранные как в main, но с фальшивыми источником и sink
pub struct Pipeline {
    pub pool: WorkerPool,
    pub writer: BatchWriter,
    pub sink: Arc<InMemorySink>,
    pub status: Arc<PollerStatus>,
}

pub fn pipeline(source: Arc<FakeDevices>, max_procs: usize) -> Pipeline {
    let status = Arc::new(PollerStatus::default());
    let (queue, receiver) = ResultQueue::bounded(1000, status.clone());
    let sink = Arc::new(InMemorySink::new());
    let writer = BatchWriter::new(receiver, sink.clone(), status.clone())
        .with_pause(Duration::from_millis(10));
    let worker = QueryWorker::new(
        source,
        Arc::new(CounterStateStore::new()),
        queue,
        Duration::from_secs(5),
    );
    Pipeline {
        pool: WorkerPool::new(worker, max_procs),
        writer,
        sink,
        status,
    }
}

pub fn flatten(sink: &InMemorySink) -> Vec<Sample> {
    sink.take_batches().into_iter().flatten().collect()
}
