mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use common::{FakeDevices, config, flatten, metric, pipeline, target};
use klassen_poller::collector::SampleValue;
use klassen_poller::config::{ConfigWatcher, MetricKind};
use klassen_poller::scheduler::{Scheduler, stop_channel};
use klassen_poller::status::{PollerStatus, SchedulerState};

async fn wait_for_state(status: &PollerStatus, state: SchedulerState) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while status.scheduler_state() != state {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("scheduler never reached {:?}", state));
}

#[tokio::test]
async fn counter_reports_rate_from_second_round() {
    let devices = Arc::new(FakeDevices::default());
    devices.set("router1", "1.3.6.1.2.1.2.2.1.10.1", vec![100, 150]);

    let p = pipeline(devices.clone(), 2);
    let cfg = config(
        10,
        2,
        vec![target(
            "router1",
            vec![metric("1.3.6.1.2.1.2.2.1.10.1", true, &["if:1"])],
        )],
    );
    let (_stop_tx, stop_rx) = stop_channel();
    let mut scheduler = Scheduler::new(ConfigWatcher::fixed(cfg), p.pool, p.status.clone(), stop_rx);
    let writer = tokio::spawn(p.writer.run());

    scheduler.run_tick().await;
    scheduler.run_tick().await;
    drop(scheduler);
    writer.await.unwrap();

    let samples = flatten(&p.sink);
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].value, SampleValue::NoPriorValue);
    assert_eq!(samples[1].value, SampleValue::Rate(5.0));
    assert!(samples.iter().all(|s| s.kind == MetricKind::Counter));
    assert!(samples.iter().all(|s| s.tags == vec!["if:1".to_string()]));
    assert_eq!(p.status.snapshot().tracked_counters, 1);
}

#[tokio::test]
async fn gauge_is_reported_verbatim_every_round() {
    let devices = Arc::new(FakeDevices::default());
    devices.set("srv", "1.3.6.1.2.1.25.1.6.0", vec![42]);

    let p = pipeline(devices.clone(), 1);
    let cfg = config(
        60,
        1,
        vec![target("srv", vec![metric("1.3.6.1.2.1.25.1.6.0", false, &[])])],
    );
    let (_stop_tx, stop_rx) = stop_channel();
    let mut scheduler = Scheduler::new(ConfigWatcher::fixed(cfg), p.pool, p.status.clone(), stop_rx);
    let writer = tokio::spawn(p.writer.run());

    for _ in 0..3 {
        scheduler.run_tick().await;
    }
    drop(scheduler);
    writer.await.unwrap();

    let values: Vec<SampleValue> = flatten(&p.sink).into_iter().map(|s| s.value).collect();
    assert_eq!(values, vec![SampleValue::Raw(42); 3]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn round_respects_max_procs_and_completes_all_targets() {
    let devices = Arc::new(FakeDevices::with_delay(Duration::from_millis(40)));
    let names = ["a", "b", "c", "d", "e"];
    for name in names {
        devices.set(name, "1.1", vec![1]);
    }

    let p = pipeline(devices.clone(), 2);
    let targets = names
        .iter()
        .map(|n| target(n, vec![metric("1.1", false, &[])]))
        .collect();
    let (_stop_tx, stop_rx) = stop_channel();
    let mut scheduler = Scheduler::new(
        ConfigWatcher::fixed(config(60, 2, targets)),
        p.pool,
        p.status.clone(),
        stop_rx,
    );

    let delay = scheduler.run_tick().await;

    // Барьер: к моменту расчёта паузы все пять устройств опрошены
    assert_eq!(devices.completed.load(Ordering::SeqCst), 5);
    assert!(devices.peak.load(Ordering::SeqCst) <= 2);
    assert!(delay > Duration::ZERO && delay < Duration::from_secs(90));

    let snapshot = p.status.snapshot();
    assert_eq!(snapshot.last_round_targets, 5);
    assert_eq!(snapshot.last_round_failed_targets, 0);
    assert_eq!(snapshot.samples_emitted, 5);
}

#[tokio::test]
async fn unreachable_target_does_not_affect_others() {
    let devices = Arc::new(FakeDevices::default());
    devices.set("up", "1.1", vec![7]);

    let p = pipeline(devices.clone(), 2);
    let cfg = config(
        60,
        2,
        vec![
            target("down", vec![metric("1.1", false, &[]), metric("1.2", true, &[])]),
            target("up", vec![metric("1.1", false, &[])]),
        ],
    );
    let (_stop_tx, stop_rx) = stop_channel();
    let mut scheduler = Scheduler::new(ConfigWatcher::fixed(cfg), p.pool, p.status.clone(), stop_rx);
    let writer = tokio::spawn(p.writer.run());

    scheduler.run_tick().await;
    drop(scheduler);
    writer.await.unwrap();

    let samples = flatten(&p.sink);
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].host, "up");
    assert_eq!(p.status.snapshot().last_round_failed_targets, 1);
}

#[tokio::test]
async fn stopped_scheduler_releases_writer() {
    let devices = Arc::new(FakeDevices::default());
    devices.set("h", "1.1", vec![1]);

    let p = pipeline(devices.clone(), 1);
    let cfg = config(1, 1, vec![target("h", vec![metric("1.1", false, &[])])]);
    let (stop_tx, stop_rx) = stop_channel();
    let scheduler = Scheduler::new(ConfigWatcher::fixed(cfg), p.pool, p.status.clone(), stop_rx);

    let writer = tokio::spawn(p.writer.run());
    let scheduler = tokio::spawn(scheduler.run());

    while p.status.snapshot().rounds_completed < 2 {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    stop_tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(5), scheduler)
        .await
        .expect("scheduler did not stop")
        .unwrap();
    tokio::time::timeout(Duration::from_secs(5), writer)
        .await
        .expect("writer did not drain")
        .unwrap();

    let samples = flatten(&p.sink);
    assert!(samples.len() >= 2);
    assert!(samples.iter().all(|s| s.value == SampleValue::Raw(1)));
}

#[tokio::test]
async fn scheduler_state_is_visible_through_status() {
    let devices = Arc::new(FakeDevices::with_delay(Duration::from_millis(300)));
    devices.set("slow", "1.1", vec![5]);

    let p = pipeline(devices.clone(), 1);
    let cfg = config(3600, 1, vec![target("slow", vec![metric("1.1", false, &[])])]);
    let (stop_tx, stop_rx) = stop_channel();
    let scheduler = Scheduler::new(ConfigWatcher::fixed(cfg), p.pool, p.status.clone(), stop_rx);
    assert_eq!(p.status.scheduler_state(), SchedulerState::Idle);

    let handle = tokio::spawn(scheduler.run());

    wait_for_state(&p.status, SchedulerState::RunningRound).await;
    assert_eq!(p.status.snapshot().rounds_completed, 0);

    wait_for_state(&p.status, SchedulerState::Sleeping).await;
    let snapshot = serde_json::to_value(p.status.snapshot()).unwrap();
    assert_eq!(snapshot["scheduler_state"], "sleeping");
    assert_eq!(snapshot["rounds_completed"], 1);

    stop_tx.send(true).unwrap();
    handle.await.unwrap();
    assert_eq!(p.status.scheduler_state(), SchedulerState::Stopped);
}
