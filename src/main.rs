use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use klassen_poller::collector::{CounterStateStore, QueryWorker, WorkerPool};
use klassen_poller::config::{ConfigWatcher, DEFAULT_CONFIG_PATH};
use klassen_poller::routes;
use klassen_poller::scheduler::{Scheduler, stop_channel};
use klassen_poller::snmp::SnmpSource;
use klassen_poller::status::PollerStatus;
use klassen_poller::writer::{BatchWriter, ResultQueue, sink};

/// Периодический опрос SNMP-устройств с пакетной отправкой метрик
#[derive(Parser, Debug)]
#[command(name = "klassen-poller", version, about)]
struct Args {
    /// Путь к файлу конфигурации (JSON или YAML)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Включить отладочное логирование
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.debug);
    tracing::info!("Логирование готово, запуск");

    // Без читаемой конфигурации на старте работать нечем
    let watcher = ConfigWatcher::load(&args.config)?;
    let config = watcher.current();
    tracing::info!(summary = %config.summary(), "Стартовая конфигурация");

    let status = Arc::new(PollerStatus::default());
    let (queue, receiver) = ResultQueue::bounded(config.global.queue_capacity, status.clone());
    tracing::info!(capacity = queue.capacity(), batch_size = config.global.batch_size, "Очередь результатов создана");

    let batch_writer = BatchWriter::new(receiver, sink::from_settings(&config.global), status.clone())
        .with_max_items(config.global.batch_size);
    let writer_handle = tokio::spawn(batch_writer.run());

    if let Some(listen) = config.global.listen.clone() {
        let status = status.clone();
        tokio::spawn(async move {
            if let Err(e) = routes::serve(&listen, status).await {
                tracing::error!(error = %format!("{:#}", e), "Эндпоинт состояния недоступен");
            }
        });
    }

    let (stop_tx, stop_rx) = stop_channel();
    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        tracing::info!("Получен сигнал остановки, завершаем после текущего раунда");
        let _ = stop_tx.send(true);
    });

    let worker = QueryWorker::new(
        Arc::new(SnmpSource::new()),
        Arc::new(CounterStateStore::new()),
        queue,
        config.global.query_timeout_duration(),
    );
    let pool = WorkerPool::new(worker, config.global.max_procs);
    Scheduler::new(watcher, pool, status, stop_rx).run().await;

    // Планировщик отпустил очередь: writer дочитает остаток и завершится
    if let Err(e) = writer_handle.await {
        tracing::error!(error = %e, "Процесс отправки завершился аварийно");
    }

    tracing::info!("Поллер остановлен");
    Ok(())
}

fn init_logging(debug: bool) {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => tracing::info!("Получен CTRL+C"),
                    _ = sigterm.recv() => tracing::info!("Получен SIGTERM"),
                }
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Не удалось подписаться на SIGTERM");
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Не удалось подписаться на CTRL+C");
        std::future::pending::<()>().await;
    }
}
