//! Опрос SNMP-устройств: счётчики пересчитываются в скорости за период,
//! сэмплы пакетами уходят в sink.
//!
//! Планировщик раз в период запускает раунд: пул воркеров опрашивает
//! каждое устройство (не больше `max_procs` одновременно), воркеры кладут
//! сэмплы в очередь, а `BatchWriter` независимо от тиков разбирает её на
//! пакеты.

pub mod collector;
pub mod config;
pub mod formatter;
pub mod handlers;
pub mod routes;
pub mod scheduler;
pub mod snmp;
pub mod status;
pub mod writer;
