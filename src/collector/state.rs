use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::fmt;

/// Ключ состояния счётчика: устройство и OID
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CounterKey {
    pub hostname: String,
    pub oid: String,
}

impl CounterKey {
    pub fn new(hostname: impl Into<String>, oid: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            oid: oid.into(),
        }
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.hostname, self.oid)
    }
}

/// Результат наблюдения счётчика
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateResult {
    NoPriorValue,
    Rate(f64),
}

/// Последние сырые значения счётчиков.
///
/// Чтение предыдущего значения и запись нового выполняются под блокировкой
/// шарда, которому принадлежит ключ, поэтому `observe` атомарен для ключа.
/// Записи живут до конца процесса.
#[derive(Debug, Default)]
pub struct CounterStateStore {
    entries: DashMap<CounterKey, i64>,
}

impl CounterStateStore {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Запоминает `raw` и возвращает скорость относительно прошлого значения.
    /// Переполнение счётчика проходит арифметически (вычитание с переносом).
    pub fn observe(&self, key: CounterKey, raw: i64, period: u64) -> RateResult {
        match self.entries.entry(key) {
            Entry::Occupied(mut entry) => {
                let previous = entry.insert(raw);
                let delta = raw.wrapping_sub(previous);
                RateResult::Rate(delta as f64 / period as f64)
            }
            Entry::Vacant(entry) => {
                entry.insert(raw);
                RateResult::NoPriorValue
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
