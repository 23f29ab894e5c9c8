use chrono::{DateTime, NaiveDate, Utc};
use eventdesk::config::StorageConfig;
use eventdesk::projects::Clock;
use eventdesk::storage::{JsonFileStore, MemoryStore};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Repository backend selected from configuration.
pub(crate) enum Store {
    Memory(Arc<MemoryStore>),
    Json(Arc<JsonFileStore>),
}

impl Store {
    pub(crate) fn from_config(config: &StorageConfig) -> Self {
        match config {
            StorageConfig::Memory => Self::Memory(Arc::new(MemoryStore::new())),
            StorageConfig::JsonFile { path } => Self::Json(Arc::new(JsonFileStore::open(path))),
        }
    }

    pub(crate) fn describe(&self) -> String {
        match self {
            Self::Memory(_) => "memory".to_string(),
            Self::Json(store) => format!("json:{}", store.path().display()),
        }
    }
}

/// Clock the demo advances by hand to walk through admission states.
pub(crate) struct ManualClock {
    instant: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub(crate) fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: Mutex::new(instant),
        }
    }

    pub(crate) fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut guard) = self.instant.lock() {
            *guard = instant;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.instant
            .lock()
            .map(|guard| *guard)
            .unwrap_or_else(|_| Utc::now())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
