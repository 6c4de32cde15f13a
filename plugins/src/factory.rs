use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use pagestate_core::adapter::{DataSource, FixtureSource, HttpSource, RateLimiter, RemoteCatalog};
use pagestate_core::clock::Clock;
use pagestate_core::config::{AppConfig, StorageBackend};
use pagestate_core::state::Store;
use pagestate_core::storage::{FileKv, KeyValueStore, MemoryKv};

use crate::library::{self, Library, OpenLibrary};
use crate::planner::{self, GenshinCatalog, Planner};
use crate::shop::{self, Shop};
use crate::workout::{self, Workout};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppKind {
    Library,
    Shop,
    Planner,
    Workout,
}

impl AppKind {
    pub const ALL: [AppKind; 4] = [
        AppKind::Library,
        AppKind::Shop,
        AppKind::Planner,
        AppKind::Workout,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AppKind::Library => "library",
            AppKind::Shop => "shop",
            AppKind::Planner => "planner",
            AppKind::Workout => "workout",
        }
    }

    pub fn storage_key(self) -> &'static str {
        match self {
            AppKind::Library => library::STORAGE_KEY,
            AppKind::Shop => shop::STORAGE_KEY,
            AppKind::Planner => planner::STORAGE_KEY,
            AppKind::Workout => workout::STORAGE_KEY,
        }
    }
}

impl fmt::Display for AppKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown app: {s}"))
    }
}

pub fn build_kv(cfg: &AppConfig) -> Result<Arc<dyn KeyValueStore>> {
    match cfg.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(match cfg.storage.quota_bytes {
            Some(quota) => MemoryKv::with_quota(quota),
            None => MemoryKv::new(),
        })),
        StorageBackend::File => {
            let dir = cfg
                .storage
                .directory
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .context("storage.directory is required for the file backend")?;
            let kv = FileKv::new(dir)
                .with_context(|| format!("Failed to open storage directory {dir}"))?;
            Ok(Arc::new(kv))
        }
    }
}

pub fn quiet_period(cfg: &AppConfig) -> Duration {
    Duration::from_millis(cfg.dispatch.debounce_ms)
}

fn remote<C: RemoteCatalog>(
    catalog: C,
    base_url: &str,
    cfg: &AppConfig,
    clock: &Arc<dyn Clock>,
) -> Result<Arc<dyn DataSource<C::Entity>>> {
    let limits = &cfg.sources.rate_limit;
    let limiter = RateLimiter::new(
        limits.limit,
        chrono::Duration::seconds(limits.window_secs),
        Arc::clone(clock),
    );
    let source = HttpSource::new(catalog, base_url, cfg.sources.timeout_ms)
        .with_context(|| format!("Failed to build HTTP client for {base_url}"))?
        .with_rate_limit(limiter);
    Ok(Arc::new(source))
}

pub fn build_library(
    cfg: &AppConfig,
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
) -> Result<Library> {
    let source: Arc<dyn DataSource<library::Book>> = if cfg.sources.remote {
        remote(OpenLibrary, &cfg.sources.open_library_url, cfg, &clock)?
    } else {
        Arc::new(FixtureSource::new("shelf", library::fixtures::seed_books()))
    };
    let store = Store::load_from_storage(kv, library::STORAGE_KEY, cfg.pagination.page_size);
    Ok(Library::new(store, source, clock))
}

pub fn build_shop(cfg: &AppConfig, kv: Arc<dyn KeyValueStore>) -> Shop {
    let source = Arc::new(FixtureSource::new("catalog", shop::fixtures::catalog()));
    let store = Store::load_from_storage(kv, shop::STORAGE_KEY, cfg.pagination.page_size);
    Shop::new(store, source)
}

pub fn build_planner(
    cfg: &AppConfig,
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
) -> Result<Planner> {
    let source: Arc<dyn DataSource<planner::Character>> = if cfg.sources.remote {
        remote(GenshinCatalog, &cfg.sources.genshin_url, cfg, &clock)?
    } else {
        Arc::new(FixtureSource::new("roster", planner::fixtures::roster()))
    };
    let store = Store::load_from_storage(kv, planner::STORAGE_KEY, cfg.pagination.page_size);
    Ok(Planner::new(store, source))
}

pub fn build_workout(
    cfg: &AppConfig,
    kv: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
) -> Workout {
    let source = Arc::new(FixtureSource::<workout::ExerciseSet>::new("log", Vec::new()));
    let store = Store::load_from_storage(kv, workout::STORAGE_KEY, cfg.pagination.page_size);
    Workout::new(store, source, clock)
}
