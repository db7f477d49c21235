pub mod api;
pub mod cli;
pub mod models;
pub mod notifications;
pub mod settings;
pub mod storage;
pub mod utils;
pub mod watcher;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;

use api::{ApiClient, AuthToken, ReservationSource};
use notifications::{NotificationEmitter, NotificationStore};
use settings::{SettingsStore, WatchSettings};
use storage::{MemoryStorage, SharedStorage, SqliteStorage};
use watcher::{EmailMemory, WatcherController};

pub struct AppState {
    pub settings: SettingsStore,
    pub store: Arc<NotificationStore>,
    pub emails: EmailMemory,
    pub token: AuthToken,
    pub api: ApiClient,
    pub watcher: WatcherController,
}

impl AppState {
    /// Opens settings and storage under `data_dir`. An unusable database
    /// degrades to process-local storage instead of failing startup.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let settings = SettingsStore::new(data_dir.join("settings.json"))?;

        let storage: SharedStorage = match SqliteStorage::open(data_dir.join("believe.sqlite3")) {
            Ok(sqlite) => Arc::new(sqlite),
            Err(err) => {
                warn!("Falling back to in-memory storage: {err:#}");
                Arc::new(MemoryStorage::new())
            }
        };

        Self::assemble(settings, storage)
    }

    /// Wires every component on top of an existing settings file and storage
    /// backend.
    pub fn assemble(settings: SettingsStore, storage: SharedStorage) -> Result<Self> {
        let watch: WatchSettings = settings.watch().with_env_overrides();

        let token = AuthToken::new(storage.clone());
        let api = ApiClient::new(&watch.api_base_url, token.clone())?;
        let store = Arc::new(NotificationStore::new(storage.clone()));
        let emails = EmailMemory::new(storage);

        let source: Arc<dyn ReservationSource> = Arc::new(api.clone());
        let watcher = WatcherController::new(
            source,
            NotificationEmitter::new(store.clone()),
            emails.clone(),
            watch.poll_timing(),
        );

        Ok(Self {
            settings,
            store,
            emails,
            token,
            api,
            watcher,
        })
    }
}

pub fn run() -> Result<()> {
    let cli = cli::Cli::parse();

    // RUST_LOG overrides the default level
    let default_level = if settings::debug_enabled() {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    log::info!("Believe notify starting up...");

    let data_dir = settings::data_dir()?;
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;

    runtime.block_on(async move {
        let state = AppState::open(&data_dir)?;
        cli::dispatch(cli.command, &state).await
    })
}
