//! Hot-reload of the feedback tuning file.
//!
//! Watches `config/feedback.ron` (or a custom path) with `notify`. A changed
//! file is loaded and validated; on success it replaces `FeedbackSettings`
//! (which retunes every player), on failure the previous config stays live.

use bevy::prelude::*;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Mutex;

use crate::config::FeedbackCoreConfig;
use crate::player::FeedbackSettings;

pub const DEFAULT_CONFIG_PATH: &str = "config/feedback.ron";

pub struct HotReloadPlugin {
    pub path: PathBuf,
}

impl Default for HotReloadPlugin {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

impl Plugin for HotReloadPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(HotReloadState {
            watched_file: Some(self.path.clone()),
            ..Default::default()
        })
        .init_resource::<FeedbackSettings>()
        .add_event::<ConfigReloadEvent>()
        .add_systems(Startup, setup_config_watcher)
        .add_systems(Update, process_config_changes);
    }
}

#[derive(Resource, Debug, Default)]
pub struct HotReloadState {
    pub enabled: bool,
    pub watched_file: Option<PathBuf>,
    pub reload_count: u32,
    pub last_reload_success: bool,
    pub last_reload_time: f64,
    pub last_error: Option<String>,
}

#[derive(Event, Debug, Clone)]
pub struct ConfigReloadEvent {
    pub path: PathBuf,
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Resource)]
struct WatcherResource {
    _watcher: RecommendedWatcher,
    receiver: Mutex<Receiver<notify::Result<Event>>>,
}

fn setup_config_watcher(
    mut commands: Commands,
    mut state: ResMut<HotReloadState>,
    mut settings: ResMut<FeedbackSettings>,
) {
    let Some(config_path) = state.watched_file.clone() else {
        return;
    };

    if !config_path.exists() {
        warn!("Feedback config not found: {:?}, using defaults", config_path);
        state.enabled = false;
        return;
    }

    // Initial load so the session starts from the file, not the defaults
    match FeedbackCoreConfig::load(&config_path) {
        Ok(config) => settings.0 = config,
        Err(e) => {
            warn!("Initial feedback config rejected: {}", e);
            state.last_error = Some(e.to_string());
        }
    }

    let (tx, rx) = channel();
    let mut watcher = match notify::recommended_watcher(tx) {
        Ok(w) => w,
        Err(e) => {
            error!("Failed to create file watcher: {}", e);
            state.enabled = false;
            return;
        }
    };

    let watch_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    if let Err(e) = watcher.watch(watch_dir, RecursiveMode::NonRecursive) {
        error!("Failed to watch config directory: {}", e);
        state.enabled = false;
        return;
    }

    state.enabled = true;
    commands.insert_resource(WatcherResource {
        _watcher: watcher,
        receiver: Mutex::new(rx),
    });

    info!("Hot-reload enabled for {:?}", config_path);
}

fn process_config_changes(
    watcher: Option<Res<WatcherResource>>,
    mut state: ResMut<HotReloadState>,
    mut settings: ResMut<FeedbackSettings>,
    mut events: EventWriter<ConfigReloadEvent>,
    time: Res<Time>,
) {
    let Some(watcher) = watcher else {
        return;
    };
    let Some(path) = state.watched_file.clone() else {
        return;
    };

    let mut changed = false;
    if let Ok(receiver) = watcher.receiver.lock() {
        while let Ok(result) = receiver.try_recv() {
            match result {
                Ok(event) => changed |= is_config_modify_event(&event, &path),
                Err(e) => warn!("File watcher error: {}", e),
            }
        }
    }
    if !changed {
        return;
    }

    // Several fs events usually arrive per save; reload once
    match FeedbackCoreConfig::load(&path) {
        Ok(config) => {
            state.reload_count += 1;
            state.last_reload_success = true;
            state.last_reload_time = time.elapsed_secs_f64();
            state.last_error = None;
            if settings.0 != config {
                settings.0 = config;
            }
            events.send(ConfigReloadEvent {
                path,
                success: true,
                error: None,
            });
            info!("Feedback config reloaded (count: {})", state.reload_count);
        }
        Err(e) => {
            state.last_reload_success = false;
            state.last_error = Some(e.to_string());
            events.send(ConfigReloadEvent {
                path,
                success: false,
                error: Some(e.to_string()),
            });
            error!("Feedback config reload failed, keeping previous: {}", e);
        }
    }
}

/// Modify/create event touching the watched file
fn is_config_modify_event(event: &Event, watched: &Path) -> bool {
    let Some(name) = watched.file_name() else {
        return false;
    };
    (event.kind.is_modify() || event.kind.is_create())
        && event.paths.iter().any(|p| p.file_name() == Some(name))
}
