//! `tvlauncher` - headless launcher shell
//!
//! Wires the stores, repositories and view-model together and drives them
//! from line commands on stdin. State snapshots are summarised on stdout.
//!
//! ```text
//! refresh | fav <pkg> | launch <pkg> | search <text> | category [<name>]
//! theme <name> | columns <n> | sort <order> | system on|off | animation on|off
//! wallpaper [<path>] | nav <screen> | quit
//! ```

use anyhow::{Context, Result, bail};
use std::io::BufRead;
use std::sync::{Arc, mpsc};
use tracing::{error, info, warn};
use tvlauncher::{
    config::ConfigManager,
    error::get_user_friendly_error,
    platform::ManifestCatalog,
    preferences::PreferenceStore,
    repository::{AppRepository, LauncherApp, SettingsRepository},
    store::AppStore,
    utils::{self, AppUpdateJob},
    viewmodel::{LauncherState, LauncherViewModel, NavigationState},
};

/// Snapshots buffered between the view-model and the printer
const STATE_CHANNEL_CAPACITY: usize = 32;

fn main() -> Result<()> {
    let data_dir = ConfigManager::ensure_data_dir().context("Failed to create data directory")?;
    utils::init_logging(&data_dir).context("Failed to initialize logging system")?;

    let config = ConfigManager::load().context("Failed to load launcher configuration")?;
    info!("Data directory: {}", data_dir.display());
    if !ConfigManager::get_config_path().exists()
        && let Err(e) = ConfigManager::save(&config)
    {
        warn!("Failed to write default configuration: {}", e);
    }

    let store = AppStore::open(config.database_path(&data_dir)).context("Failed to open app store")?;
    let preferences = PreferenceStore::open(config.preferences_path(&data_dir))
        .context("Failed to open preference store")?;
    let catalog = Arc::new(ManifestCatalog::new(config.manifest_path(&data_dir)));

    let apps = AppRepository::with_config(store, catalog, &config);
    let settings = SettingsRepository::new(preferences);

    match apps.refresh_installed_apps() {
        Ok(count) => info!("Initial scan found {} apps", count),
        Err(e) => {
            warn!("Initial scan failed: {}", e);
            eprintln!("{}", get_user_friendly_error(&e));
        }
    }

    let _update_job = AppUpdateJob::from_config(apps.clone(), &config)
        .context("Failed to start periodic rescan")?;

    let (state_tx, state_rx) = mpsc::sync_channel(STATE_CHANNEL_CAPACITY);
    let view_model = LauncherViewModel::start(apps, settings, state_tx)
        .context("Failed to start view-model")?;

    let printer = std::thread::Builder::new()
        .name("state-printer".to_string())
        .spawn(move || {
            for state in state_rx {
                print_state(&state);
            }
        })
        .context("Failed to start state printer")?;

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Failed to read command")?;
        match run_command(&view_model, line.trim()) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => eprintln!("{e:#}"),
        }
    }

    view_model.shutdown();
    drop(view_model);
    if printer.join().is_err() {
        error!("State printer panicked");
    }
    info!("tvlauncher exiting");
    Ok(())
}

/// Execute one command; returns false on `quit`
fn run_command(vm: &LauncherViewModel, line: &str) -> Result<bool> {
    let (command, arg) = match line.split_once(' ') {
        Some((command, arg)) => (command, arg.trim()),
        None => (line, ""),
    };

    match command {
        "" => {}
        "quit" | "exit" => return Ok(false),
        "refresh" => vm.refresh_apps(),
        "fav" => vm.toggle_app_favorite(arg),
        "launch" => vm.launch_app(arg),
        "search" => vm.search_apps(arg),
        "category" => {
            let state = vm.state();
            let category = if arg.is_empty() {
                None
            } else {
                let found = state.categories.into_iter().find(|c| c.name == arg);
                if found.is_none() {
                    bail!("Unknown category: {arg}");
                }
                found
            };
            vm.change_category(category);
        }
        "theme" => vm.change_theme(arg),
        "columns" => vm.update_grid_columns(arg.parse().context("Column count must be a number")?),
        "sort" => vm.update_sort_order(arg),
        "system" => vm.toggle_system_apps(arg == "on"),
        "animation" => vm.toggle_animation(arg == "on"),
        "wallpaper" => vm.update_background_image((!arg.is_empty()).then(|| arg.to_string())),
        "nav" => vm.navigate_to(parse_screen(arg)?),
        other => bail!("Unknown command: {other}"),
    }
    Ok(true)
}

fn parse_screen(name: &str) -> Result<NavigationState> {
    Ok(match name.to_ascii_lowercase().as_str() {
        "home" => NavigationState::Home,
        "apps" => NavigationState::Apps,
        "games" => NavigationState::Games,
        "settings" => NavigationState::Settings,
        "themes" => NavigationState::Themes,
        "search" => NavigationState::Search,
        other => bail!("Unknown screen: {other}"),
    })
}

fn names(apps: &[LauncherApp]) -> String {
    apps.iter()
        .map(LauncherApp::display_name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_state(state: &LauncherState) {
    if state.is_loading {
        println!("[loading]");
        return;
    }
    println!(
        "apps={} favorites=[{}] recent=[{}] theme={} columns={}",
        state.visible_apps().len(),
        names(&state.favorite_apps),
        names(&state.recent_apps),
        state.user_preferences.theme,
        state.user_preferences.grid_columns,
    );
    if !state.search_query.is_empty() {
        println!(
            "search '{}': [{}]",
            state.search_query,
            names(&state.search_results)
        );
    }
    if let Some(error) = &state.error {
        println!("error: {error}");
    }
}
