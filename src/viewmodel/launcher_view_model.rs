//! Launcher view-model implementation
//!
//! One event-loop thread owns the aggregated [`LauncherState`]. Five source
//! forwarder threads turn repository live queries into events on the same
//! channel, and intents run on a small rayon pool and report back through it.

use crate::error::{LauncherError, Result, get_user_friendly_error};
use crate::observe::{LiveQuery, Poll};
use crate::preferences::UserPreferences;
use crate::repository::{AppCategory, AppRepository, LauncherApp, SettingsRepository};
use crate::viewmodel::state::{LauncherState, NavigationState};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, TrySendError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long worker threads wait before re-checking for shutdown
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Threads in the intent pool
const INTENT_THREADS: usize = 2;

/// A fresh value from one of the five observed sources
#[derive(Debug)]
enum SourceUpdate {
    Apps(Vec<LauncherApp>),
    Favorites(Vec<LauncherApp>),
    Recent(Vec<LauncherApp>),
    Categories(Vec<AppCategory>),
    Preferences(UserPreferences),
}

/// Input to the event loop
#[derive(Debug)]
enum ViewEvent {
    Source(SourceUpdate),
    CategorySelected(Option<AppCategory>),
    SearchCompleted {
        query: String,
        results: Vec<LauncherApp>,
    },
    RefreshStarted,
    RefreshFinished {
        succeeded: bool,
    },
    Failed(String),
}

/// Latest value of each source
///
/// Nothing is aggregated until every source has emitted at least once.
#[derive(Debug, Default)]
struct Combiner {
    apps: Option<Vec<LauncherApp>>,
    favorites: Option<Vec<LauncherApp>>,
    recent: Option<Vec<LauncherApp>>,
    categories: Option<Vec<AppCategory>>,
    preferences: Option<UserPreferences>,
}

impl Combiner {
    fn update(&mut self, update: SourceUpdate) {
        match update {
            SourceUpdate::Apps(apps) => self.apps = Some(apps),
            SourceUpdate::Favorites(apps) => self.favorites = Some(apps),
            SourceUpdate::Recent(apps) => self.recent = Some(apps),
            SourceUpdate::Categories(categories) => self.categories = Some(categories),
            SourceUpdate::Preferences(prefs) => self.preferences = Some(prefs),
        }
    }

    fn is_complete(&self) -> bool {
        self.apps.is_some()
            && self.favorites.is_some()
            && self.recent.is_some()
            && self.categories.is_some()
            && self.preferences.is_some()
    }

    /// Write the combined view into `state`; returns false while incomplete
    fn apply(&self, state: &mut LauncherState) -> bool {
        let (Some(apps), Some(favorites), Some(recent), Some(categories), Some(preferences)) = (
            &self.apps,
            &self.favorites,
            &self.recent,
            &self.categories,
            &self.preferences,
        ) else {
            return false;
        };

        state.apps.clone_from(apps);
        state.favorite_apps.clone_from(favorites);
        state.recent_apps.clone_from(recent);
        state.categories.clone_from(categories);
        state.user_preferences.clone_from(preferences);
        state.is_loading = false;

        // Keep the selected tab's count current
        if let Some(selected) = &state.selected_category {
            if let Some(fresh) = categories.iter().find(|c| c.name == selected.name) {
                state.selected_category = Some(fresh.clone());
            }
        }
        true
    }
}

/// Applies events to the state; returns whether the state changed
fn handle_event(event: ViewEvent, combiner: &mut Combiner, state: &mut LauncherState) -> bool {
    match event {
        ViewEvent::Source(update) => {
            // Preferences are shown as soon as they arrive, even before the
            // app lists are ready.
            if let SourceUpdate::Preferences(prefs) = &update {
                state.user_preferences.clone_from(prefs);
            }
            let is_preferences = matches!(update, SourceUpdate::Preferences(_));
            combiner.update(update);
            combiner.apply(state) || is_preferences
        }
        ViewEvent::CategorySelected(category) => {
            state.selected_category = category;
            true
        }
        ViewEvent::SearchCompleted { query, results } => {
            state.search_query = query;
            state.search_results = results;
            state.error = None;
            true
        }
        ViewEvent::RefreshStarted => {
            state.is_loading = true;
            true
        }
        ViewEvent::RefreshFinished { succeeded } => {
            state.is_loading = !combiner.is_complete();
            if succeeded {
                state.error = None;
            }
            true
        }
        ViewEvent::Failed(message) => {
            state.error = Some(message);
            true
        }
    }
}

/// Handle given to intents for reporting back to the event loop
#[derive(Clone)]
struct IntentContext {
    events: mpsc::Sender<ViewEvent>,
    cancelled: Arc<AtomicBool>,
}

impl IntentContext {
    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Send an event unless the view-model has shut down
    fn emit(&self, event: ViewEvent) {
        if self.is_cancelled() {
            debug!("Discarding intent result after shutdown");
            return;
        }
        if self.events.send(event).is_err() {
            debug!("Event loop gone; intent result dropped");
        }
    }

    fn fail(&self, intent: &str, error: &LauncherError) {
        warn!("{} failed: {}", intent, error);
        self.emit(ViewEvent::Failed(get_user_friendly_error(error)));
    }
}

/// Aggregates repository state for the UI and dispatches UI intents
///
/// Every state change is sent to the UI channel as a full [`LauncherState`]
/// snapshot. Intents return immediately; their effects arrive as later
/// snapshots, in no guaranteed order relative to each other.
pub struct LauncherViewModel {
    app_repository: AppRepository,
    settings_repository: SettingsRepository,
    context: IntentContext,
    state: Arc<Mutex<LauncherState>>,
    navigation: Mutex<NavigationState>,
    pool: rayon::ThreadPool,
    threads: Mutex<Vec<JoinHandle<()>>>,
}

impl std::fmt::Debug for LauncherViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LauncherViewModel")
            .field("navigation", &*self.navigation.lock())
            .field("cancelled", &self.context.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl LauncherViewModel {
    /// Subscribe to all sources and start publishing snapshots to `state_sender`
    ///
    /// The first snapshot is the loading state; the first aggregated snapshot
    /// follows once every source has produced a value.
    pub fn start(
        app_repository: AppRepository,
        settings_repository: SettingsRepository,
        state_sender: mpsc::SyncSender<LauncherState>,
    ) -> Result<Self> {
        let (events, event_receiver) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let context = IntentContext { events, cancelled };
        let state = Arc::new(Mutex::new(LauncherState::default()));

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(INTENT_THREADS)
            .thread_name(|i| format!("launcher-intent-{i}"))
            .panic_handler(|payload| warn!("Intent panicked: {}", panic_message(&*payload)))
            .build()
            .map_err(|e| LauncherError::Io(std::io::Error::other(e)))?;

        let mut threads = Vec::with_capacity(6);
        threads.push(spawn_event_loop(
            event_receiver,
            Arc::clone(&state),
            state_sender,
            Arc::clone(&context.cancelled),
        )?);
        threads.push(spawn_forwarder(
            "apps",
            app_repository.get_apps(),
            SourceUpdate::Apps,
            context.clone(),
        )?);
        threads.push(spawn_forwarder(
            "favorites",
            app_repository.get_favorite_apps(),
            SourceUpdate::Favorites,
            context.clone(),
        )?);
        threads.push(spawn_forwarder(
            "recent",
            app_repository.get_recent_apps(),
            SourceUpdate::Recent,
            context.clone(),
        )?);
        threads.push(spawn_forwarder(
            "categories",
            app_repository.get_categories(),
            SourceUpdate::Categories,
            context.clone(),
        )?);
        threads.push(spawn_forwarder(
            "preferences",
            settings_repository.preferences(),
            SourceUpdate::Preferences,
            context.clone(),
        )?);

        info!("Launcher view-model started");
        Ok(Self {
            app_repository,
            settings_repository,
            context,
            state,
            navigation: Mutex::new(NavigationState::default()),
            pool,
            threads: Mutex::new(threads),
        })
    }

    /// Latest published state
    pub fn state(&self) -> LauncherState {
        self.state.lock().clone()
    }

    /// Current screen
    pub fn navigation_state(&self) -> NavigationState {
        *self.navigation.lock()
    }

    /// Switch screens
    pub fn navigate_to(&self, destination: NavigationState) {
        let mut navigation = self.navigation.lock();
        debug!("Navigation {:?} -> {:?}", *navigation, destination);
        *navigation = destination;
    }

    /// Select a category tab, or clear the selection with `None`
    pub fn change_category(&self, category: Option<AppCategory>) {
        self.context.emit(ViewEvent::CategorySelected(category));
    }

    /// Flip an app's favorite flag
    pub fn toggle_app_favorite(&self, package_id: impl Into<String>) {
        let package_id = package_id.into();
        let repo = self.app_repository.clone();
        self.dispatch("toggle_app_favorite", move |ctx| {
            if let Err(e) = repo.toggle_favorite(&package_id) {
                ctx.fail("toggle_app_favorite", &e);
            }
        });
    }

    /// Count one launch of an app
    pub fn update_app_usage(&self, package_id: impl Into<String>) {
        let package_id = package_id.into();
        let repo = self.app_repository.clone();
        self.dispatch("update_app_usage", move |ctx| {
            if let Err(e) = repo.update_app_usage(&package_id) {
                ctx.fail("update_app_usage", &e);
            }
        });
    }

    /// Start an app; failures are logged and do not change the state
    pub fn launch_app(&self, package_id: impl Into<String>) {
        let package_id = package_id.into();
        let repo = self.app_repository.clone();
        self.dispatch("launch_app", move |_| {
            if let Err(e) = repo.launch_app(&package_id) {
                warn!(package = %package_id, "Launch failed: {}", e);
            }
        });
    }

    /// Search apps by name or package; results replace the previous search
    pub fn search_apps(&self, query: impl Into<String>) {
        let query = query.into();
        let repo = self.app_repository.clone();
        self.dispatch("search_apps", move |ctx| match repo.search_apps(&query) {
            Ok(results) => ctx.emit(ViewEvent::SearchCompleted { query, results }),
            Err(e) => ctx.fail("search_apps", &e),
        });
    }

    /// Rescan installed apps; the state shows loading until the scan lands
    pub fn refresh_apps(&self) {
        let repo = self.app_repository.clone();
        self.dispatch("refresh_apps", move |ctx| {
            ctx.emit(ViewEvent::RefreshStarted);
            let succeeded = match repo.refresh_installed_apps() {
                Ok(_) => true,
                Err(e) => {
                    ctx.fail("refresh_apps", &e);
                    false
                }
            };
            ctx.emit(ViewEvent::RefreshFinished { succeeded });
        });
    }

    /// Change the theme
    pub fn change_theme(&self, theme: impl Into<String>) {
        let theme = theme.into();
        self.dispatch_settings("change_theme", move |settings| settings.update_theme(&theme));
    }

    /// Turn wallpaper-derived colors on or off
    pub fn toggle_dynamic_color(&self, enabled: bool) {
        self.dispatch_settings("toggle_dynamic_color", move |settings| {
            settings.toggle_dynamic_color(enabled)
        });
    }

    /// Turn animations on or off
    pub fn toggle_animation(&self, enabled: bool) {
        self.dispatch_settings("toggle_animation", move |settings| {
            settings.toggle_animation(enabled)
        });
    }

    /// Show or hide the voice search button
    pub fn toggle_voice_search(&self, enabled: bool) {
        self.dispatch_settings("toggle_voice_search", move |settings| {
            settings.toggle_voice_search(enabled)
        });
    }

    /// Show or hide system apps
    pub fn toggle_system_apps(&self, show: bool) {
        self.dispatch_settings("toggle_system_apps", move |settings| {
            settings.toggle_system_apps(show)
        });
    }

    /// Change the grid ordering
    pub fn update_sort_order(&self, sort_order: impl Into<String>) {
        let sort_order = sort_order.into();
        self.dispatch_settings("update_sort_order", move |settings| {
            settings.update_sort_order(&sort_order)
        });
    }

    /// Change the grid column count
    pub fn update_grid_columns(&self, columns: i64) {
        self.dispatch_settings("update_grid_columns", move |settings| {
            settings.update_grid_columns(columns)
        });
    }

    /// Set or clear the wallpaper image
    pub fn update_background_image(&self, path: Option<String>) {
        self.dispatch_settings("update_background_image", move |settings| {
            settings.update_background_image(path.as_deref())
        });
    }

    /// Stop all workers and wait for them
    ///
    /// Queued intents are skipped and results of running ones are discarded.
    /// Calling this more than once is harmless.
    pub fn shutdown(&self) {
        if self.context.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        info!("Shutting down launcher view-model");

        let threads = std::mem::take(&mut *self.threads.lock());
        for handle in threads {
            let name = handle.thread().name().unwrap_or("unnamed").to_string();
            if handle.join().is_err() {
                warn!("Worker thread {} panicked", name);
            }
        }
        info!("Launcher view-model stopped");
    }

    fn dispatch<F>(&self, intent: &'static str, work: F)
    where
        F: FnOnce(&IntentContext) + Send + 'static,
    {
        if self.context.is_cancelled() {
            debug!("Ignoring {} after shutdown", intent);
            return;
        }
        let ctx = self.context.clone();
        self.pool.spawn(move || {
            if ctx.is_cancelled() {
                debug!("Skipping queued {}", intent);
                return;
            }
            debug!("Running {}", intent);
            work(&ctx);
        });
    }

    fn dispatch_settings<F>(&self, intent: &'static str, work: F)
    where
        F: FnOnce(&SettingsRepository) -> Result<()> + Send + 'static,
    {
        let settings = self.settings_repository.clone();
        self.dispatch(intent, move |ctx| {
            if let Err(e) = work(&settings) {
                ctx.fail(intent, &e);
            }
        });
    }
}

/// Text of a panic payload, when it carries one
fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string payload")
}

impl Drop for LauncherViewModel {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn spawn_event_loop(
    events: mpsc::Receiver<ViewEvent>,
    state: Arc<Mutex<LauncherState>>,
    state_sender: mpsc::SyncSender<LauncherState>,
    cancelled: Arc<AtomicBool>,
) -> Result<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name("launcher-view-model".to_string())
        .spawn(move || {
            let mut combiner = Combiner::default();
            publish(&state_sender, state.lock().clone(), &cancelled);

            info!("Entering view-model event loop");
            while !cancelled.load(Ordering::SeqCst) {
                match events.recv_timeout(POLL_INTERVAL) {
                    Ok(event) => {
                        let snapshot = {
                            let mut state = state.lock();
                            handle_event(event, &mut combiner, &mut state).then(|| state.clone())
                        };
                        if let Some(snapshot) = snapshot {
                            publish(&state_sender, snapshot, &cancelled);
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        warn!("View-model event channel disconnected. Exiting event loop.");
                        break;
                    }
                }
            }
            info!("View-model event loop exited");
        })?;
    Ok(handle)
}

/// Deliver a snapshot, waiting for room in the UI channel until shutdown
fn publish(
    sender: &mpsc::SyncSender<LauncherState>,
    snapshot: LauncherState,
    cancelled: &AtomicBool,
) {
    let mut pending = snapshot;
    loop {
        match sender.try_send(pending) {
            Ok(()) => return,
            Err(TrySendError::Full(snapshot)) => {
                if cancelled.load(Ordering::SeqCst) {
                    return;
                }
                pending = snapshot;
                std::thread::sleep(Duration::from_millis(10));
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("UI state receiver dropped");
                return;
            }
        }
    }
}

fn spawn_forwarder<T: Send + 'static>(
    source: &'static str,
    mut query: LiveQuery<T>,
    wrap: fn(T) -> SourceUpdate,
    ctx: IntentContext,
) -> Result<JoinHandle<()>> {
    let handle = std::thread::Builder::new()
        .name(format!("launcher-source-{source}"))
        .spawn(move || {
            while !ctx.is_cancelled() {
                match query.next_timeout(POLL_INTERVAL) {
                    Poll::Ready(Ok(value)) => ctx.emit(ViewEvent::Source(wrap(value))),
                    Poll::Ready(Err(e)) => {
                        warn!(source, "Source query failed: {}", e);
                        ctx.emit(ViewEvent::Failed(get_user_friendly_error(&e)));
                    }
                    Poll::Pending => {}
                    Poll::Closed => {
                        debug!(source, "Source closed");
                        break;
                    }
                }
            }
        })?;
    Ok(handle)
}
