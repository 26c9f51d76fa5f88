//! View-model module
//!
//! Turns repository observables into one [`LauncherState`] for the UI and
//! forwards UI intents to the repositories.
//!
//! # Event Flow
//!
//! ```text
//! AppRepository / SettingsRepository live queries
//!            ↓ (five forwarder threads)
//!      ViewEvent channel ← intent results (rayon pool)
//!            ↓
//!   event loop: Combiner → LauncherState → UI (SyncSender)
//! ```
//!
//! The aggregated lists are rebuilt from scratch on every source emission;
//! there is no incremental diffing. Navigation is a plain value beside the
//! state and changes synchronously.

pub mod launcher_view_model;
pub mod state;

pub use launcher_view_model::LauncherViewModel;
pub use state::{LauncherState, NavigationState};
