//! Persistent app store module
//!
//! One SQLite table, `apps`, keyed by package name, holding per-app metadata
//! and usage counters. The database lives at `<data_dir>/tv_launcher.db`.
//!
//! # Write semantics
//!
//! - `upsert` / `upsert_all` replace the whole row on conflict.
//! - `upsert_all_preserving_usage` merges: scan metadata is overwritten,
//!   `is_favorite`, `last_used` and `usage_count` are kept.
//! - `toggle_favorite` and `record_usage` are single statements, so they
//!   cannot lose updates when called concurrently.

pub mod app_store;
pub mod models;

pub use app_store::{AppStore, DEFAULT_RECENT_LIMIT};
pub use models::AppRecord;
