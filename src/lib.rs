pub mod api;
pub mod billing;
pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod models;

use sqlx::PgPool;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    /// Rejects every write under `/api` when set.
    pub read_only: bool,
}
