//! Unified application error type.
//! All modules (db, core, cli, utils) return AppError to keep the error
//! handling consistent and easy to manage.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Parsing / serialization
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid location code: {0}")]
    InvalidLocation(String),

    #[error("Invalid presence status: {0}")]
    InvalidStatus(String),

    #[error("Invalid evidence source: {0}")]
    InvalidSource(String),

    #[error("Invalid UTC offset: {0}")]
    InvalidOffset(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ---------------------------
    // Domain errors
    // ---------------------------
    #[error("Reservation {id} ends before it starts")]
    InvertedReservation { id: String },

    #[error("Unknown sync source: {0}")]
    UnknownSource(String),

    // ---------------------------
    // Sync errors
    // ---------------------------
    #[error("Upstream fetch failed for '{source_key}': {message}")]
    Upstream { source_key: String, message: String },

    #[error("Upstream rejected checkpoint for '{0}' even after a full resync")]
    CheckpointRejected(String),

    #[error("No feed configured for source '{0}'")]
    FeedNotConfigured(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),
}

pub type AppResult<T> = Result<T, AppError>;
