//! Incremental, checkpointed ingestion of the three upstream feeds.

pub mod feeds;
pub mod orchestrator;
pub mod records;
pub mod service;

pub use feeds::{
    CalendarDocument, CalendarFileFeed, FeedBatch, FetchError, JsonFileFeed, MemoryFeed, SyncCursor,
    SyncSource,
};
pub use orchestrator::{SyncOrchestrator, SyncReport};
pub use records::SyncRecord;
pub use service::{CycleReport, SyncService};

use crate::errors::AppError;
use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

/// The upstream feeds, each with its own checkpoint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SourceKind {
    Calendar,
    Trips,
    Presence,
}

impl SourceKind {
    pub const ALL: [SourceKind; 3] = [SourceKind::Calendar, SourceKind::Trips, SourceKind::Presence];

    /// Checkpoint key.
    pub fn key(&self) -> &'static str {
        match self {
            SourceKind::Calendar => "calendar",
            SourceKind::Trips => "vehicle_trips",
            SourceKind::Presence => "presence",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for SourceKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "calendar" => Ok(SourceKind::Calendar),
            "trips" | "vehicle_trips" => Ok(SourceKind::Trips),
            "presence" => Ok(SourceKind::Presence),
            other => Err(AppError::UnknownSource(other.to_string())),
        }
    }
}
