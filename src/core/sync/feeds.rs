//! Upstream feed abstraction and the transport-free feeds shipped with the crate.

use super::records::SyncRecord;
use crate::models::Reservation;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Where a fetch should resume from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncCursor {
    /// No stored checkpoint: everything since the source epoch.
    Full { epoch: Option<String> },
    /// Stored checkpoint value.
    Resume(String),
}

impl SyncCursor {
    pub fn value(&self) -> Option<&str> {
        match self {
            SyncCursor::Full { epoch } => epoch.as_deref(),
            SyncCursor::Resume(v) => Some(v),
        }
    }

    pub fn is_full(&self) -> bool {
        matches!(self, SyncCursor::Full { .. })
    }
}

/// Records delivered by one fetch.
#[derive(Debug, Clone)]
pub struct FeedBatch<R> {
    pub records: Vec<R>,
    /// Resumption token chosen by the upstream, if it has one.
    pub next_checkpoint: Option<String>,
}

impl<R> FeedBatch<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            next_checkpoint: None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The stored checkpoint is no longer accepted (e.g. an expired token).
    #[error("checkpoint no longer valid: {0}")]
    CheckpointInvalid(String),

    #[error("{0}")]
    Upstream(String),
}

pub trait SyncSource {
    type Record: SyncRecord;

    fn source_key(&self) -> &str;

    fn fetch(&mut self, cursor: &SyncCursor) -> Result<FeedBatch<Self::Record>, FetchError>;
}

/// Select the part of a full record set that `cursor` asks for.
///
/// With a `token`, the feed behaves like a sync-token API: the current token
/// yields nothing new, any other stored token is rejected. Without one,
/// records are filtered by their own cursor.
fn select_batch<R: SyncRecord>(
    records: Vec<R>,
    cursor: &SyncCursor,
    token: Option<&str>,
) -> Result<FeedBatch<R>, FetchError> {
    match (token, cursor) {
        (Some(t), SyncCursor::Resume(v)) if v == t => Ok(FeedBatch {
            records: Vec::new(),
            next_checkpoint: Some(t.to_string()),
        }),
        (Some(_), SyncCursor::Resume(v)) => {
            Err(FetchError::CheckpointInvalid(format!("unknown sync token '{v}'")))
        }
        (Some(t), SyncCursor::Full { .. }) => Ok(FeedBatch {
            records,
            next_checkpoint: Some(t.to_string()),
        }),
        (None, _) => {
            let selected = match cursor.value() {
                Some(since) => records.into_iter().filter(|r| r.is_since(since)).collect(),
                None => records,
            };
            Ok(FeedBatch::new(selected))
        }
    }
}

/// In-memory feed over an already-deserialized collection.
pub struct MemoryFeed<R> {
    key: String,
    records: Vec<R>,
    token: Option<String>,
    fail_next: Option<FetchError>,
    fetches: usize,
}

impl<R: SyncRecord + Clone> MemoryFeed<R> {
    pub fn new(key: impl Into<String>, records: Vec<R>) -> Self {
        Self {
            key: key.into(),
            records,
            token: None,
            fail_next: None,
            fetches: 0,
        }
    }

    /// Switch to sync-token semantics with `token` as the current token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    pub fn set_records(&mut self, records: Vec<R>) {
        self.records = records;
    }

    pub fn push(&mut self, record: R) {
        self.records.push(record);
    }

    /// Make the next fetch fail with `err`.
    pub fn fail_next(&mut self, err: FetchError) {
        self.fail_next = Some(err);
    }

    /// Number of fetch calls so far, failed ones included.
    pub fn fetches(&self) -> usize {
        self.fetches
    }
}

impl<R: SyncRecord + Clone> SyncSource for MemoryFeed<R> {
    type Record = R;

    fn source_key(&self) -> &str {
        &self.key
    }

    fn fetch(&mut self, cursor: &SyncCursor) -> Result<FeedBatch<R>, FetchError> {
        self.fetches += 1;
        if let Some(err) = self.fail_next.take() {
            return Err(err);
        }
        select_batch(self.records.clone(), cursor, self.token.as_deref())
    }
}

fn read_feed_file(path: &Path) -> Result<String, FetchError> {
    fs::read_to_string(path)
        .map_err(|e| FetchError::Upstream(format!("cannot read {}: {e}", path.display())))
}

/// JSON array of records exported by an upstream collaborator.
pub struct JsonFileFeed<R> {
    key: String,
    path: PathBuf,
    _marker: PhantomData<R>,
}

impl<R> JsonFileFeed<R> {
    pub fn new(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            _marker: PhantomData,
        }
    }
}

impl<R: SyncRecord + DeserializeOwned> SyncSource for JsonFileFeed<R> {
    type Record = R;

    fn source_key(&self) -> &str {
        &self.key
    }

    fn fetch(&mut self, cursor: &SyncCursor) -> Result<FeedBatch<R>, FetchError> {
        let raw = read_feed_file(&self.path)?;
        let records: Vec<R> = serde_json::from_str(&raw).map_err(|e| {
            FetchError::Upstream(format!("invalid feed {}: {e}", self.path.display()))
        })?;
        select_batch(records, cursor, None)
    }
}

/// Calendar export: the full reservation list plus the token that describes it.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarDocument {
    pub sync_token: String,
    pub reservations: Vec<Reservation>,
}

pub struct CalendarFileFeed {
    key: String,
    path: PathBuf,
}

impl CalendarFileFeed {
    pub fn new(key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
        }
    }
}

impl SyncSource for CalendarFileFeed {
    type Record = Reservation;

    fn source_key(&self) -> &str {
        &self.key
    }

    fn fetch(&mut self, cursor: &SyncCursor) -> Result<FeedBatch<Reservation>, FetchError> {
        let raw = read_feed_file(&self.path)?;
        let doc: CalendarDocument = serde_json::from_str(&raw).map_err(|e| {
            FetchError::Upstream(format!("invalid calendar {}: {e}", self.path.display()))
        })?;
        select_batch(doc.reservations, cursor, Some(&doc.sync_token))
    }
}
