//! Versioned insert-or-update with change detection.
//!
//! Every mutable entity carries an [`AuditInfo`]. Writing a record that is
//! identical to the stored one leaves the row untouched, so `version` and
//! `updated_at` only move on real changes. Each call runs in its own
//! IMMEDIATE transaction, which serializes concurrent writers on the same row.

use crate::errors::AppResult;
use crate::models::AuditInfo;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, TransactionBehavior};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted,
    Updated { version: i64 },
    Unchanged,
    /// Update requested for a row that no longer exists. Reported, not raised.
    Missing,
}

impl UpsertOutcome {
    pub fn is_change(&self) -> bool {
        matches!(self, UpsertOutcome::Inserted | UpsertOutcome::Updated { .. })
    }
}

/// Persistence hooks for an entity with an embedded audit block.
pub trait VersionedEntity: Clone {
    /// Human-readable entity name for logs.
    const KIND: &'static str;

    fn key(&self) -> &str;
    fn audit(&self) -> &AuditInfo;
    fn audit_mut(&mut self) -> &mut AuditInfo;

    /// Copy the mutable fields of `incoming` into `self`; true if anything differed.
    fn merge_from(&mut self, incoming: &Self) -> bool;

    fn find(conn: &Connection, key: &str) -> AppResult<Option<Self>>;
    fn insert(conn: &Connection, rec: &Self) -> AppResult<()>;
    /// Returns the number of rows written.
    fn update(conn: &Connection, rec: &Self) -> AppResult<usize>;
}

/// Insert `incoming`, or merge it into the stored row.
pub fn upsert<E: VersionedEntity>(
    conn: &mut Connection,
    incoming: &E,
    now: DateTime<Utc>,
) -> AppResult<UpsertOutcome> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let outcome = match E::find(&tx, incoming.key())? {
        None => {
            let mut rec = incoming.clone();
            *rec.audit_mut() = AuditInfo::created(now);
            E::insert(&tx, &rec)?;
            UpsertOutcome::Inserted
        }
        Some(mut stored) => {
            if stored.merge_from(incoming) {
                stored.audit_mut().touch(now);
                write_back(&tx, &stored)?
            } else {
                UpsertOutcome::Unchanged
            }
        }
    };

    tx.commit()?;
    debug!(kind = E::KIND, key = incoming.key(), ?outcome, "upsert");
    Ok(outcome)
}

/// Apply `apply` to the stored row identified by `key`, if it still exists.
///
/// `apply` returns true when it changed something. A vanished row yields
/// [`UpsertOutcome::Missing`].
pub fn update_with<E, F>(
    conn: &mut Connection,
    key: &str,
    now: DateTime<Utc>,
    apply: F,
) -> AppResult<UpsertOutcome>
where
    E: VersionedEntity,
    F: FnOnce(&mut E) -> bool,
{
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let outcome = match E::find(&tx, key)? {
        None => UpsertOutcome::Missing,
        Some(mut stored) => {
            if apply(&mut stored) {
                stored.audit_mut().touch(now);
                write_back(&tx, &stored)?
            } else {
                UpsertOutcome::Unchanged
            }
        }
    };

    tx.commit()?;

    if outcome == UpsertOutcome::Missing {
        warn!(kind = E::KIND, key, "update skipped: entity no longer exists");
    }
    Ok(outcome)
}

fn write_back<E: VersionedEntity>(conn: &Connection, stored: &E) -> AppResult<UpsertOutcome> {
    if E::update(conn, stored)? == 0 {
        return Ok(UpsertOutcome::Missing);
    }
    Ok(UpsertOutcome::Updated {
        version: stored.audit().version,
    })
}
