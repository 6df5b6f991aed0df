// src/export/logic.rs

use super::fs_utils::ensure_writable;
use super::json_csv::{export_csv, export_json};
use super::{ExportFormat, ReservationExport};
use crate::db::log::ttlog_quiet;
use crate::db::pool::DbPool;
use crate::db::reservations;
use crate::errors::{AppError, AppResult};
use crate::models::ReferenceZone;
use crate::utils::date::{instant_range, period_bounds};
use std::path::Path;

pub struct ExportLogic;

impl ExportLogic {
    /// Export stored reservations.
    ///
    /// `period` accepts `YYYY`, `YYYY-MM`, `YYYY-MM-DD` or `A:B`; a
    /// reservation is included when its stay overlaps the period.
    pub fn export(
        pool: &mut DbPool,
        format: ExportFormat,
        file: &str,
        period: Option<&str>,
        force: bool,
        zone: ReferenceZone,
    ) -> AppResult<usize> {
        let path = Path::new(file);
        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "output path must be absolute: {file}"
            )));
        }
        ensure_writable(path, force)?;

        let stored = match period {
            Some(p) => {
                let (from, to) = period_bounds(p)?;
                let (start, end) = instant_range(from, to, zone);
                reservations::load_between(&pool.conn, start, end)?
            }
            None => reservations::load_all(&pool.conn)?,
        };

        let rows: Vec<ReservationExport> = stored
            .iter()
            .map(|r| ReservationExport::from_reservation(r, zone))
            .collect();

        match format {
            ExportFormat::Csv => export_csv(&rows, path)?,
            ExportFormat::Json => export_json(&rows, path)?,
        }

        ttlog_quiet(
            &pool.conn,
            "export",
            format.as_str(),
            &format!("{} reservations to {}", rows.len(), path.display()),
        );

        Ok(rows.len())
    }
}
