use crate::errors::{AppError, AppResult};
use crate::models::ReferenceZone;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};

/// Current calendar date in `zone`.
pub fn today(zone: ReferenceZone) -> NaiveDate {
    zone.date_of(Utc::now())
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let (y, m) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(y, m, 1)?.pred_opt()
}

/// First and last day covered by a single period token.
fn bounds_of(p: &str) -> Option<(NaiveDate, NaiveDate)> {
    // YYYY-MM-DD
    if let Some(d) = parse_date(p) {
        return Some((d, d));
    }

    // YYYY-MM
    if let Ok(first) = NaiveDate::parse_from_str(&format!("{p}-01"), "%Y-%m-%d") {
        return Some((first, last_day_of_month(first.year(), first.month())?));
    }

    // YYYY
    if p.len() == 4
        && let Ok(year) = p.parse::<i32>()
    {
        return Some((
            NaiveDate::from_ymd_opt(year, 1, 1)?,
            NaiveDate::from_ymd_opt(year, 12, 31)?,
        ));
    }

    None
}

/// Inclusive date range from `YYYY`, `YYYY-MM`, `YYYY-MM-DD` or `A:B`
/// where A and B are any of those.
pub fn period_bounds(p: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::InvalidDate(format!("invalid period '{p}'"));

    let (from, to) = match p.split_once(':') {
        Some((a, b)) => {
            let (from, _) = bounds_of(a.trim()).ok_or_else(invalid)?;
            let (_, to) = bounds_of(b.trim()).ok_or_else(invalid)?;
            (from, to)
        }
        None => bounds_of(p.trim()).ok_or_else(invalid)?,
    };

    if from > to {
        return Err(invalid());
    }
    Ok((from, to))
}


/// Instant at which `date` begins in `zone`.
pub fn day_start(date: NaiveDate, zone: ReferenceZone) -> DateTime<Utc> {
    let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    midnight - Duration::seconds(i64::from(zone.offset().local_minus_utc()))
}

/// Half-open instant range `[from, to + 1 day)` covering both dates.
pub fn instant_range(from: NaiveDate, to: NaiveDate, zone: ReferenceZone) -> (DateTime<Utc>, DateTime<Utc>) {
    let end = to.succ_opt().unwrap_or(to);
    (day_start(from, zone), day_start(end, zone))
}
