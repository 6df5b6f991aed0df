use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::list::reservation_table;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::db::reservations;
use crate::errors::AppResult;
use crate::utils::date::{instant_range, period_bounds};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List { period } = cmd {
        let zone = cfg.zone();
        let pool = DbPool::new(&cfg.database)?;
        init_db(&pool.conn)?;

        let stored = match period.as_deref() {
            Some(p) if p != "all" => {
                let (from, to) = period_bounds(p)?;
                let (start, end) = instant_range(from, to, zone);
                reservations::load_between(&pool.conn, start, end)?
            }
            _ => reservations::load_all(&pool.conn)?,
        };

        if stored.is_empty() {
            println!("No reservations found.");
            return Ok(());
        }

        print!("{}", reservation_table(&stored, zone).render());
    }

    Ok(())
}
