use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::checkpoints;
use crate::db::initialize::init_db;
use crate::db::log::ttlog_quiet;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::table::Table;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Checkpoint { list, reset } = cmd {
        let pool = DbPool::new(&cfg.database)?;
        init_db(&pool.conn)?;

        if let Some(kind) = reset {
            if checkpoints::delete(&pool.conn, kind.key())? {
                ttlog_quiet(&pool.conn, "checkpoint_reset", kind.key(), "reset from command line");
                success(format!("Checkpoint '{}' removed; next sync is a full sync.", kind));
            } else {
                info(format!("No checkpoint stored for '{}'.", kind));
            }
        }

        if *list {
            let stored = checkpoints::list(&pool.conn)?;
            if stored.is_empty() {
                info("No checkpoints stored.");
                return Ok(());
            }

            let mut table = Table::new(&["Source", "Value", "Version", "Updated"]);
            for cp in stored {
                table.add_row(vec![
                    cp.source,
                    cp.value,
                    cp.audit.version.to_string(),
                    cp.audit.last_modified().format("%Y-%m-%d %H:%M:%S").to_string(),
                ]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}
