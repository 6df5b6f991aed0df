use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::scheduler::{scheduled_sources, watch};
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::AppResult;
use crate::ui::messages::info;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Watch { cycles } = cmd {
        {
            let pool = DbPool::new(&cfg.database)?;
            init_db(&pool.conn)?;
        }

        for src in scheduled_sources(cfg) {
            info(format!(
                "{}: {} every {}s",
                src.kind,
                src.feed.display(),
                src.every.as_secs()
            ));
        }

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(watch(cfg, *cycles))?;
    }

    Ok(())
}
