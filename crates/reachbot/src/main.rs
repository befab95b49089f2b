use std::sync::Arc;

use reachbot_core::{config::Config, store::Database};

#[tokio::main]
async fn main() -> Result<(), reachbot_core::Error> {
    reachbot_core::logging::init("reachbot");

    let cfg = Arc::new(Config::load()?);
    let db = Arc::new(Database::open(&cfg.db_path)?);

    reachbot_telegram::router::run_polling(cfg, db)
        .await
        .map_err(|e| reachbot_core::Error::Transport(format!("telegram bot failed: {e}")))?;

    Ok(())
}
