use std::sync::Arc;
use std::time::Instant;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tracing::info;

use reachbot_core::{
    broadcast::BroadcastEngine, config::Config, content::ContentGenerator, flood::FloodGuard,
    messaging::port::MessagingPort, moderation::Gatekeeper, store::Database,
};

use crate::handlers;
use crate::TelegramMessenger;

/// Process-wide context, built once at startup and passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub db: Arc<Database>,
    pub gatekeeper: Arc<Gatekeeper>,
    pub engine: Arc<BroadcastEngine>,
    pub content: Arc<ContentGenerator>,
    pub messenger: Arc<dyn MessagingPort>,
    pub started_at: Instant,
}

pub async fn run_polling(cfg: Arc<Config>, db: Arc<Database>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        info!("started as @{}", me.username());
    }
    info!(
        recipients = db.count_all().unwrap_or(0),
        operator_configured = cfg.operator_id != 0,
        "state loaded"
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let flood = Arc::new(FloodGuard::new(cfg.flood_window, cfg.flood_limit));
    let gatekeeper = Arc::new(Gatekeeper::new(db.clone(), flood, cfg.operator_id));
    let engine = Arc::new(BroadcastEngine::new(
        db.clone(),
        cfg.broadcast_delay,
        cfg.progress_interval,
    ));
    let content = Arc::new(ContentGenerator::new(cfg.brand_tag.clone()));

    let state = Arc::new(AppState {
        cfg,
        db,
        gatekeeper,
        engine,
        content,
        messenger,
        started_at: Instant::now(),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
