use reachbot_core::{domain::ChatId, Result};

use crate::router::AppState;

/// Plain (non-command) text. Kept minimal: greet on a greeting, otherwise
/// point at the menu.
pub async fn handle_text(state: &AppState, chat: ChatId, body: &str) -> Result<()> {
    let lowered = body.trim().to_lowercase();
    let reply = if matches!(lowered.as_str(), "hi" | "hello" | "hey" | "namaste") {
        "👋 Hi! Use /start for the menu."
    } else {
        "🙂 I work on commands. Try /start or /help"
    };
    state.messenger.send_html(chat, reply).await?;
    Ok(())
}
