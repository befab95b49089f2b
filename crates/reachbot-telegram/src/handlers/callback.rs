use reachbot_core::{
    domain::MessageRef, messaging::types::InlineKeyboard, moderation::RecipientProfile, Result,
};

use crate::keyboards;
use crate::router::AppState;
use crate::texts;

/// Menu navigation. Every screen is an in-place edit of the message that
/// carries the keyboard; only returning `home` over a photo message needs a
/// fresh send, since a caption edit cannot become a text message.
pub async fn handle_data(
    state: &AppState,
    profile: &RecipientProfile,
    msg: MessageRef,
    data: &str,
) -> Result<()> {
    let operator = state.gatekeeper.is_operator(profile.id);

    match data {
        "home" => home(state, msg, operator).await,
        "help" => {
            edit(state, msg, &texts::help_text(&state.cfg), keyboards::back()).await
        }
        "rules" => edit(state, msg, &texts::rules_text(), keyboards::back()).await,
        "about" => edit(state, msg, &texts::about_text(&state.cfg), keyboards::back()).await,
        "seo_menu" => edit(state, msg, &texts::seo_menu_text(), keyboards::seo_menu()).await,
        "cap_help" => edit(state, msg, &texts::caption_help_text(), keyboards::seo_menu()).await,
        "hash_help" => edit(state, msg, &texts::hashtag_help_text(), keyboards::seo_menu()).await,
        "seo_help" => edit(state, msg, &texts::seo_help_text(), keyboards::seo_menu()).await,
        "admin_panel" if operator => {
            edit(state, msg, "🛡 <b>Admin Panel</b>", keyboards::admin_menu()).await
        }
        "admin_stats" if operator => admin_stats(state, msg).await,
        "admin_ban_help" if operator => {
            edit(state, msg, &texts::ban_help_text(), keyboards::admin_menu()).await
        }
        "admin_unban_help" if operator => {
            edit(state, msg, &texts::unban_help_text(), keyboards::admin_menu()).await
        }
        "admin_broadcast_help" if operator => {
            edit(state, msg, &texts::broadcast_help_text(), keyboards::admin_menu()).await
        }
        "close" => close(state, msg).await,
        _ => Ok(()), // stale keyboard or an admin button pressed by a non-admin
    }
}

async fn edit(
    state: &AppState,
    msg: MessageRef,
    html: &str,
    keyboard: InlineKeyboard,
) -> Result<()> {
    state.messenger.edit_keyboard(msg, html, keyboard).await
}

async fn home(state: &AppState, msg: MessageRef, operator: bool) -> Result<()> {
    let menu = texts::menu_text(&state.cfg);
    let kb = keyboards::main_menu(&state.cfg, operator);

    // The menu screen may originally be a photo with a caption; editing a
    // text body over it fails, so replace the message instead.
    if state.messenger.edit_keyboard(msg, &menu, kb.clone()).await.is_ok() {
        return Ok(());
    }

    state.messenger.send_keyboard(msg.chat_id, &menu, kb).await?;
    let _ = state.messenger.delete_message(msg).await;
    Ok(())
}

async fn admin_stats(state: &AppState, msg: MessageRef) -> Result<()> {
    let users = state.db.count_all()?;
    let banned = state.db.count_banned()?;
    let text = format!(
        "📊 <b>Stats</b>\n\
• Users: <code>{users}</code>\n\
• Banned: <code>{banned}</code>"
    );
    edit(state, msg, &text, keyboards::admin_menu()).await
}

async fn close(state: &AppState, msg: MessageRef) -> Result<()> {
    if state.messenger.delete_message(msg).await.is_err() {
        // Old messages cannot be deleted; collapse the menu instead.
        state
            .messenger
            .edit_keyboard(msg, "✅ Closed.", InlineKeyboard::default())
            .await?;
    }
    Ok(())
}
