//! Update handlers. Every entry point passes the guard gate (ban + flood)
//! before any command logic runs, and anything that bubbles up from a
//! handler is caught here: logged, reported to the operator, silent to the
//! requester.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};
use tracing::{debug, error};

use reachbot_core::{
    domain::ChatId,
    formatting::{escape_html, truncate_text},
    moderation::{GuardOutcome, RecipientProfile},
};

use crate::router::AppState;

mod callback;
mod commands;
mod text;

const ERROR_REPORT_MAX: usize = 500;

fn profile_of(user: &teloxide::types::User) -> RecipientProfile {
    RecipientProfile {
        id: reachbot_core::domain::UserId(user.id.0 as i64),
        display_name: user.full_name(),
        handle: user.username.clone(),
    }
}

/// Runs the guard and answers the requester on rejection.
/// Returns whether processing may continue.
async fn pass_guard(state: &AppState, profile: &RecipientProfile, chat: ChatId) -> bool {
    let outcome = match state.gatekeeper.guard(profile).await {
        Ok(outcome) => outcome,
        Err(e) => {
            report_failure(state, profile, &e.to_string()).await;
            return false;
        }
    };

    match outcome {
        GuardOutcome::Allowed => true,
        GuardOutcome::Banned(reason) => {
            let mut text = "⛔ You are banned.".to_string();
            if let Some(reason) = reason {
                text.push_str(&format!("\nReason: {}", escape_html(&reason)));
            }
            let _ = state.messenger.send_html(chat, &text).await;
            false
        }
        GuardOutcome::Throttled => {
            debug!(user = profile.id.0, "throttled");
            let _ = state
                .messenger
                .send_html(chat, "⚠️ Flood detected! Slow down a little.")
                .await;
            false
        }
    }
}

/// Top-level failure path: log, then best-effort report to the operator.
/// The requester sees nothing.
async fn report_failure(state: &AppState, profile: &RecipientProfile, diagnostic: &str) {
    error!(user = profile.id.0, "handler failed: {diagnostic}");

    if state.cfg.operator_id == 0 {
        return;
    }
    let report = format!(
        "⚠️ Bot error (user <code>{}</code>):\n<code>{}</code>",
        profile.id.0,
        escape_html(&truncate_text(diagnostic, ERROR_REPORT_MAX))
    );
    let _ = state
        .messenger
        .send_html(ChatId(state.cfg.operator_id), &report)
        .await;
}

pub async fn handle_message(_bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let profile = profile_of(user);
    let chat = ChatId(msg.chat.id.0);

    if !pass_guard(&state, &profile, chat).await {
        return Ok(());
    }

    let Some(body) = msg.text().map(|s| s.to_string()) else {
        return Ok(());
    };

    let result = if body.starts_with('/') {
        commands::handle_command(&state, &profile, chat, &body).await
    } else {
        text::handle_text(&state, chat, &body).await
    };

    if let Err(e) = result {
        report_failure(&state, &profile, &e.to_string()).await;
    }

    Ok(())
}

pub async fn handle_callback(
    _bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let profile = profile_of(&q.from);
    let data = q.data.clone().unwrap_or_default();

    let Some(message) = q.message.as_ref() else {
        let _ = state.messenger.answer_callback(&q.id, None).await;
        return Ok(());
    };
    let chat = ChatId(message.chat.id.0);
    let msg_ref = reachbot_core::domain::MessageRef {
        chat_id: chat,
        message_id: reachbot_core::domain::MessageId(message.id.0),
    };

    let _ = state.messenger.answer_callback(&q.id, None).await;

    if !pass_guard(&state, &profile, chat).await {
        return Ok(());
    }

    if let Err(e) = callback::handle_data(&state, &profile, msg_ref, &data).await {
        report_failure(&state, &profile, &e.to_string()).await;
    }

    Ok(())
}
